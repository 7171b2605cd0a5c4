//! Admin ledger: salary rate, appraisals, payments and reviews.
//!
//! All ledger state lives in the key-value store under its own keys and is
//! read leniently, so a damaged entry reads as empty rather than failing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::faculty::Faculty;
use crate::store::{
    read_json, write_json, KeyValueStore, APPRAISALS_KEY, APPRAISAL_HISTORY_KEY, PAYMENT_HISTORY_KEY,
    PAYMENT_STATUS_KEY, REVIEW_SUBMISSIONS_KEY, SALARY_CHANGES_KEY, SALARY_PER_HOUR_KEY,
};

/// Characters of review text kept in the stored preview.
pub const REVIEW_PREVIEW_CHARS: usize = 50;

/// Pay owed to one faculty member.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollEntry {
    pub faculty: Faculty,
    pub paid: bool,
    pub appraisal: f64,
    pub total_pay: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub timestamp: DateTime<Utc>,
    pub faculty_id: u64,
    pub faculty_name: String,
    pub amount: f64,
    pub appraisal: f64,
}

/// One change of the hourly salary rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryChange {
    pub timestamp: DateTime<Utc>,
    pub new_rate: f64,
}

/// One saved appraisal amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppraisalRecord {
    pub timestamp: DateTime<Utc>,
    pub faculty_id: u64,
    pub faculty_name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub timestamp: DateTime<Utc>,
    pub faculty_id: u64,
    pub faculty_name: String,
    pub review_length: usize,
    pub review_text: String,
}

/// Base pay for the hours worked plus any appraisal bonus.
pub fn total_pay(rate_per_hour: f64, hours: f64, appraisal: f64) -> f64 {
    rate_per_hour * hours + appraisal
}

fn check_amount(what: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidAmount(format!("{what} must be a non-negative number, got {value}")));
    }
    Ok(())
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(REVIEW_PREVIEW_CHARS).collect();
    if text.chars().count() > REVIEW_PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

pub struct AdminLedger<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> AdminLedger<S> {
    pub fn new(store: S) -> Self {
        AdminLedger { store }
    }

    /// Salary per hour, zero when unset.
    pub fn salary_rate(&self) -> f64 {
        self.store
            .get(SALARY_PER_HOUR_KEY)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0.0)
    }

    pub fn set_salary_rate(&mut self, rate: f64) -> Result<()> {
        check_amount("salary rate", rate)?;
        info!(rate, "setting salary rate");
        self.store.set(SALARY_PER_HOUR_KEY, rate.to_string())?;

        let mut changes = self.salary_changes();
        changes.push(SalaryChange { timestamp: Utc::now(), new_rate: rate });
        write_json(&mut self.store, SALARY_CHANGES_KEY, &changes)
    }

    pub fn salary_changes(&self) -> Vec<SalaryChange> {
        read_json(&self.store, SALARY_CHANGES_KEY).unwrap_or_default()
    }

    pub fn appraisals(&self) -> BTreeMap<u64, f64> {
        read_json(&self.store, APPRAISALS_KEY).unwrap_or_default()
    }

    pub fn appraisal_for(&self, faculty_id: u64) -> f64 {
        self.appraisals().get(&faculty_id).copied().unwrap_or(0.0)
    }

    pub fn set_appraisal(&mut self, faculty: &Faculty, amount: f64) -> Result<()> {
        check_amount("appraisal", amount)?;
        info!(faculty_id = faculty.id, amount, "saving appraisal");
        let mut appraisals = self.appraisals();
        appraisals.insert(faculty.id, amount);
        write_json(&mut self.store, APPRAISALS_KEY, &appraisals)?;

        let mut history = self.appraisal_history();
        history.push(AppraisalRecord {
            timestamp: Utc::now(),
            faculty_id: faculty.id,
            faculty_name: faculty.name.clone(),
            amount,
        });
        write_json(&mut self.store, APPRAISAL_HISTORY_KEY, &history)
    }

    /// Every appraisal saved, oldest first. Later entries for a member supersede earlier ones.
    pub fn appraisal_history(&self) -> Vec<AppraisalRecord> {
        read_json(&self.store, APPRAISAL_HISTORY_KEY).unwrap_or_default()
    }

    pub fn payment_status(&self) -> BTreeMap<u64, bool> {
        read_json(&self.store, PAYMENT_STATUS_KEY).unwrap_or_default()
    }

    pub fn is_paid(&self, faculty_id: u64) -> bool {
        self.payment_status().get(&faculty_id).copied().unwrap_or(false)
    }

    /// Pay, appraisal and payment status for every listed faculty member.
    pub fn payroll(&self, list: &[Faculty]) -> Vec<PayrollEntry> {
        let rate = self.salary_rate();
        let appraisals = self.appraisals();
        let status = self.payment_status();

        list.iter()
            .map(|faculty| {
                let appraisal = appraisals.get(&faculty.id).copied().unwrap_or(0.0);
                PayrollEntry {
                    faculty: faculty.clone(),
                    paid: status.get(&faculty.id).copied().unwrap_or(false),
                    appraisal,
                    total_pay: total_pay(rate, faculty.hours, appraisal),
                }
            })
            .collect()
    }

    /// Record `faculty` as paid at the current rate and append it to the payment history.
    pub fn mark_paid(&mut self, faculty: &Faculty) -> Result<PaymentRecord> {
        let appraisal = self.appraisal_for(faculty.id);
        let record = PaymentRecord {
            timestamp: Utc::now(),
            faculty_id: faculty.id,
            faculty_name: faculty.name.clone(),
            amount: total_pay(self.salary_rate(), faculty.hours, appraisal),
            appraisal,
        };
        info!(faculty_id = faculty.id, amount = record.amount, "marking faculty paid");

        let mut status = self.payment_status();
        status.insert(faculty.id, true);
        write_json(&mut self.store, PAYMENT_STATUS_KEY, &status)?;

        let mut history = self.payment_history();
        history.push(record.clone());
        write_json(&mut self.store, PAYMENT_HISTORY_KEY, &history)?;
        Ok(record)
    }

    pub fn payment_history(&self) -> Vec<PaymentRecord> {
        read_json(&self.store, PAYMENT_HISTORY_KEY).unwrap_or_default()
    }

    /// Store a review of `faculty`. Only a preview of the text is kept.
    pub fn submit_review(&mut self, faculty: &Faculty, text: &str) -> Result<ReviewRecord> {
        if text.trim().is_empty() {
            return Err(Error::EmptyReview);
        }
        let record = ReviewRecord {
            timestamp: Utc::now(),
            faculty_id: faculty.id,
            faculty_name: faculty.name.clone(),
            review_length: text.chars().count(),
            review_text: preview(text),
        };
        info!(faculty_id = faculty.id, length = record.review_length, "submitting review");

        let mut reviews = self.reviews();
        reviews.push(record.clone());
        write_json(&mut self.store, REVIEW_SUBMISSIONS_KEY, &reviews)?;
        Ok(record)
    }

    pub fn reviews(&self) -> Vec<ReviewRecord> {
        read_json(&self.store, REVIEW_SUBMISSIONS_KEY).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn faculty(id: u64, name: &str, hours: f64) -> Faculty {
        Faculty {
            id,
            name: name.to_string(),
            hours,
            department: None,
            designation: None,
            email: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_total_pay() {
        assert_eq!(total_pay(500.0, 10.0, 1200.0), 6200.0);
        assert_eq!(total_pay(0.0, 10.0, 0.0), 0.0);
    }

    #[test]
    fn test_salary_rate_round_trips_and_rejects_negative() {
        let mut ledger = AdminLedger::new(MemoryStore::new());
        assert_eq!(ledger.salary_rate(), 0.0);
        ledger.set_salary_rate(450.5).unwrap();
        assert_eq!(ledger.salary_rate(), 450.5);
        assert!(matches!(ledger.set_salary_rate(-1.0), Err(Error::InvalidAmount(_))));
        assert_eq!(ledger.salary_rate(), 450.5);
    }

    #[test]
    fn test_payroll_combines_rate_appraisal_and_status() {
        let list = vec![faculty(1, "Asha", 32.0), faculty(2, "Ken", 10.0)];
        let mut ledger = AdminLedger::new(MemoryStore::new());
        ledger.set_salary_rate(100.0).unwrap();
        ledger.set_appraisal(&list[1], 250.0).unwrap();

        let record = ledger.mark_paid(&list[1]).unwrap();
        assert_eq!(record.amount, 1250.0);
        assert_eq!(record.appraisal, 250.0);

        let payroll = ledger.payroll(&list);
        assert_eq!(payroll[0].total_pay, 3200.0);
        assert!(!payroll[0].paid);
        assert_eq!(payroll[1].total_pay, 1250.0);
        assert!(payroll[1].paid);
        assert_eq!(ledger.payment_history().len(), 1);
    }

    #[test]
    fn test_rate_and_appraisal_changes_are_recorded() {
        let member = faculty(4, "Ravi", 12.0);
        let mut ledger = AdminLedger::new(MemoryStore::new());
        ledger.set_salary_rate(300.0).unwrap();
        ledger.set_salary_rate(350.0).unwrap();
        ledger.set_appraisal(&member, 100.0).unwrap();
        ledger.set_appraisal(&member, 150.0).unwrap();

        let rates: Vec<f64> = ledger.salary_changes().iter().map(|c| c.new_rate).collect();
        assert_eq!(rates, vec![300.0, 350.0]);

        let history = ledger.appraisal_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].faculty_name, "Ravi");
        assert_eq!(history[1].amount, 150.0);
        assert_eq!(ledger.appraisal_for(4), 150.0);

        assert!(ledger.set_salary_rate(f64::NAN).is_err());
        assert_eq!(ledger.salary_changes().len(), 2);
    }

    #[test]
    fn test_malformed_ledger_entries_read_as_empty() {
        let mut store = MemoryStore::new();
        store.set(APPRAISALS_KEY, "nope".into()).unwrap();
        store.set(SALARY_PER_HOUR_KEY, "lots".into()).unwrap();
        let ledger = AdminLedger::new(store);
        assert!(ledger.appraisals().is_empty());
        assert_eq!(ledger.salary_rate(), 0.0);
    }

    #[test]
    fn test_review_keeps_preview_only() {
        let member = faculty(3, "Mei", 5.0);
        let mut ledger = AdminLedger::new(MemoryStore::new());
        let long = "a".repeat(80);

        let record = ledger.submit_review(&member, &long).unwrap();
        assert_eq!(record.review_length, 80);
        assert_eq!(record.review_text, format!("{}...", "a".repeat(50)));

        ledger.submit_review(&member, "Great semester").unwrap();
        assert_eq!(ledger.reviews()[1].review_text, "Great semester");
        assert!(matches!(ledger.submit_review(&member, "  "), Err(Error::EmptyReview)));
    }

    #[test]
    fn test_ledger_over_borrowed_store() {
        let mut store = MemoryStore::new();
        AdminLedger::new(&mut store).set_salary_rate(75.0).unwrap();
        assert_eq!(AdminLedger::new(store).salary_rate(), 75.0);
    }
}
