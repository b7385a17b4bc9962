use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{EmiError, Result};
use crate::schedule::LoanTerms;
use crate::types::{LoanId, LoanStatus, PaymentMode, ShopkeeperId};

/// a recorded collection against a loan, owned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub amount: Money,
    #[serde(default, alias = "paymentDate")]
    pub date: Option<NaiveDate>,
    #[serde(default, alias = "paymentMode")]
    pub method: Option<PaymentMode>,
    #[serde(default)]
    pub collected_by: Option<String>,
    #[serde(default)]
    pub loan_id: Option<LoanId>,
}

impl Payment {
    pub fn new(amount: Money, date: NaiveDate) -> Self {
        Self {
            amount,
            date: Some(date),
            method: None,
            collected_by: None,
            loan_id: None,
        }
    }

    pub fn with_method(mut self, method: PaymentMode) -> Self {
        self.method = Some(method);
        self
    }

    pub fn collected_by(mut self, collector: impl Into<String>) -> Self {
        self.collected_by = Some(collector.into());
        self
    }
}

/// a late fee appended to a loan; never mutated once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Penalty {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub amount: Money,
    pub reason: String,
    pub applied_date: NaiveDate,
    pub applied_at: DateTime<Utc>,
    /// installment due date this penalty covers
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// loan record as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    pub status: LoanStatus,
    pub loan_amount: Money,
    pub tenure: i32,
    pub emi_amount: Money,
    #[serde(default)]
    pub file_charge: Money,
    #[serde(default)]
    pub emi_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub applied_date: Option<NaiveDate>,
    #[serde(default)]
    pub approved_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<NaiveDate>,
    #[serde(default)]
    pub next_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub emis_paid: u32,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub penalties: Vec<Penalty>,
    #[serde(default)]
    pub total_penalty: Money,
    #[serde(default)]
    pub shopkeeper_id: Option<ShopkeeperId>,
    #[serde(default, alias = "customerName")]
    pub borrower_name: Option<String>,
}

impl Loan {
    /// create an active loan with the minimum fields the engine needs
    pub fn new(
        id: impl Into<LoanId>,
        loan_amount: Money,
        tenure: i32,
        emi_amount: Money,
        applied_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            status: LoanStatus::Active,
            loan_amount,
            tenure,
            emi_amount,
            file_charge: Money::ZERO,
            emi_start_date: None,
            applied_date: Some(applied_date),
            approved_date: None,
            created_at: None,
            next_due_date: None,
            emis_paid: 0,
            payments: Vec::new(),
            penalties: Vec::new(),
            total_penalty: Money::ZERO,
            shopkeeper_id: None,
            borrower_name: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// schedule anchor: first present of emi start, applied, approved, created
    pub fn origin_date(&self) -> Option<NaiveDate> {
        self.emi_start_date
            .or(self.applied_date)
            .or(self.approved_date)
            .or(self.created_at)
    }

    /// date used by period filters
    pub fn filter_date(&self) -> Option<NaiveDate> {
        self.applied_date.or_else(|| self.origin_date())
    }

    /// extract the immutable terms the schedule is generated from
    pub fn terms(&self) -> Result<LoanTerms> {
        let origin = self.origin_date().ok_or_else(|| {
            EmiError::invalid_terms(format!("loan {} has no origin date", self.id))
        })?;

        let tenure = u32::try_from(self.tenure).map_err(|_| {
            EmiError::invalid_terms(format!("loan {} has tenure {}", self.id, self.tenure))
        })?;

        LoanTerms::new(self.loan_amount, tenure, self.emi_amount, self.file_charge, origin)
    }

    /// sum of every recorded payment, matched to an installment or not
    pub fn total_recorded_payments(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn last_payment_date(&self) -> Option<NaiveDate> {
        self.payments.iter().filter_map(|p| p.date).max()
    }

    /// whether a penalty was already recorded for this due date
    ///
    /// Backend penalties carry no due date; one applied after `due_date`
    /// is taken to cover it.
    pub fn has_penalty_for(&self, due_date: NaiveDate) -> bool {
        self.penalties.iter().any(|p| match p.due_date {
            Some(covered) => covered == due_date,
            None => p.applied_date > due_date,
        })
    }

    /// case-insensitive match on loan id or borrower name
    pub fn matches_text(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.id.to_lowercase().contains(&needle)
            || self
                .borrower_name
                .as_deref()
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }

    /// move along the lifecycle, rejecting transitions it does not allow
    pub fn transition_to(&mut self, next: LoanStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(EmiError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        Ok(())
    }

    /// append a penalty and roll it into the running total
    pub(crate) fn record_penalty(&mut self, penalty: Penalty) {
        self.total_penalty += penalty.amount;
        self.penalties.push(penalty);
    }
}
