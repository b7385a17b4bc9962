pub mod generator;
pub mod pricing;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{EmiError, Result};

pub use generator::{add_months, ScheduleGenerator};
pub use pricing::{monthly_rate_for_down_payment, FlatRatePricing};

/// immutable terms of an approved loan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    /// amount financed (price minus down payment)
    pub principal: Money,
    pub tenure_months: u32,
    /// fixed EMI excluding the file charge
    pub installment_amount: Money,
    /// one-time origination fee carried by installment #1
    pub file_charge: Money,
    /// disbursement/application date anchoring the schedule
    pub origin_date: NaiveDate,
}

impl LoanTerms {
    pub fn new(
        principal: Money,
        tenure_months: u32,
        installment_amount: Money,
        file_charge: Money,
        origin_date: NaiveDate,
    ) -> Result<Self> {
        let terms = Self {
            principal,
            tenure_months,
            installment_amount,
            file_charge,
            origin_date,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// terms priced with flat interest
    pub fn from_pricing(
        pricing: &FlatRatePricing,
        file_charge: Money,
        origin_date: NaiveDate,
    ) -> Result<Self> {
        Self::new(
            pricing.principal,
            pricing.tenure_months,
            pricing.installment_amount,
            file_charge,
            origin_date,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.tenure_months == 0 {
            return Err(EmiError::invalid_terms("tenure must be at least one month"));
        }
        if !self.principal.is_positive() {
            return Err(EmiError::invalid_terms(format!(
                "principal must be positive, got {}",
                self.principal
            )));
        }
        if !self.installment_amount.is_positive() {
            return Err(EmiError::invalid_terms(format!(
                "installment amount must be positive, got {}",
                self.installment_amount
            )));
        }
        if self.file_charge.is_negative() {
            return Err(EmiError::invalid_terms(format!(
                "file charge must not be negative, got {}",
                self.file_charge
            )));
        }

        Ok(())
    }

    /// EMI total over the tenure minus principal; includes any ceil rounding
    pub fn total_interest(&self) -> Money {
        self.installment_amount * Decimal::from(self.tenure_months) - self.principal
    }

    /// everything the borrower owes over the tenure, before penalties
    pub fn total_payable(&self) -> Money {
        self.installment_amount * Decimal::from(self.tenure_months) + self.file_charge
    }
}

/// one generated installment, before reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledInstallment {
    pub sequence_number: u32,
    pub due_date: NaiveDate,
    pub amount_due: Money,
}

/// ordered installments for one loan; due-date order equals sequence order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub terms: LoanTerms,
    pub installments: Vec<ScheduledInstallment>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.installments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installments.is_empty()
    }

    /// installment by 1-based sequence number
    pub fn get(&self, sequence_number: u32) -> Option<&ScheduledInstallment> {
        sequence_number
            .checked_sub(1)
            .and_then(|idx| self.installments.get(idx as usize))
    }

    pub fn first_due_date(&self) -> Option<NaiveDate> {
        self.installments.first().map(|i| i.due_date)
    }

    pub fn last_due_date(&self) -> Option<NaiveDate> {
        self.installments.last().map(|i| i.due_date)
    }

    pub fn total_due(&self) -> Money {
        self.installments.iter().map(|i| i.amount_due).sum()
    }
}
