use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PenaltyConfiguration;
use crate::decimal::Money;
use crate::errors::{EmiError, Result};
use crate::loan::{Loan, Penalty};
use crate::types::{LoanStatus, PenaltyCalculationType};

/// outcome of a penalty evaluation; carries no side effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyDecision {
    pub should_apply: bool,
    pub amount: Money,
    pub reason: String,
    pub due_date: Option<NaiveDate>,
    pub days_overdue: u32,
}

impl PenaltyDecision {
    fn skip(reason: impl Into<String>, due_date: Option<NaiveDate>, days_overdue: u32) -> Self {
        Self {
            should_apply: false,
            amount: Money::ZERO,
            reason: reason.into(),
            due_date,
            days_overdue,
        }
    }
}

/// decides and applies late fees
///
/// A fee is due once the as-of date is strictly past the due date plus the
/// grace period, and at most once per `(loan, due date)`.
#[derive(Debug, Clone)]
pub struct PenaltyEngine {
    config: PenaltyConfiguration,
}

impl PenaltyEngine {
    pub fn new(config: PenaltyConfiguration) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PenaltyConfiguration {
        &self.config
    }

    /// evaluate against the loan's recorded next due date
    pub fn evaluate(&self, loan: &Loan, as_of: NaiveDate) -> PenaltyDecision {
        self.evaluate_due(loan, loan.next_due_date, as_of)
    }

    /// evaluate against an explicit due date, e.g. one derived from the schedule
    pub fn evaluate_due(
        &self,
        loan: &Loan,
        due_date: Option<NaiveDate>,
        as_of: NaiveDate,
    ) -> PenaltyDecision {
        if !loan.status.is_collectible() {
            return PenaltyDecision::skip(format!("loan is {:?}", loan.status), due_date, 0);
        }

        let Some(due) = due_date else {
            return PenaltyDecision::skip("no next due date", None, 0);
        };

        let days_late = (as_of - due).num_days();
        let days_overdue = days_late.max(0) as u32;

        if days_late <= self.config.grace_period_days as i64 {
            return PenaltyDecision::skip("not past due", Some(due), days_overdue);
        }

        if loan.has_penalty_for(due) {
            return PenaltyDecision::skip(
                format!("penalty already applied for {}", due),
                Some(due),
                days_overdue,
            );
        }

        let amount = self.penalty_amount(loan.emi_amount);
        if !amount.is_positive() {
            return PenaltyDecision::skip("penalty amount is zero", Some(due), days_overdue);
        }

        PenaltyDecision {
            should_apply: true,
            amount,
            reason: format!("EMI due {} unpaid for {} days", due, days_overdue),
            due_date: Some(due),
            days_overdue,
        }
    }

    /// fee for one missed due date under the configured mode
    pub fn penalty_amount(&self, emi_amount: Money) -> Money {
        match self.config.penalty_calculation_type {
            PenaltyCalculationType::Fixed => self.config.default_penalty_amount,
            PenaltyCalculationType::Percentage => emi_amount.percentage(self.config.penalty_percentage),
        }
    }

    /// append the decided penalty to the loan
    ///
    /// Returns `None` when the decision says not to apply or a penalty for
    /// the same due date already exists. An `Active` loan moves to `Overdue`.
    pub fn apply_penalty(
        &self,
        loan: &mut Loan,
        decision: &PenaltyDecision,
        applied_at: DateTime<Utc>,
    ) -> Result<Option<Penalty>> {
        if !decision.should_apply {
            return Ok(None);
        }

        let due = decision.due_date.ok_or_else(|| EmiError::Precondition {
            message: "an applicable penalty decision must carry its due date".to_string(),
        })?;

        if loan.has_penalty_for(due) {
            return Ok(None);
        }

        let penalty = Penalty {
            id: Uuid::new_v4(),
            amount: decision.amount,
            reason: decision.reason.clone(),
            applied_date: applied_at.date_naive(),
            applied_at,
            due_date: Some(due),
        };

        loan.record_penalty(penalty.clone());

        if loan.status == LoanStatus::Active {
            loan.transition_to(LoanStatus::Overdue)?;
        }

        Ok(Some(penalty))
    }
}
