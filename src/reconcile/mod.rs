pub mod cache;
pub mod matcher;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::loan::Loan;
use crate::schedule::ScheduleGenerator;
use crate::types::LoanId;

pub use cache::{CacheKey, CacheStats, ReconciliationCache};
pub use matcher::{Installment, PaymentMatcher, ReconciledSchedule, ReconciliationSummary};

/// generate and reconcile a loan's schedule in one step
pub fn reconcile_loan(
    generator: &ScheduleGenerator,
    loan: &Loan,
    as_of: NaiveDate,
) -> Result<ReconciledSchedule> {
    let terms = loan.terms()?;
    let schedule = generator.generate(&terms)?;
    PaymentMatcher::reconcile(&schedule, &loan.payments, as_of)
}

/// a loan whose schedule could not be generated; rendered as
/// "schedule unavailable" rather than dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableSchedule {
    pub loan_id: LoanId,
    pub reason: String,
}
