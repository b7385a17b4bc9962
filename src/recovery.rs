use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::loan::Loan;
use crate::reconcile::{reconcile_loan, ReconciledSchedule, UnavailableSchedule};
use crate::schedule::ScheduleGenerator;
use crate::types::{LoanId, LoanStatus, ShopkeeperId};

/// collection view of one loan as of a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySnapshot {
    pub loan_id: LoanId,
    pub status: LoanStatus,
    pub shopkeeper_id: Option<ShopkeeperId>,
    pub borrower_name: Option<String>,
    pub overdue_installments: u32,
    pub overdue_amount: Money,
    /// days since the earliest unpaid past-due installment
    pub days_overdue: u32,
    pub total_penalty: Money,
    /// overdue EMIs plus accumulated penalties
    pub amount_to_recover: Money,
    /// all unpaid EMIs plus accumulated penalties
    pub outstanding_with_penalties: Money,
    pub next_due_date: Option<NaiveDate>,
    pub last_payment_date: Option<NaiveDate>,
}

impl RecoverySnapshot {
    pub fn for_loan(loan: &Loan, reconciled: &ReconciledSchedule) -> Self {
        let summary = &reconciled.summary;

        Self {
            loan_id: loan.id.clone(),
            status: loan.status,
            shopkeeper_id: loan.shopkeeper_id.clone(),
            borrower_name: loan.borrower_name.clone(),
            overdue_installments: summary.overdue_count,
            overdue_amount: summary.overdue_amount,
            days_overdue: reconciled.days_overdue(),
            total_penalty: loan.total_penalty,
            amount_to_recover: summary.overdue_amount + loan.total_penalty,
            outstanding_with_penalties: summary.total_outstanding + loan.total_penalty,
            next_due_date: reconciled.next_due_date(),
            last_payment_date: loan.last_payment_date(),
        }
    }

    pub fn needs_recovery(&self) -> bool {
        self.overdue_installments > 0
    }
}

/// recovery work list for a date
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryQueue {
    /// most days overdue first
    pub snapshots: Vec<RecoverySnapshot>,
    pub unavailable: Vec<UnavailableSchedule>,
}

impl RecoveryQueue {
    pub fn build(loans: &[Loan], generator: &ScheduleGenerator, as_of: NaiveDate) -> Self {
        let mut queue = RecoveryQueue::default();

        for loan in loans.iter().filter(|l| l.status.is_collectible()) {
            match reconcile_loan(generator, loan, as_of) {
                Ok(reconciled) => {
                    let snapshot = RecoverySnapshot::for_loan(loan, &reconciled);
                    if snapshot.needs_recovery() {
                        queue.snapshots.push(snapshot);
                    }
                }
                Err(err) => queue.unavailable.push(UnavailableSchedule {
                    loan_id: loan.id.clone(),
                    reason: err.to_string(),
                }),
            }
        }

        queue.snapshots.sort_by(|a, b| {
            b.days_overdue
                .cmp(&a.days_overdue)
                .then_with(|| a.loan_id.cmp(&b.loan_id))
        });

        queue
    }

    pub fn total_to_recover(&self) -> Money {
        self.snapshots.iter().map(|s| s.amount_to_recover).sum()
    }
}
