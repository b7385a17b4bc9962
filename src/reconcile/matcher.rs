use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{EmiError, Result};
use crate::loan::Payment;
use crate::schedule::Schedule;
use crate::types::InstallmentStatus;

/// installment with its status as of a reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub sequence_number: u32,
    pub due_date: NaiveDate,
    pub amount_due: Money,
    pub status: InstallmentStatus,
    pub matched_payment: Option<Payment>,
}

/// aggregate figures over a reconciled schedule, before penalties
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationSummary {
    pub paid_count: u32,
    /// unpaid and not yet past due (due today or upcoming)
    pub pending_count: u32,
    pub due_today_count: u32,
    pub upcoming_count: u32,
    pub overdue_count: u32,
    /// sum of amount due over every installment
    pub total_due: Money,
    /// sum of the amounts of payments matched to installments
    pub total_paid: Money,
    /// sum of amount due over paid installments
    pub total_settled: Money,
    /// sum of amount due over unpaid installments
    pub total_outstanding: Money,
    pub overdue_amount: Money,
    /// payments recorded beyond the tenure; they match no installment
    pub surplus_payments: u32,
    pub surplus_amount: Money,
}

impl ReconciliationSummary {
    /// every payment ever recorded, matched or surplus
    pub fn total_recorded(&self) -> Money {
        self.total_paid + self.surplus_amount
    }

    pub fn is_fully_paid(&self) -> bool {
        self.pending_count == 0 && self.overdue_count == 0
    }
}

/// reconciled view of one loan's schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledSchedule {
    pub as_of: NaiveDate,
    pub installments: Vec<Installment>,
    pub summary: ReconciliationSummary,
}

impl ReconciledSchedule {
    /// first installment without a matched payment
    pub fn next_unpaid(&self) -> Option<&Installment> {
        self.installments.iter().find(|i| i.status.is_unpaid())
    }

    pub fn next_due_date(&self) -> Option<NaiveDate> {
        self.next_unpaid().map(|i| i.due_date)
    }

    pub fn overdue(&self) -> impl Iterator<Item = &Installment> {
        self.installments
            .iter()
            .filter(|i| i.status == InstallmentStatus::Overdue)
    }

    /// days since the earliest overdue due date, 0 when nothing is overdue
    pub fn days_overdue(&self) -> u32 {
        self.overdue()
            .next()
            .map(|i| (self.as_of - i.due_date).num_days().max(0) as u32)
            .unwrap_or(0)
    }
}

/// assigns recorded payments to installments
///
/// Matching is positional: payment N settles installment N, whatever its
/// amount or date. Partial, out-of-order or mismatched payments are not
/// detected; payments are assumed to be recorded in EMI order for the EMI
/// amount.
pub struct PaymentMatcher;

impl PaymentMatcher {
    pub fn reconcile(
        schedule: &Schedule,
        payments: &[Payment],
        as_of: NaiveDate,
    ) -> Result<ReconciledSchedule> {
        if schedule.is_empty() {
            return Err(EmiError::Precondition {
                message: "reconciliation requires a generated schedule".to_string(),
            });
        }

        let mut summary = ReconciliationSummary::default();
        let mut installments = Vec::with_capacity(schedule.len());

        for (idx, scheduled) in schedule.installments.iter().enumerate() {
            let matched_payment = payments.get(idx).cloned();

            let status = match &matched_payment {
                Some(_) => InstallmentStatus::Paid,
                None if scheduled.due_date < as_of => InstallmentStatus::Overdue,
                None if scheduled.due_date == as_of => InstallmentStatus::PendingDueToday,
                None => InstallmentStatus::Upcoming,
            };

            summary.total_due += scheduled.amount_due;

            match status {
                InstallmentStatus::Paid => {
                    summary.paid_count += 1;
                    summary.total_settled += scheduled.amount_due;
                }
                InstallmentStatus::Overdue => {
                    summary.overdue_count += 1;
                    summary.overdue_amount += scheduled.amount_due;
                }
                InstallmentStatus::PendingDueToday => {
                    summary.pending_count += 1;
                    summary.due_today_count += 1;
                }
                InstallmentStatus::Upcoming => {
                    summary.pending_count += 1;
                    summary.upcoming_count += 1;
                }
            }

            if status.is_unpaid() {
                summary.total_outstanding += scheduled.amount_due;
            }

            if let Some(payment) = &matched_payment {
                if payment.amount.is_negative() || payment.date.is_none() {
                    warn!(
                        "installment {} matched to a payment with amount {} and date {:?}",
                        scheduled.sequence_number, payment.amount, payment.date
                    );
                }
                summary.total_paid += payment.amount;
            }

            installments.push(Installment {
                sequence_number: scheduled.sequence_number,
                due_date: scheduled.due_date,
                amount_due: scheduled.amount_due,
                status,
                matched_payment,
            });
        }

        if payments.len() > schedule.len() {
            let surplus = &payments[schedule.len()..];
            summary.surplus_payments = surplus.len() as u32;
            summary.surplus_amount = surplus.iter().map(|p| p.amount).sum();

            warn!(
                "{} payments recorded for a {}-installment schedule; {} left unmatched",
                payments.len(),
                schedule.len(),
                surplus.len()
            );
        }

        Ok(ReconciledSchedule {
            as_of,
            installments,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{LoanTerms, ScheduleGenerator};
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reference_schedule() -> Schedule {
        let terms = LoanTerms::new(
            Money::from_major(45_000),
            6,
            Money::from_major(9_075),
            Money::from_major(300),
            date(2025, 1, 10),
        )
        .unwrap();

        ScheduleGenerator::default().generate(&terms).unwrap()
    }

    fn exact_payments(schedule: &Schedule, count: usize) -> Vec<Payment> {
        schedule
            .installments
            .iter()
            .take(count)
            .map(|i| Payment::new(i.amount_due, i.due_date))
            .collect()
    }

    #[test]
    fn test_reference_reconciliation() {
        let schedule = reference_schedule();
        let payments = exact_payments(&schedule, 2);

        let result = PaymentMatcher::reconcile(&schedule, &payments, date(2025, 4, 5)).unwrap();
        let statuses: Vec<_> = result.installments.iter().map(|i| i.status).collect();

        assert_eq!(
            statuses,
            vec![
                InstallmentStatus::Paid,
                InstallmentStatus::Paid,
                InstallmentStatus::Overdue,
                InstallmentStatus::Upcoming,
                InstallmentStatus::Upcoming,
                InstallmentStatus::Upcoming,
            ]
        );
        assert_eq!(result.installments[2].due_date, date(2025, 4, 2));
        assert_eq!(result.installments[0].matched_payment, Some(payments[0].clone()));

        let summary = &result.summary;
        assert_eq!(summary.paid_count, 2);
        assert_eq!(summary.overdue_count, 1);
        assert_eq!(summary.pending_count, 3);
        assert_eq!(summary.total_paid, Money::from_major(18_450));
        assert_eq!(summary.total_outstanding, Money::from_major(36_300));
        assert_eq!(summary.overdue_amount, Money::from_major(9_075));
        assert_eq!(result.next_due_date(), Some(date(2025, 4, 2)));
        assert_eq!(result.days_overdue(), 3);
    }

    #[test]
    fn test_overdue_without_payments() {
        let schedule = reference_schedule();
        let as_of = schedule.installments[2].due_date + chrono::Duration::days(1);

        let result = PaymentMatcher::reconcile(&schedule, &[], as_of).unwrap();

        for installment in &result.installments[..3] {
            assert_eq!(installment.status, InstallmentStatus::Overdue);
        }
        assert_eq!(result.installments[3].status, InstallmentStatus::Upcoming);
        assert_eq!(result.summary.overdue_count, 3);
        assert_eq!(result.summary.total_paid, Money::ZERO);
    }

    #[test]
    fn test_due_today() {
        let schedule = reference_schedule();
        let as_of = schedule.installments[1].due_date;
        let payments = exact_payments(&schedule, 1);

        let result = PaymentMatcher::reconcile(&schedule, &payments, as_of).unwrap();

        assert_eq!(result.installments[1].status, InstallmentStatus::PendingDueToday);
        assert_eq!(result.summary.due_today_count, 1);
        assert_eq!(result.summary.overdue_count, 0);
        assert_eq!(result.days_overdue(), 0);
    }

    #[test]
    fn test_positional_matching_ignores_amounts() {
        let schedule = reference_schedule();
        // a token payment still marks installment #1 paid
        let payments = vec![Payment::new(Money::from_major(10), date(2025, 6, 30))];

        let result = PaymentMatcher::reconcile(&schedule, &payments, date(2025, 2, 1)).unwrap();

        assert_eq!(result.installments[0].status, InstallmentStatus::Paid);
        assert_eq!(result.summary.total_paid, Money::from_major(10));
        assert_eq!(result.summary.total_settled, Money::from_major(9_375));
    }

    #[test]
    fn test_tolerates_malformed_payments() {
        let schedule = reference_schedule();
        let payments = vec![Payment {
            amount: Money::from_major(-50),
            date: None,
            method: None,
            collected_by: None,
            loan_id: None,
        }];

        let result = PaymentMatcher::reconcile(&schedule, &payments, date(2025, 2, 1)).unwrap();
        assert_eq!(result.summary.paid_count, 1);
        assert_eq!(result.summary.total_paid, Money::from_major(-50));
    }

    #[test]
    fn test_surplus_payments() {
        let schedule = reference_schedule();
        let mut payments = exact_payments(&schedule, 6);
        payments.push(Payment::new(Money::from_major(500), date(2025, 8, 1)));

        let result = PaymentMatcher::reconcile(&schedule, &payments, date(2025, 8, 2)).unwrap();

        assert!(result.summary.is_fully_paid());
        assert_eq!(result.summary.surplus_payments, 1);
        assert_eq!(result.summary.surplus_amount, Money::from_major(500));
        assert_eq!(result.summary.total_recorded(), Money::from_major(55_250));
        assert_eq!(result.next_due_date(), None);
    }

    #[test]
    fn test_empty_schedule_is_precondition_error() {
        let mut schedule = reference_schedule();
        schedule.installments.clear();

        let result = PaymentMatcher::reconcile(&schedule, &[], date(2025, 2, 1));
        assert!(matches!(result, Err(EmiError::Precondition { .. })));
    }

    proptest! {
        #[test]
        fn prop_paid_prefix_and_conservation(count in 0usize..=6, offset in 0i64..400) {
            let schedule = reference_schedule();
            let payments = exact_payments(&schedule, count);
            let as_of = date(2025, 1, 1) + chrono::Duration::days(offset);

            let result = PaymentMatcher::reconcile(&schedule, &payments, as_of).unwrap();

            for (idx, installment) in result.installments.iter().enumerate() {
                prop_assert_eq!(installment.status == InstallmentStatus::Paid, idx < count);
            }

            let summary = &result.summary;
            prop_assert_eq!(summary.paid_count + summary.pending_count + summary.overdue_count, 6);
            prop_assert_eq!(summary.total_outstanding + summary.total_settled, summary.total_due);
            prop_assert_eq!(summary.total_outstanding + summary.total_paid, schedule.total_due());

            let again = PaymentMatcher::reconcile(&schedule, &payments, as_of).unwrap();
            prop_assert_eq!(result, again);
        }
    }
}
