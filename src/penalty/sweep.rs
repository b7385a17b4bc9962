use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::loan::{Loan, Penalty};
use crate::penalty::{PenaltyDecision, PenaltyEngine};
use crate::reconcile::{reconcile_loan, UnavailableSchedule};
use crate::schedule::ScheduleGenerator;
use crate::types::LoanId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPenalty {
    pub loan_id: LoanId,
    pub penalty: Penalty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedPenalty {
    pub loan_id: LoanId,
    pub decision: PenaltyDecision,
}

/// result of one sweep over a loan book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub as_of: NaiveDate,
    pub evaluated: usize,
    /// loans outside Active/Overdue
    pub skipped: usize,
    pub applied: Vec<AppliedPenalty>,
    pub proposed: Vec<ProposedPenalty>,
    pub unavailable: Vec<UnavailableSchedule>,
}

impl SweepReport {
    fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            evaluated: 0,
            skipped: 0,
            applied: Vec::new(),
            proposed: Vec::new(),
            unavailable: Vec::new(),
        }
    }
}

/// the single authoritative penalty pass over a loan book
///
/// Loans are processed one at a time through `&mut`, so the per-loan
/// duplicate guard holds within a run. Running several sweeps against the
/// same backend still needs a uniqueness constraint on `(loanId, dueDate)`
/// at the persistence layer.
#[derive(Debug, Clone)]
pub struct PenaltySweep {
    engine: PenaltyEngine,
    generator: ScheduleGenerator,
}

impl PenaltySweep {
    pub fn new(engine: PenaltyEngine, generator: ScheduleGenerator) -> Self {
        Self { engine, generator }
    }

    pub fn engine(&self) -> &PenaltyEngine {
        &self.engine
    }

    /// sweep as of the provider's current date
    pub fn run(
        &self,
        loans: &mut [Loan],
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<SweepReport> {
        let now = time_provider.now();
        self.run_at(loans, now.date_naive(), now, events)
    }

    /// sweep for an explicit as-of date, stamping penalties with `now`
    pub fn run_at(
        &self,
        loans: &mut [Loan],
        as_of: NaiveDate,
        now: DateTime<Utc>,
        events: &mut EventStore,
    ) -> Result<SweepReport> {
        let mut report = SweepReport::new(as_of);

        for loan in loans.iter_mut() {
            if !loan.status.is_collectible() {
                report.skipped += 1;
                continue;
            }
            report.evaluated += 1;

            let due_date = match loan.next_due_date {
                Some(due) => Some(due),
                None => match reconcile_loan(&self.generator, loan, as_of) {
                    Ok(reconciled) => reconciled.next_due_date(),
                    Err(err) => {
                        warn!("schedule unavailable for loan {}: {}", loan.id, err);
                        events.emit(Event::ScheduleUnavailable {
                            loan_id: loan.id.clone(),
                            reason: err.to_string(),
                            timestamp: now,
                        });
                        report.unavailable.push(UnavailableSchedule {
                            loan_id: loan.id.clone(),
                            reason: err.to_string(),
                        });
                        continue;
                    }
                },
            };

            let decision = self.engine.evaluate_due(loan, due_date, as_of);
            if !decision.should_apply {
                continue;
            }

            if !self.engine.config().auto_apply_penalties {
                if let Some(due_date) = decision.due_date {
                    events.emit(Event::PenaltyProposed {
                        loan_id: loan.id.clone(),
                        amount: decision.amount,
                        due_date,
                        timestamp: now,
                    });
                }
                report.proposed.push(ProposedPenalty {
                    loan_id: loan.id.clone(),
                    decision,
                });
                continue;
            }

            let old_status = loan.status;
            let Some(penalty) = self.engine.apply_penalty(loan, &decision, now)? else {
                continue;
            };

            if let Some(due_date) = penalty.due_date {
                events.emit(Event::PenaltyApplied {
                    loan_id: loan.id.clone(),
                    penalty_id: penalty.id,
                    amount: penalty.amount,
                    due_date,
                    days_overdue: decision.days_overdue,
                    timestamp: now,
                });
            }

            if loan.status != old_status {
                events.emit(Event::StatusChanged {
                    loan_id: loan.id.clone(),
                    old_status,
                    new_status: loan.status,
                    reason: decision.reason.clone(),
                    timestamp: now,
                });
            }

            report.applied.push(AppliedPenalty {
                loan_id: loan.id.clone(),
                penalty,
            });
        }

        events.emit(Event::SweepCompleted {
            as_of,
            evaluated: report.evaluated,
            applied: report.applied.len(),
            timestamp: now,
        });

        info!(
            "penalty sweep as of {}: {} evaluated, {} applied, {} proposed, {} unavailable",
            as_of,
            report.evaluated,
            report.applied.len(),
            report.proposed.len(),
            report.unavailable.len()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PenaltyConfiguration;
    use crate::decimal::Money;
    use crate::loan::Payment;
    use crate::types::LoanStatus;
    use chrono::{Duration, TimeZone};
    use hourglass_rs::TimeSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn book() -> Vec<Loan> {
        let mut behind = Loan::new("LN-1", Money::from_major(45_000), 6, Money::from_major(9_075), date(2025, 1, 10));
        behind.file_charge = Money::from_major(300);
        behind.payments.push(Payment::new(Money::from_major(9_375), date(2025, 2, 2)));

        let mut current = Loan::new("LN-2", Money::from_major(20_000), 4, Money::from_major(5_750), date(2025, 3, 1));
        current.next_due_date = Some(date(2025, 5, 2));

        let mut settled = Loan::new("LN-3", Money::from_major(10_000), 2, Money::from_major(5_375), date(2024, 6, 1));
        settled.status = LoanStatus::Paid;

        let mut broken = Loan::new("LN-4", Money::from_major(10_000), 0, Money::from_major(5_375), date(2025, 1, 1));
        broken.next_due_date = None;

        vec![behind, current, settled, broken]
    }

    fn sweep(config: PenaltyConfiguration) -> PenaltySweep {
        PenaltySweep::new(PenaltyEngine::new(config).unwrap(), ScheduleGenerator::default())
    }

    #[test]
    fn test_auto_apply_sweep() {
        let sweep = sweep(PenaltyConfiguration::default().with_auto_apply(true));
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 4, 5, 6, 0, 0).unwrap(),
        ));
        let mut loans = book();
        let mut events = EventStore::new();

        let report = sweep.run(&mut loans, &time, &mut events).unwrap();

        assert_eq!(report.as_of, date(2025, 4, 5));
        assert_eq!(report.evaluated, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].loan_id, "LN-1");
        // derived from the schedule: installment #2 due 2025-03-02 is the first unpaid
        assert_eq!(report.applied[0].penalty.due_date, Some(date(2025, 3, 2)));
        assert_eq!(report.unavailable.len(), 1);
        assert_eq!(report.unavailable[0].loan_id, "LN-4");

        assert_eq!(loans[0].status, LoanStatus::Overdue);
        assert_eq!(loans[0].total_penalty, Money::from_major(500));
        assert_eq!(loans[1].penalties.len(), 0);

        let events = events.take_events();
        assert!(events.iter().any(|e| matches!(e, Event::PenaltyApplied { loan_id, .. } if loan_id == "LN-1")));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::StatusChanged { old_status: LoanStatus::Active, new_status: LoanStatus::Overdue, .. }
        )));
        assert!(events.iter().any(|e| matches!(e, Event::ScheduleUnavailable { .. })));
        assert!(matches!(events.last(), Some(Event::SweepCompleted { applied: 1, .. })));
    }

    #[test]
    fn test_repeat_sweeps_do_not_double_charge() {
        let sweep = sweep(PenaltyConfiguration::default().with_auto_apply(true));
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 4, 5, 6, 0, 0).unwrap(),
        ));
        let control = time.test_control().unwrap();
        let mut loans = book();
        let mut events = EventStore::new();

        sweep.run(&mut loans, &time, &mut events).unwrap();
        control.advance(Duration::days(1));
        let second = sweep.run(&mut loans, &time, &mut events).unwrap();

        assert!(second.applied.is_empty());
        assert_eq!(loans[0].penalties.len(), 1);
    }

    #[test]
    fn test_proposals_without_auto_apply() {
        let sweep = sweep(PenaltyConfiguration::default());
        let now = Utc.with_ymd_and_hms(2025, 5, 10, 6, 0, 0).unwrap();
        let mut loans = book();
        let mut events = EventStore::new();

        let report = sweep.run_at(&mut loans, date(2025, 5, 10), now, &mut events).unwrap();

        assert!(report.applied.is_empty());
        assert_eq!(report.proposed.len(), 2);
        assert!(loans.iter().all(|l| l.penalties.is_empty()));
        assert_eq!(loans[0].status, LoanStatus::Active);
        assert!(events.events().iter().any(|e| matches!(e, Event::PenaltyProposed { .. })));
    }
}
