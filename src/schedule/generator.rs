use chrono::{Datelike, Months, NaiveDate};
use log::debug;

use crate::config::ScheduleConfig;
use crate::errors::{EmiError, Result};
use crate::schedule::{LoanTerms, Schedule, ScheduledInstallment};

/// builds the installment schedule of a loan from its terms
///
/// Loans originated on or before the cut-off day start paying on the due day
/// of the next month; later loans skip a month. Every later installment falls
/// exactly one calendar month after the previous one. The generator is pure:
/// the same terms always produce the same schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleGenerator {
    config: ScheduleConfig,
}

impl ScheduleGenerator {
    pub fn new(config: ScheduleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// due date of installment #1 for a loan originated on `origin`
    pub fn first_due_date(&self, origin: NaiveDate) -> Result<NaiveDate> {
        let offset = if origin.day() <= self.config.cutoff_day { 1 } else { 2 };

        let anchor = NaiveDate::from_ymd_opt(origin.year(), origin.month(), self.config.due_day)
            .ok_or_else(|| {
                EmiError::invalid_terms(format!("no due day {} in month of {}", self.config.due_day, origin))
            })?;

        add_months(anchor, offset)
    }

    /// generate the full schedule: exactly `tenure_months` installments
    pub fn generate(&self, terms: &LoanTerms) -> Result<Schedule> {
        terms.validate()?;

        let first_due = self.first_due_date(terms.origin_date)?;

        let installments = (1..=terms.tenure_months)
            .map(|sequence_number| -> Result<ScheduledInstallment> {
                let due_date = add_months(first_due, sequence_number - 1)?;
                let amount_due = if sequence_number == 1 {
                    terms.installment_amount + terms.file_charge
                } else {
                    terms.installment_amount
                };

                Ok(ScheduledInstallment {
                    sequence_number,
                    due_date,
                    amount_due,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "generated {} installments from {} (first due {})",
            installments.len(),
            terms.origin_date,
            first_due
        );

        Ok(Schedule {
            terms: terms.clone(),
            installments,
        })
    }
}

/// add calendar months to a date
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        EmiError::invalid_terms(format!("date overflow adding {} months to {}", months, date))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn terms(origin: NaiveDate, tenure: u32) -> LoanTerms {
        LoanTerms::new(
            Money::from_major(45_000),
            tenure,
            Money::from_major(9_075),
            Money::from_major(300),
            origin,
        )
        .unwrap()
    }

    #[test]
    fn test_cutoff_boundary() {
        let generator = ScheduleGenerator::default();

        assert_eq!(generator.first_due_date(date(2025, 1, 18)).unwrap(), date(2025, 2, 2));
        assert_eq!(generator.first_due_date(date(2025, 1, 19)).unwrap(), date(2025, 3, 2));
        assert_eq!(generator.first_due_date(date(2025, 1, 1)).unwrap(), date(2025, 2, 2));
        assert_eq!(generator.first_due_date(date(2025, 1, 31)).unwrap(), date(2025, 3, 2));
    }

    #[test]
    fn test_cutoff_across_year_end() {
        let generator = ScheduleGenerator::default();

        assert_eq!(generator.first_due_date(date(2024, 12, 10)).unwrap(), date(2025, 1, 2));
        assert_eq!(generator.first_due_date(date(2024, 12, 25)).unwrap(), date(2025, 2, 2));
        assert_eq!(generator.first_due_date(date(2024, 11, 30)).unwrap(), date(2025, 1, 2));
    }

    #[test]
    fn test_reference_schedule() {
        let generator = ScheduleGenerator::default();
        let schedule = generator.generate(&terms(date(2025, 1, 10), 6)).unwrap();

        assert_eq!(schedule.len(), 6);
        assert_eq!(schedule.first_due_date(), Some(date(2025, 2, 2)));
        assert_eq!(schedule.last_due_date(), Some(date(2025, 7, 2)));

        assert_eq!(schedule.installments[0].amount_due, Money::from_major(9_375));
        for installment in &schedule.installments[1..] {
            assert_eq!(installment.amount_due, Money::from_major(9_075));
        }

        assert_eq!(schedule.get(3).unwrap().due_date, date(2025, 4, 2));
        assert!(schedule.get(0).is_none());
        assert!(schedule.get(7).is_none());
        assert_eq!(schedule.total_due(), Money::from_major(54_750));
    }

    #[test]
    fn test_file_charge_surcharge() {
        let generator = ScheduleGenerator::default();
        let schedule = generator.generate(&terms(date(2025, 1, 10), 6)).unwrap();

        let surcharge = schedule.installments[0].amount_due - schedule.installments[1].amount_due;
        assert_eq!(surcharge, schedule.terms.file_charge);
    }

    #[test]
    fn test_single_installment_carries_file_charge() {
        let generator = ScheduleGenerator::default();
        let schedule = generator.generate(&terms(date(2025, 1, 10), 1)).unwrap();

        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.installments[0].amount_due, Money::from_major(9_375));
    }

    #[test]
    fn test_rejects_zero_tenure() {
        let generator = ScheduleGenerator::default();
        let mut bad = terms(date(2025, 1, 10), 6);
        bad.tenure_months = 0;

        assert!(matches!(generator.generate(&bad), Err(EmiError::InvalidTerms { .. })));
    }

    #[test]
    fn test_custom_convention() {
        let generator = ScheduleGenerator::new(ScheduleConfig { cutoff_day: 10, due_day: 5 }).unwrap();

        assert_eq!(generator.first_due_date(date(2025, 3, 10)).unwrap(), date(2025, 4, 5));
        assert_eq!(generator.first_due_date(date(2025, 3, 11)).unwrap(), date(2025, 5, 5));

        assert!(ScheduleGenerator::new(ScheduleConfig { cutoff_day: 18, due_day: 29 }).is_err());
    }

    proptest! {
        #[test]
        fn prop_schedule_shape(
            days in 0i64..20_000,
            tenure in 1u32..=60,
        ) {
            let origin = date(2000, 1, 1) + chrono::Duration::days(days);
            let generator = ScheduleGenerator::default();
            let schedule = generator.generate(&terms(origin, tenure)).unwrap();

            prop_assert_eq!(schedule.len(), tenure as usize);

            for (idx, installment) in schedule.installments.iter().enumerate() {
                prop_assert_eq!(installment.sequence_number, idx as u32 + 1);
                prop_assert_eq!(installment.due_date.day(), 2);
            }

            for pair in schedule.installments.windows(2) {
                prop_assert_eq!(add_months(pair[0].due_date, 1).unwrap(), pair[1].due_date);
            }

            let first = schedule.installments[0].due_date;
            prop_assert!(first > origin);
        }

        #[test]
        fn prop_generation_is_deterministic(days in 0i64..20_000, tenure in 1u32..=36) {
            let origin = date(2000, 1, 1) + chrono::Duration::days(days);
            let generator = ScheduleGenerator::default();

            let a = generator.generate(&terms(origin, tenure)).unwrap();
            let b = generator.generate(&terms(origin, tenure)).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
