use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{EmiError, Result};
use crate::types::PenaltyCalculationType;

/// late-fee policy, supplied by the caller rather than stored in the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PenaltyConfiguration {
    /// flat late fee used in fixed mode
    pub default_penalty_amount: Money,
    /// days after a due date before a late fee is due
    pub grace_period_days: u32,
    pub penalty_calculation_type: PenaltyCalculationType,
    /// percent of the EMI used in percentage mode
    pub penalty_percentage: Decimal,
    /// whether a sweep applies penalties or only proposes them
    pub auto_apply_penalties: bool,
}

impl Default for PenaltyConfiguration {
    fn default() -> Self {
        Self {
            default_penalty_amount: Money::from_major(500),
            grace_period_days: 0,
            penalty_calculation_type: PenaltyCalculationType::Fixed,
            penalty_percentage: Decimal::ZERO,
            auto_apply_penalties: false,
        }
    }
}

impl PenaltyConfiguration {
    /// flat late fee
    pub fn fixed(amount: Money) -> Self {
        Self {
            default_penalty_amount: amount,
            ..Self::default()
        }
    }

    /// late fee as a percentage of the EMI
    pub fn percentage(percent: Decimal) -> Self {
        Self {
            penalty_calculation_type: PenaltyCalculationType::Percentage,
            penalty_percentage: percent,
            ..Self::default()
        }
    }

    pub fn with_grace_period(mut self, days: u32) -> Self {
        self.grace_period_days = days;
        self
    }

    pub fn with_auto_apply(mut self, enabled: bool) -> Self {
        self.auto_apply_penalties = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self.penalty_calculation_type {
            PenaltyCalculationType::Fixed => {
                if self.default_penalty_amount.is_negative() {
                    return Err(EmiError::invalid_configuration(format!(
                        "penalty amount must not be negative, got {}",
                        self.default_penalty_amount
                    )));
                }
            }
            PenaltyCalculationType::Percentage => {
                if self.penalty_percentage <= Decimal::ZERO {
                    return Err(EmiError::invalid_configuration(
                        "percentage penalty mode requires a positive penaltyPercentage",
                    ));
                }
            }
        }

        Ok(())
    }
}

/// due-date convention for schedule generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleConfig {
    /// last day-of-month whose loans start paying the following month
    pub cutoff_day: u32,
    /// day-of-month every installment falls on
    pub due_day: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cutoff_day: 18,
            due_day: 2,
        }
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=31).contains(&self.cutoff_day) {
            return Err(EmiError::invalid_configuration(format!(
                "cutoff day must be within 1..=31, got {}",
                self.cutoff_day
            )));
        }

        // every month has a 28th, so the due date never needs clamping
        if !(1..=28).contains(&self.due_day) {
            return Err(EmiError::invalid_configuration(format!(
                "due day must be within 1..=28, got {}",
                self.due_day
            )));
        }

        Ok(())
    }
}

/// engine-wide configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub schedule: ScheduleConfig,
    pub penalty: PenaltyConfiguration,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.schedule.validate()?;
        self.penalty.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = PenaltyConfiguration::default();
        assert_eq!(config.default_penalty_amount, Money::from_major(500));
        assert_eq!(config.grace_period_days, 0);
        assert_eq!(config.penalty_calculation_type, PenaltyCalculationType::Fixed);
        assert!(!config.auto_apply_penalties);

        let schedule = ScheduleConfig::default();
        assert_eq!(schedule.cutoff_day, 18);
        assert_eq!(schedule.due_day, 2);
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{ "penalty": { "gracePeriodDays": 3, "autoApplyPenalties": true } }"#;
        let config = EngineConfig::from_json(json).unwrap();

        assert_eq!(config.penalty.grace_period_days, 3);
        assert!(config.penalty.auto_apply_penalties);
        assert_eq!(config.penalty.default_penalty_amount, Money::from_major(500));
        assert_eq!(config.schedule, ScheduleConfig::default());
    }

    #[test]
    fn test_percentage_mode_requires_percentage() {
        let json = r#"{ "penalty": { "penaltyCalculationType": "percentage" } }"#;
        let err = EngineConfig::from_json(json).unwrap_err();
        assert!(matches!(err, EmiError::InvalidConfiguration { .. }));

        assert!(PenaltyConfiguration::percentage(dec!(2)).validate().is_ok());
    }

    #[test]
    fn test_schedule_bounds() {
        let config = ScheduleConfig { cutoff_day: 18, due_day: 30 };
        assert!(config.validate().is_err());

        let config = ScheduleConfig { cutoff_day: 0, due_day: 2 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_fixed_amount() {
        let config = PenaltyConfiguration::fixed(Money::from_major(-10));
        assert!(config.validate().is_err());
    }
}
