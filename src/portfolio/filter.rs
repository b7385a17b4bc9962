use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{EmiError, Result};
use crate::loan::Loan;
use crate::types::ShopkeeperId;

/// reporting period; a month and a range are mutually exclusive by construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Period {
    #[default]
    All,
    Month {
        year: i32,
        month: u32,
    },
    /// inclusive on both ends
    Range {
        from: NaiveDate,
        to: NaiveDate,
    },
}

impl Period {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Period::All => Ok(()),
            Period::Month { month, .. } if !(1..=12).contains(&month) => Err(
                EmiError::invalid_filter(format!("month must be within 1..=12, got {}", month)),
            ),
            Period::Month { .. } => Ok(()),
            Period::Range { from, to } if from > to => Err(EmiError::invalid_filter(format!(
                "range start {} is after range end {}",
                from, to
            ))),
            Period::Range { .. } => Ok(()),
        }
    }

    /// undated loans only fall inside `All`
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        match (*self, date) {
            (Period::All, _) => true,
            (_, None) => false,
            (Period::Month { year, month }, Some(d)) => d.year() == year && d.month() == month,
            (Period::Range { from, to }, Some(d)) => from <= d && d <= to,
        }
    }
}

/// predicates applied to loans before any grouping
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioFilter {
    pub period: Period,
    pub shopkeeper_id: Option<ShopkeeperId>,
    /// free text matched against loan id and borrower name
    pub search: Option<String>,
}

impl PortfolioFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// select a calendar month, replacing any range
    pub fn month(mut self, year: i32, month: u32) -> Self {
        self.period = Period::Month { year, month };
        self
    }

    /// select a date range, replacing any month
    pub fn range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.period = Period::Range { from, to };
        self
    }

    pub fn shopkeeper(mut self, shopkeeper_id: impl Into<ShopkeeperId>) -> Self {
        self.shopkeeper_id = Some(shopkeeper_id.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.period.validate()
    }

    pub fn matches(&self, loan: &Loan) -> bool {
        if let Some(shopkeeper) = &self.shopkeeper_id {
            if loan.shopkeeper_id.as_ref() != Some(shopkeeper) {
                return false;
            }
        }

        if !self.period.contains(loan.filter_date()) {
            return false;
        }

        match &self.search {
            Some(text) => loan.matches_text(text),
            None => true,
        }
    }

    pub fn apply<'a>(&self, loans: &'a [Loan]) -> Result<Vec<&'a Loan>> {
        self.validate()?;
        Ok(loans.iter().filter(|loan| self.matches(loan)).collect())
    }
}
