use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::Loan;
use crate::portfolio::PortfolioFilter;
use crate::reconcile::{reconcile_loan, ReconciledSchedule, UnavailableSchedule};
use crate::schedule::ScheduleGenerator;
use crate::types::{LoanStatus, ShopkeeperId};

/// how gross profit is attributed to an origination month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthlyProfitBasis {
    /// every payment ever recorded on the loan, whatever its date; matches
    /// historically reported figures but overstates older months
    #[default]
    AllPayments,
    /// only payments dated inside the loan's origination month
    PaymentsInBucket,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleState {
    Reconciled(ReconciledSchedule),
    Unavailable { reason: String },
}

/// a loan paired with its reconciliation result
#[derive(Debug, Clone, PartialEq)]
pub struct LoanPosition<'a> {
    pub loan: &'a Loan,
    pub schedule: ScheduleState,
}

impl<'a> LoanPosition<'a> {
    /// reconcile the loan, keeping invalid terms as an unavailable schedule
    pub fn reconcile(loan: &'a Loan, generator: &ScheduleGenerator, as_of: NaiveDate) -> Self {
        let schedule = match reconcile_loan(generator, loan, as_of) {
            Ok(reconciled) => ScheduleState::Reconciled(reconciled),
            Err(err) => ScheduleState::Unavailable {
                reason: err.to_string(),
            },
        };

        Self { loan, schedule }
    }

    pub fn reconciled(&self) -> Option<&ReconciledSchedule> {
        match &self.schedule {
            ScheduleState::Reconciled(reconciled) => Some(reconciled),
            ScheduleState::Unavailable { .. } => None,
        }
    }
}

/// accounting entry for loans originated in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEntry {
    pub year: i32,
    pub month: u32,
    pub loan_count: u32,
    /// principal disbursed
    pub capital_investment: Money,
    pub gross_profit: Money,
    /// accumulated penalties
    pub loss: Money,
    pub balance: Money,
}

impl MonthlyEntry {
    fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            loan_count: 0,
            capital_investment: Money::ZERO,
            gross_profit: Money::ZERO,
            loss: Money::ZERO,
            balance: Money::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopkeeperSummary {
    pub shopkeeper_id: Option<ShopkeeperId>,
    pub loan_count: u32,
    pub active_loans: u32,
    pub overdue_loans: u32,
    pub total_disbursed: Money,
    pub total_collected: Money,
    pub total_outstanding: Money,
    pub total_penalty: Money,
    pub unavailable_count: u32,
}

impl ShopkeeperSummary {
    fn new(shopkeeper_id: Option<ShopkeeperId>) -> Self {
        Self {
            shopkeeper_id,
            loan_count: 0,
            active_loans: 0,
            overdue_loans: 0,
            total_disbursed: Money::ZERO,
            total_collected: Money::ZERO,
            total_outstanding: Money::ZERO,
            total_penalty: Money::ZERO,
            unavailable_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub loan_count: u32,
    pub total_principal: Money,
    pub total_collected: Money,
    /// unpaid EMIs of loans with a schedule
    pub total_outstanding: Money,
    pub total_penalty: Money,
    pub outstanding_with_penalties: Money,
    pub paid_installments: u32,
    pub overdue_installments: u32,
    pub overdue_amount: Money,
    /// loans with at least one overdue installment
    pub overdue_loans: u32,
    pub max_days_overdue: u32,
    pub unavailable_count: u32,
    /// loans without any origin date; counted here but absent from `by_month`
    pub undated_loans: u32,
    pub undated_capital: Money,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
    /// ordered by (year, month) of each loan's origin date (emi start first,
    /// then applied, approved, created). Period filters select on the applied
    /// date instead, so a loan applied late in a month whose EMIs start the
    /// next month passes a filter for the first month and lands in the
    /// second month's bucket.
    pub by_month: Vec<MonthlyEntry>,
    /// ordered by shopkeeper id, unassigned first
    pub by_shopkeeper: Vec<ShopkeeperSummary>,
    pub totals: PortfolioTotals,
    pub unavailable: Vec<UnavailableSchedule>,
}

/// cross-loan rollups over reconciled loans
#[derive(Debug, Clone, Copy, Default)]
pub struct PortfolioAggregator {
    profit_basis: MonthlyProfitBasis,
}

impl PortfolioAggregator {
    pub fn new(profit_basis: MonthlyProfitBasis) -> Self {
        Self { profit_basis }
    }

    /// reconcile and aggregate raw loans in one call
    pub fn aggregate_loans(
        &self,
        loans: &[Loan],
        filter: &PortfolioFilter,
        generator: &ScheduleGenerator,
        as_of: NaiveDate,
    ) -> Result<PortfolioReport> {
        let positions: Vec<_> = filter
            .apply(loans)?
            .into_iter()
            .map(|loan| LoanPosition::reconcile(loan, generator, as_of))
            .collect();

        self.aggregate(&positions, filter)
    }

    /// roll up positions, applying the filter before any grouping
    pub fn aggregate(&self, positions: &[LoanPosition<'_>], filter: &PortfolioFilter) -> Result<PortfolioReport> {
        filter.validate()?;

        let mut months: BTreeMap<(i32, u32), MonthlyEntry> = BTreeMap::new();
        let mut shopkeepers: BTreeMap<Option<ShopkeeperId>, ShopkeeperSummary> = BTreeMap::new();
        let mut report = PortfolioReport::default();

        for position in positions.iter().filter(|p| filter.matches(p.loan)) {
            let loan = position.loan;
            let collected = loan.total_recorded_payments();

            if let Some(origin) = loan.origin_date() {
                let key = (origin.year(), origin.month());
                let entry = months
                    .entry(key)
                    .or_insert_with(|| MonthlyEntry::new(key.0, key.1));

                entry.loan_count += 1;
                entry.capital_investment += loan.loan_amount;
                entry.gross_profit += self.gross_profit(loan, key);
                entry.loss += loan.total_penalty;
            } else {
                report.totals.undated_loans += 1;
                report.totals.undated_capital += loan.loan_amount;
            }

            let shopkeeper = shopkeepers
                .entry(loan.shopkeeper_id.clone())
                .or_insert_with(|| ShopkeeperSummary::new(loan.shopkeeper_id.clone()));

            shopkeeper.loan_count += 1;
            shopkeeper.total_disbursed += loan.loan_amount;
            shopkeeper.total_collected += collected;
            shopkeeper.total_penalty += loan.total_penalty;
            match loan.status {
                LoanStatus::Active => shopkeeper.active_loans += 1,
                LoanStatus::Overdue => shopkeeper.overdue_loans += 1,
                _ => {}
            }

            let totals = &mut report.totals;
            totals.loan_count += 1;
            totals.total_principal += loan.loan_amount;
            totals.total_collected += collected;
            totals.total_penalty += loan.total_penalty;

            match &position.schedule {
                ScheduleState::Reconciled(reconciled) => {
                    let summary = &reconciled.summary;

                    shopkeeper.total_outstanding += summary.total_outstanding;

                    totals.total_outstanding += summary.total_outstanding;
                    totals.paid_installments += summary.paid_count;
                    totals.overdue_installments += summary.overdue_count;
                    totals.overdue_amount += summary.overdue_amount;
                    if summary.overdue_count > 0 {
                        totals.overdue_loans += 1;
                    }
                    totals.max_days_overdue = totals.max_days_overdue.max(reconciled.days_overdue());
                }
                ScheduleState::Unavailable { reason } => {
                    shopkeeper.unavailable_count += 1;
                    totals.unavailable_count += 1;
                    report.unavailable.push(UnavailableSchedule {
                        loan_id: loan.id.clone(),
                        reason: reason.clone(),
                    });
                }
            }
        }

        report.totals.outstanding_with_penalties =
            report.totals.total_outstanding + report.totals.total_penalty;

        report.by_month = months
            .into_values()
            .map(|mut entry| {
                entry.balance = entry.gross_profit - entry.loss;
                entry
            })
            .collect();
        report.by_shopkeeper = shopkeepers.into_values().collect();

        Ok(report)
    }

    fn gross_profit(&self, loan: &Loan, (year, month): (i32, u32)) -> Money {
        match self.profit_basis {
            MonthlyProfitBasis::AllPayments => loan.total_recorded_payments(),
            MonthlyProfitBasis::PaymentsInBucket => loan
                .payments
                .iter()
                .filter(|p| {
                    p.date
                        .map(|d| d.year() == year && d.month() == month)
                        .unwrap_or(false)
                })
                .map(|p| p.amount)
                .sum(),
        }
    }
}
