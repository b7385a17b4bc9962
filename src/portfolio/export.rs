/// flat row views for tabular export
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::portfolio::{MonthlyEntry, PortfolioReport};
use crate::reconcile::ReconciledSchedule;
use crate::types::{InstallmentStatus, LoanId, PaymentMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRow {
    /// "YYYY-MM"
    pub month: String,
    pub loan_count: u32,
    pub capital_investment: Money,
    pub gross_profit: Money,
    pub loss: Money,
    pub balance: Money,
}

impl From<&MonthlyEntry> for MonthlyRow {
    fn from(entry: &MonthlyEntry) -> Self {
        MonthlyRow {
            month: format!("{:04}-{:02}", entry.year, entry.month),
            loan_count: entry.loan_count,
            capital_investment: entry.capital_investment,
            gross_profit: entry.gross_profit,
            loss: entry.loss,
            balance: entry.balance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopkeeperRow {
    /// "unassigned" when the loan carries no shopkeeper
    pub shopkeeper: String,
    pub loan_count: u32,
    pub active_loans: u32,
    pub overdue_loans: u32,
    pub total_disbursed: Money,
    pub total_collected: Money,
    pub total_outstanding: Money,
    pub total_penalty: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentRow {
    pub loan_id: LoanId,
    pub sequence_number: u32,
    pub due_date: NaiveDate,
    pub amount_due: Money,
    pub status: InstallmentStatus,
    pub paid_amount: Option<Money>,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMode>,
}

pub fn monthly_rows(report: &PortfolioReport) -> Vec<MonthlyRow> {
    report.by_month.iter().map(MonthlyRow::from).collect()
}

pub fn shopkeeper_rows(report: &PortfolioReport) -> Vec<ShopkeeperRow> {
    report
        .by_shopkeeper
        .iter()
        .map(|summary| ShopkeeperRow {
            shopkeeper: summary
                .shopkeeper_id
                .clone()
                .unwrap_or_else(|| "unassigned".to_string()),
            loan_count: summary.loan_count,
            active_loans: summary.active_loans,
            overdue_loans: summary.overdue_loans,
            total_disbursed: summary.total_disbursed,
            total_collected: summary.total_collected,
            total_outstanding: summary.total_outstanding,
            total_penalty: summary.total_penalty,
        })
        .collect()
}

/// one row per installment of a reconciled schedule
pub fn installment_rows(loan_id: &str, reconciled: &ReconciledSchedule) -> Vec<InstallmentRow> {
    reconciled
        .installments
        .iter()
        .map(|installment| {
            let payment = installment.matched_payment.as_ref();
            InstallmentRow {
                loan_id: loan_id.to_string(),
                sequence_number: installment.sequence_number,
                due_date: installment.due_date,
                amount_due: installment.amount_due,
                status: installment.status,
                paid_amount: payment.map(|p| p.amount),
                paid_date: payment.and_then(|p| p.date),
                payment_method: payment.and_then(|p| p.method.clone()),
            }
        })
        .collect()
}

pub fn to_json<T: Serialize>(rows: &[T]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}
