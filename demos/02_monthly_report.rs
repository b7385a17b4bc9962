/// monthly report - aggregate a loan book loaded from json
use chrono::NaiveDate;
use emi_engine_rs::portfolio::export::{monthly_rows, shopkeeper_rows, to_json};
use emi_engine_rs::{Loan, PortfolioAggregator, PortfolioFilter, ScheduleGenerator};

const BOOK: &str = r#"[
  {
    "id": "LN-1",
    "status": "active",
    "loanAmount": "45000",
    "tenure": 6,
    "emiAmount": "9075",
    "fileCharge": "300",
    "appliedDate": "2025-01-10",
    "shopkeeperId": "SK-1",
    "customerName": "Asha Rao",
    "payments": [
      { "amount": "9375", "paymentDate": "2025-02-02", "paymentMode": "UPI" },
      { "amount": "9075", "paymentDate": "2025-03-02", "paymentMode": "cash" }
    ]
  },
  {
    "id": "LN-2",
    "status": "overdue",
    "loanAmount": "20000",
    "tenure": 4,
    "emiAmount": "5750",
    "appliedDate": "2025-02-21",
    "shopkeeperId": "SK-2",
    "totalPenalty": "500"
  }
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loans: Vec<Loan> = serde_json::from_str(BOOK)?;
    let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).ok_or("bad date")?;

    let report = PortfolioAggregator::default().aggregate_loans(
        &loans,
        &PortfolioFilter::new(),
        &ScheduleGenerator::default(),
        as_of,
    )?;

    println!("{}", to_json(&monthly_rows(&report))?);
    println!("{}", to_json(&shopkeeper_rows(&report))?);
    println!(
        "outstanding {} across {} loans",
        report.totals.outstanding_with_penalties, report.totals.loan_count
    );

    // narrow to one shopkeeper before grouping
    let filtered = PortfolioAggregator::default().aggregate_loans(
        &loans,
        &PortfolioFilter::new().shopkeeper("SK-2"),
        &ScheduleGenerator::default(),
        as_of,
    )?;
    println!("SK-2 capital: {}", filtered.totals.total_principal);

    Ok(())
}
