/// quick start - price a purchase, generate its schedule and reconcile payments
use chrono::NaiveDate;
use emi_engine_rs::schedule::monthly_rate_for_down_payment;
use emi_engine_rs::{
    FlatRatePricing, LoanTerms, Money, Payment, PaymentMatcher, PaymentMode, ScheduleGenerator,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // a 50,000 phone with 5,000 down over 6 months
    let price = Money::from_major(50_000);
    let down = Money::from_major(5_000);
    let rate = monthly_rate_for_down_payment(price, down)?;
    let pricing = FlatRatePricing::price(price - down, rate, 6)?;
    println!("monthly rate {}, EMI {}", rate, pricing.installment_amount);

    let origin = NaiveDate::from_ymd_opt(2025, 1, 10).ok_or("bad date")?;
    let terms = LoanTerms::from_pricing(&pricing, Money::from_major(300), origin)?;
    let schedule = ScheduleGenerator::default().generate(&terms)?;

    for installment in &schedule.installments {
        println!(
            "#{} due {} amount {}",
            installment.sequence_number, installment.due_date, installment.amount_due
        );
    }

    let payments = vec![
        Payment::new(Money::from_major(9_375), NaiveDate::from_ymd_opt(2025, 2, 1).ok_or("bad date")?)
            .with_method(PaymentMode::Upi),
        Payment::new(Money::from_major(9_075), NaiveDate::from_ymd_opt(2025, 3, 2).ok_or("bad date")?),
    ];

    let as_of = NaiveDate::from_ymd_opt(2025, 4, 5).ok_or("bad date")?;
    let reconciled = PaymentMatcher::reconcile(&schedule, &payments, as_of)?;

    println!("{}", serde_json::to_string_pretty(&reconciled.summary)?);

    Ok(())
}
