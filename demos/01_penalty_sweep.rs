/// penalty sweep - run the daily late-fee pass under a controllable clock
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use emi_engine_rs::{
    EventStore, Loan, Money, PenaltyConfiguration, PenaltyEngine, PenaltySweep, RecoveryQueue,
    SafeTimeProvider, ScheduleGenerator, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let applied = NaiveDate::from_ymd_opt(2025, 1, 10).ok_or("bad date")?;
    let mut loans = vec![
        Loan::new("LN-1001", Money::from_major(45_000), 6, Money::from_major(9_075), applied),
        Loan::new("LN-1002", Money::from_major(20_000), 4, Money::from_major(5_750), applied),
    ];

    let config = PenaltyConfiguration::default()
        .with_grace_period(3)
        .with_auto_apply(true);
    let generator = ScheduleGenerator::default();
    let sweep = PenaltySweep::new(PenaltyEngine::new(config)?, generator);

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 2, 4, 6, 0, 0).unwrap()));
    let control = time.test_control().expect("test time source");
    let mut events = EventStore::new();

    // still inside the grace period on the 4th, penalised on the 6th
    for _ in 0..3 {
        let report = sweep.run(&mut loans, &time, &mut events)?;
        println!(
            "{}: {} applied, {} evaluated",
            report.as_of,
            report.applied.len(),
            report.evaluated
        );
        control.advance(Duration::days(1));
    }

    for event in events.take_events() {
        println!("{:?}", event);
    }

    let queue = RecoveryQueue::build(&loans, &generator, time.now().date_naive());
    println!("to recover: {}", queue.total_to_recover());

    Ok(())
}
