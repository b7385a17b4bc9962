pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod penalty;
pub mod portfolio;
pub mod reconcile;
pub mod recovery;
pub mod schedule;
pub mod types;

// re-export key types
pub use config::{EngineConfig, PenaltyConfiguration, ScheduleConfig};
pub use decimal::{Money, Rate};
pub use errors::{EmiError, Result};
pub use events::{Event, EventStore};
pub use loan::{Loan, Payment, Penalty};
pub use penalty::{PenaltyDecision, PenaltyEngine, PenaltySweep, SweepReport};
pub use portfolio::{
    LoanPosition, MonthlyEntry, MonthlyProfitBasis, Period, PortfolioAggregator, PortfolioFilter,
    PortfolioReport, ShopkeeperSummary,
};
pub use reconcile::{
    reconcile_loan, Installment, PaymentMatcher, ReconciledSchedule, ReconciliationCache,
    ReconciliationSummary, UnavailableSchedule,
};
pub use recovery::{RecoveryQueue, RecoverySnapshot};
pub use schedule::{
    FlatRatePricing, LoanTerms, Schedule, ScheduleGenerator, ScheduledInstallment,
};
pub use types::{
    InstallmentStatus, LoanId, LoanStatus, PaymentMode, PenaltyCalculationType, ShopkeeperId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
