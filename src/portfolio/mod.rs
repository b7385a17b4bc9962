pub mod aggregator;
pub mod export;
pub mod filter;

pub use aggregator::{
    LoanPosition, MonthlyEntry, MonthlyProfitBasis, PortfolioAggregator, PortfolioReport,
    PortfolioTotals, ScheduleState, ShopkeeperSummary,
};
pub use export::{InstallmentRow, MonthlyRow, ShopkeeperRow};
pub use filter::{Period, PortfolioFilter};
