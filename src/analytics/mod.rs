//! Read-only computations over a [`FinanceData`](crate::domain::FinanceData) snapshot.

pub mod correlation;
pub mod liquidity;
pub mod period;
pub mod reports;
pub mod sankey;

pub use correlation::{CorrelationCell, CorrelationReport, CorrelationService, CorrelationStrength};
pub use liquidity::LiquiditySnapshot;
pub use period::AnalysisPeriod;
pub use reports::{
    category_totals, top_categories, CategoryTotal, Dashboard, MonthlyComparison, ProjectAnalysis,
    ProjectForecast, ProjectPnl, Wallet,
};
pub use sankey::{SankeyDiagram, SankeyLink, SankeyNode, SankeyService};
