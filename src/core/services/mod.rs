pub mod account_service;
pub mod achievement_service;
pub mod budget_service;
pub mod category_service;
pub mod data_service;
pub mod export_service;
pub mod investment_service;
pub mod liquidity_service;
pub mod progress_service;
pub mod project_service;
pub mod recurring_service;
pub mod team_service;
pub mod tracker_service;
pub mod transaction_service;

pub use account_service::AccountService;
pub use achievement_service::AchievementService;
pub use budget_service::{BudgetProgress, BudgetService};
pub use category_service::CategoryService;
pub use data_service::DataService;
pub use export_service::ExportService;
pub use investment_service::InvestmentService;
pub use liquidity_service::LiquidityService;
pub use progress_service::{ProgressService, XpAward};
pub use project_service::ProjectService;
pub use recurring_service::RecurringService;
pub use team_service::TeamService;
pub use tracker_service::TrackerService;
pub use transaction_service::{TransactionService, TransactionTotals};

use crate::errors::FinanceError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] FinanceError),
    #[error("{0}")]
    Invalid(String),
    #[error("{0} not found")]
    NotFound(String),
}

pub(crate) fn require_text(value: &str, field: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        Err(ServiceError::Invalid(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

pub(crate) fn require_positive(amount: f64, field: &str) -> ServiceResult<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(ServiceError::Invalid(format!("{field} must be greater than zero")))
    }
}

pub(crate) fn require_non_negative(amount: f64, field: &str) -> ServiceResult<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(ServiceError::Invalid(format!("{field} must not be negative")))
    }
}

pub(crate) fn require_range(value: u8, min: u8, max: u8, field: &str) -> ServiceResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ServiceError::Invalid(format!(
            "{field} must be between {min} and {max}"
        )))
    }
}

/// Case-insensitive name clash check, optionally ignoring one record.
pub(crate) fn ensure_unique<'a, I>(
    names: I,
    candidate: &str,
    what: &str,
) -> ServiceResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized = candidate.trim().to_lowercase();
    if names
        .into_iter()
        .any(|name| name.trim().to_lowercase() == normalized)
    {
        Err(ServiceError::Invalid(format!(
            "{what} `{}` already exists",
            candidate.trim()
        )))
    } else {
        Ok(())
    }
}
