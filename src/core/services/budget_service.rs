use chrono::NaiveDate;
use uuid::Uuid;

use super::{require_positive, ServiceError, ServiceResult};
use crate::currency;
use crate::domain::{Budget, CategoryKind, FinanceData, TransactionKind};

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    pub budget: Budget,
    pub spent: f64,
    pub percent: f64,
    pub remaining: f64,
    pub over_budget: bool,
}

pub struct BudgetService;

impl BudgetService {
    pub fn add(
        data: &mut FinanceData,
        category: &str,
        amount: f64,
        currency: &str,
        start: NaiveDate,
    ) -> ServiceResult<Uuid> {
        require_positive(amount, "Budget amount")?;
        let category = data
            .category(category)
            .filter(|category| category.kind == CategoryKind::Expense)
            .map(|category| category.name.clone())
            .ok_or_else(|| {
                ServiceError::Invalid(format!("`{}` is not an expense category", category.trim()))
            })?;
        let code = currency.trim().to_uppercase();
        if !currency::is_supported(&code) {
            return Err(ServiceError::Invalid(format!("Unsupported currency `{code}`")));
        }
        let mut budget = Budget::new(category, amount, start);
        budget.currency = code;
        let id = budget.id;
        data.budgets.push(budget);
        data.touch();
        Ok(id)
    }

    pub fn remove(data: &mut FinanceData, id: Uuid) -> ServiceResult<Budget> {
        let index = data
            .budgets
            .iter()
            .position(|budget| budget.id == id)
            .ok_or_else(|| ServiceError::NotFound("Budget".into()))?;
        let removed = data.budgets.remove(index);
        data.touch();
        Ok(removed)
    }

    /// Spending counts expense transactions in the budget's category dated inside its window.
    pub fn progress(data: &FinanceData) -> Vec<BudgetProgress> {
        data.budgets
            .iter()
            .map(|budget| {
                let spent: f64 = data
                    .transactions
                    .iter()
                    .filter(|txn| {
                        txn.kind == TransactionKind::Expense
                            && txn.category.eq_ignore_ascii_case(&budget.category)
                            && budget.contains(txn.date)
                    })
                    .map(|txn| txn.amount)
                    .sum();
                let percent = if budget.amount > 0.0 {
                    spent / budget.amount * 100.0
                } else {
                    0.0
                };
                BudgetProgress {
                    budget: budget.clone(),
                    spent,
                    percent,
                    remaining: budget.amount - spent,
                    over_budget: spent > budget.amount,
                }
            })
            .collect()
    }
}
