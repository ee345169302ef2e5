use chrono::NaiveDate;

use crate::domain::{FinanceData, Payable, Receivable, UrgencyLevel};

/// Cash position now versus what is owed and what is expected.
#[derive(Debug, Clone, PartialEq)]
pub struct LiquiditySnapshot {
    pub current_cash: f64,
    pub payables: Vec<Payable>,
    pub receivables: Vec<Receivable>,
    pub total_payables: f64,
    /// Probability-weighted.
    pub total_receivables: f64,
    pub projected_balance: f64,
    pub overdue_count: usize,
    pub critical_count: usize,
}

impl LiquiditySnapshot {
    pub fn build(data: &FinanceData, today: NaiveDate) -> Self {
        let mut payables: Vec<Payable> = data
            .payables
            .iter()
            .filter(|payable| !payable.is_paid)
            .cloned()
            .collect();
        payables.sort_by_key(|payable| payable.due_date);

        let mut receivables: Vec<Receivable> = data
            .receivables
            .iter()
            .filter(|receivable| !receivable.is_received)
            .cloned()
            .collect();
        receivables.sort_by_key(|receivable| receivable.expected_date);

        let current_cash = data.total_balance();
        let total_payables: f64 = payables.iter().map(|p| p.amount).sum();
        let total_receivables: f64 = receivables.iter().map(Receivable::weighted_amount).sum();

        let urgencies: Vec<UrgencyLevel> = payables.iter().map(|p| p.urgency(today)).collect();
        let overdue_count = urgencies
            .iter()
            .filter(|u| **u == UrgencyLevel::Overdue)
            .count();
        let critical_count = urgencies
            .iter()
            .filter(|u| matches!(u, UrgencyLevel::Critical | UrgencyLevel::High))
            .count();

        Self {
            current_cash,
            payables,
            receivables,
            total_payables,
            total_receivables,
            projected_balance: current_cash + total_receivables - total_payables,
            overdue_count,
            critical_count,
        }
    }
}
