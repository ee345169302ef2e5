use chrono::{Datelike, Months, NaiveDate};

use super::period::AnalysisPeriod;
use crate::domain::{round_to, CategoryKind, FinanceData, Project, Transaction, TransactionKind};

const RECENT_LIMIT: usize = 10;
const TOP_EXPENSES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Sums by category for one transaction kind, largest first, ties in first-seen order.
fn group_by_category<'a, I>(transactions: I, kind: TransactionKind) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for txn in transactions.into_iter().filter(|txn| txn.kind == kind) {
        match totals.iter_mut().find(|entry| entry.category == txn.category) {
            Some(entry) => entry.total += txn.amount,
            None => totals.push(CategoryTotal {
                category: txn.category.clone(),
                total: txn.amount,
            }),
        }
    }
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals
}

fn sum_kind<'a, I>(transactions: I, kind: TransactionKind) -> f64
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|txn| txn.kind == kind)
        .map(|txn| txn.amount)
        .sum()
}

fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub net_worth: f64,
    pub income: f64,
    pub expense: f64,
    pub savings_rate: f64,
    pub recent: Vec<Transaction>,
    pub top_expenses: Vec<CategoryTotal>,
}

impl Dashboard {
    pub fn build(data: &FinanceData, today: NaiveDate) -> Self {
        let window = AnalysisPeriod::Last30Days.filter(&data.transactions, today);
        let income = sum_kind(window.iter().copied(), TransactionKind::Income);
        let expense = sum_kind(window.iter().copied(), TransactionKind::Expense);
        let savings_rate = if income > 0.0 {
            round_to((income - expense) / income * 100.0, 1)
        } else {
            0.0
        };

        let mut recent: Vec<Transaction> = data.transactions.clone();
        recent.sort_by(|a, b| b.date.cmp(&a.date));
        recent.truncate(RECENT_LIMIT);

        let mut top_expenses = group_by_category(window.iter().copied(), TransactionKind::Expense);
        top_expenses.truncate(TOP_EXPENSES);

        Self {
            net_worth: data.net_worth(),
            income,
            expense,
            savings_rate,
            recent,
            top_expenses,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthTotals {
    pub income: f64,
    pub expense: f64,
}

impl MonthTotals {
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyComparison {
    pub current: MonthTotals,
    pub previous: MonthTotals,
    pub income_change: f64,
    pub expense_change: f64,
}

impl MonthlyComparison {
    pub fn build(transactions: &[Transaction], today: NaiveDate) -> Self {
        let last_month = today
            .checked_sub_months(Months::new(1))
            .unwrap_or(today);
        let totals = |year: i32, month: u32| {
            let txns = transactions
                .iter()
                .filter(move |txn| in_month(txn.date, year, month));
            MonthTotals {
                income: sum_kind(txns.clone(), TransactionKind::Income),
                expense: sum_kind(txns, TransactionKind::Expense),
            }
        };
        let current = totals(today.year(), today.month());
        let previous = totals(last_month.year(), last_month.month());
        Self {
            current,
            previous,
            income_change: percent_change(current.income, previous.income),
            expense_change: percent_change(current.expense, previous.expense),
        }
    }
}

/// Income outlook from projects that are still running.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProjectForecast {
    pub active_projects: usize,
    pub received: f64,
    pub outstanding: f64,
    pub expected_total: f64,
}

impl ProjectForecast {
    pub fn build(projects: &[Project]) -> Self {
        projects
            .iter()
            .filter(|project| project.is_active())
            .fold(Self::default(), |mut acc, project| {
                acc.active_projects += 1;
                acc.received += project.received_amount;
                acc.outstanding += project.expected_income - project.received_amount;
                acc.expected_total += project.expected_income;
                acc
            })
    }
}

/// Largest categories of `kind` in the month containing `today`.
pub fn top_categories(
    transactions: &[Transaction],
    kind: TransactionKind,
    today: NaiveDate,
    limit: usize,
) -> Vec<CategoryTotal> {
    let month = transactions
        .iter()
        .filter(|txn| in_month(txn.date, today.year(), today.month()));
    let mut totals = group_by_category(month, kind);
    totals.truncate(limit);
    totals
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPnl {
    pub name: String,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub margin: f64,
}

impl From<&Project> for ProjectPnl {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            revenue: project.revenue(),
            cost: project.total_expenses(),
            profit: project.profit(),
            margin: project.profit_margin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectAnalysis {
    pub total_projects: usize,
    pub completed: usize,
    pub total_profit: f64,
    pub average_profit: f64,
    pub projects: Vec<ProjectPnl>,
}

impl ProjectAnalysis {
    pub fn build(projects: &[Project]) -> Self {
        let pnl: Vec<ProjectPnl> = projects.iter().map(ProjectPnl::from).collect();
        let total_profit: f64 = pnl.iter().map(|p| p.profit).sum();
        let average_profit = if pnl.is_empty() {
            0.0
        } else {
            total_profit / pnl.len() as f64
        };
        Self {
            total_projects: projects.len(),
            completed: projects
                .iter()
                .filter(|project| project.status == crate::domain::ProjectStatus::Completed)
                .count(),
            total_profit,
            average_profit,
            projects: pnl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Wallet {
    pub total_balance: f64,
    pub total_invested: f64,
    pub total_current: f64,
    pub total_return: f64,
}

impl Wallet {
    pub fn build(data: &FinanceData) -> Self {
        let total_invested: f64 = data.investments.iter().map(|i| i.amount).sum();
        let total_current = data.total_investment_value();
        Self {
            total_balance: data.total_balance(),
            total_invested,
            total_current,
            total_return: total_current - total_invested,
        }
    }
}

/// Expense total per known expense category, skipping categories with no spending.
pub fn category_totals(data: &FinanceData) -> Vec<CategoryTotal> {
    data.categories_of(CategoryKind::Expense)
        .filter_map(|category| {
            let total: f64 = data
                .transactions
                .iter()
                .filter(|txn| {
                    txn.kind == TransactionKind::Expense
                        && txn.category.eq_ignore_ascii_case(&category.name)
                })
                .map(|txn| txn.amount)
                .sum();
            (total > 0.0).then(|| CategoryTotal {
                category: category.name.clone(),
                total,
            })
        })
        .collect()
}
