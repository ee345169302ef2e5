use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    Account, Achievement, Budget, Category, CategoryKind, DailyEntry, Investment, LevelState,
    Payable, Project, Receivable, RecurringTransaction, TeamMember, Transaction,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The whole persisted document: every collection the app tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceData {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub investments: Vec<Investment>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub payables: Vec<Payable>,
    #[serde(default)]
    pub receivables: Vec<Receivable>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub daily_entries: Vec<DailyEntry>,
    #[serde(default)]
    pub habits: Vec<String>,
    #[serde(default)]
    pub level: LevelState,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub recurring: Vec<RecurringTransaction>,
    #[serde(default = "default_schema_version")]
    pub schema_version: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_schema_version() -> u8 {
    CURRENT_SCHEMA_VERSION
}

impl Default for FinanceData {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            transactions: Vec::new(),
            accounts: Vec::new(),
            categories: Vec::new(),
            investments: Vec::new(),
            projects: Vec::new(),
            payables: Vec::new(),
            receivables: Vec::new(),
            team_members: Vec::new(),
            daily_entries: Vec::new(),
            habits: Vec::new(),
            level: LevelState::default(),
            achievements: Vec::new(),
            budgets: Vec::new(),
            recurring: Vec::new(),
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: now,
            updated_at: now,
        }
    }
}

impl FinanceData {
    /// Fresh document with the default categories and achievement catalogue.
    pub fn seeded() -> Self {
        Self::empty_with_categories(Category::defaults())
    }

    pub fn empty_with_categories(categories: Vec<Category>) -> Self {
        Self {
            categories,
            achievements: Achievement::defaults(),
            ..Self::default()
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        let name = name.trim();
        self.categories
            .iter()
            .find(|category| category.name.eq_ignore_ascii_case(name))
    }

    pub fn categories_of(&self, kind: CategoryKind) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(move |category| category.kind == kind)
    }

    pub fn project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn project_mut(&mut self, id: Uuid) -> Option<&mut Project> {
        self.projects.iter_mut().find(|project| project.id == id)
    }

    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        let name = name.trim();
        self.projects
            .iter()
            .find(|project| project.name.eq_ignore_ascii_case(name))
    }

    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        let name = name.trim();
        self.accounts
            .iter()
            .find(|account| account.name.eq_ignore_ascii_case(name))
    }

    pub fn investment_by_name(&self, name: &str) -> Option<&Investment> {
        let name = name.trim();
        self.investments
            .iter()
            .find(|investment| investment.name.eq_ignore_ascii_case(name))
    }

    pub fn total_balance(&self) -> f64 {
        self.accounts.iter().map(|account| account.balance).sum()
    }

    pub fn total_investment_value(&self) -> f64 {
        self.investments
            .iter()
            .map(|investment| investment.current_value)
            .sum()
    }

    pub fn net_worth(&self) -> f64 {
        self.total_balance() + self.total_investment_value()
    }
}
