//! Conversation wrapper around an external financial advisor.
//!
//! The session never talks to the network itself. A backend implementing
//! [`AdvisorBackend`] answers questions given a compact [`FinancialContext`].

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{round_to, FinanceData, TransactionKind};
use crate::errors::FinanceError;

pub const ADVISOR_NAME: &str = "Neural CFO";
pub const CONTEXT_WINDOW_DAYS: i64 = 30;

pub const SAMPLE_QUESTIONS: [&str; 4] = [
    "Where am I overspending?",
    "Can I afford to hire another contractor?",
    "How long will my cash last?",
    "Which project should I prioritize?",
];

/// Figures the advisor receives alongside each question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialContext {
    pub net_worth: f64,
    pub monthly_income: f64,
    pub monthly_expense: f64,
}

impl FinancialContext {
    /// Net worth plus income and expense over the trailing thirty days.
    pub fn from_data(data: &FinanceData, today: NaiveDate) -> Self {
        let since = today - Duration::days(CONTEXT_WINDOW_DAYS);
        let (income, expense) = data
            .transactions
            .iter()
            .filter(|txn| txn.date >= since && txn.date <= today)
            .fold((0.0, 0.0), |(income, expense), txn| match txn.kind {
                TransactionKind::Income => (income + txn.amount, expense),
                TransactionKind::Expense => (income, expense + txn.amount),
            });
        Self {
            net_worth: round_to(data.net_worth(), 2),
            monthly_income: round_to(income, 2),
            monthly_expense: round_to(expense, 2),
        }
    }

    pub fn monthly_balance(&self) -> f64 {
        round_to(self.monthly_income - self.monthly_expense, 2)
    }

    pub fn savings_rate(&self) -> f64 {
        if self.monthly_income <= 0.0 {
            return 0.0;
        }
        round_to(self.monthly_balance() / self.monthly_income * 100.0, 1)
    }

    pub fn render_prompt(&self) -> String {
        format!(
            "Financial snapshot:\n\
             - Net worth: {:.2}\n\
             - Monthly income: {:.2}\n\
             - Monthly expenses: {:.2}\n\
             - Monthly balance: {:.2}\n\
             - Savings rate: {:.1}%",
            self.net_worth,
            self.monthly_income,
            self.monthly_expense,
            self.monthly_balance(),
            self.savings_rate()
        )
    }
}

pub trait AdvisorBackend {
    fn is_configured(&self) -> bool;
    fn analyze(&self, context: &FinancialContext, question: &str) -> Result<String, FinanceError>;
}

/// Backend used when no advisor credentials are available.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredAdvisor;

impl AdvisorBackend for UnconfiguredAdvisor {
    fn is_configured(&self) -> bool {
        false
    }

    fn analyze(&self, _context: &FinancialContext, _question: &str) -> Result<String, FinanceError> {
        Err(FinanceError::Config(
            "advisor backend is not configured".into(),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Advisor,
    System,
    Error,
}

impl Sender {
    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Advisor => ADVISOR_NAME,
            Sender::System => "System",
            Sender::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// What happened to a question handed to [`ChatSession::ask`].
#[derive(Debug, Clone, PartialEq)]
pub enum AskOutcome {
    Ignored,
    NotConfigured,
    Answered(String),
    Failed(String),
}

pub struct ChatSession<B: AdvisorBackend> {
    backend: B,
    history: Vec<ChatMessage>,
}

impl<B: AdvisorBackend> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        let greeting = if backend.is_configured() {
            ChatMessage::new(
                Sender::Advisor,
                "Ask me to analyze your finances, identify risks, or suggest optimizations.",
            )
        } else {
            ChatMessage::new(
                Sender::System,
                "The advisor is not configured. Add credentials for an advisor backend first.",
            )
        };
        Self {
            backend,
            history: vec![greeting],
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn ask(&mut self, question: &str, context: &FinancialContext) -> AskOutcome {
        let question = question.trim();
        if question.is_empty() {
            return AskOutcome::Ignored;
        }
        if !self.backend.is_configured() {
            self.history.push(ChatMessage::new(
                Sender::Error,
                "Configure an advisor backend before asking questions.",
            ));
            return AskOutcome::NotConfigured;
        }

        self.history.push(ChatMessage::new(Sender::User, question));
        info!(question_len = question.len(), "advisor question submitted");
        match self.backend.analyze(context, question) {
            Ok(answer) => {
                self.history
                    .push(ChatMessage::new(Sender::Advisor, answer.clone()));
                AskOutcome::Answered(answer)
            }
            Err(err) => {
                warn!(error = %err, "advisor analysis failed");
                let message = format!("Analysis failed: {err}");
                self.history
                    .push(ChatMessage::new(Sender::Error, message.clone()));
                AskOutcome::Failed(message)
            }
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.history.push(ChatMessage::new(
            Sender::Advisor,
            "Chat cleared. What would you like to know?",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, AccountKind, Transaction};

    struct EchoAdvisor;

    impl AdvisorBackend for EchoAdvisor {
        fn is_configured(&self) -> bool {
            true
        }

        fn analyze(
            &self,
            context: &FinancialContext,
            question: &str,
        ) -> Result<String, FinanceError> {
            Ok(format!("{question} / net {:.0}", context.net_worth))
        }
    }

    struct BrokenAdvisor;

    impl AdvisorBackend for BrokenAdvisor {
        fn is_configured(&self) -> bool {
            true
        }

        fn analyze(&self, _: &FinancialContext, _: &str) -> Result<String, FinanceError> {
            Err(FinanceError::Storage("timeout".into()))
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn context() -> FinancialContext {
        FinancialContext {
            net_worth: 1000.0,
            monthly_income: 400.0,
            monthly_expense: 100.0,
        }
    }

    #[test]
    fn context_uses_thirty_day_window() {
        let today = date(2024, 6, 30);
        let mut data = FinanceData::seeded();
        data.accounts
            .push(Account::new("Main", AccountKind::Checking, 500.0));
        data.transactions
            .push(Transaction::income("Salary", 300.0, "Salary", date(2024, 6, 15)));
        data.transactions
            .push(Transaction::expense("Food", 50.0, "Food", date(2024, 6, 20)));
        data.transactions
            .push(Transaction::expense("Old", 999.0, "Food", date(2024, 4, 1)));

        let ctx = FinancialContext::from_data(&data, today);
        assert_eq!(ctx.net_worth, 500.0);
        assert_eq!(ctx.monthly_income, 300.0);
        assert_eq!(ctx.monthly_expense, 50.0);
        assert_eq!(ctx.monthly_balance(), 250.0);
    }

    #[test]
    fn prompt_lists_all_figures() {
        let prompt = context().render_prompt();
        assert!(prompt.contains("Net worth: 1000.00"));
        assert!(prompt.contains("Monthly expenses: 100.00"));
        assert!(prompt.contains("Savings rate: 75.0%"));
    }

    #[test]
    fn blank_questions_are_ignored() {
        let mut session = ChatSession::new(EchoAdvisor);
        assert_eq!(session.ask("   ", &context()), AskOutcome::Ignored);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn unconfigured_backend_adds_notice() {
        let mut session = ChatSession::new(UnconfiguredAdvisor);
        assert_eq!(session.history()[0].sender, Sender::System);
        let outcome = session.ask("How am I doing?", &context());
        assert_eq!(outcome, AskOutcome::NotConfigured);
        assert_eq!(session.history().last().expect("notice").sender, Sender::Error);
        assert!(!session.history().iter().any(ChatMessage::is_user));
    }

    #[test]
    fn answers_are_recorded() {
        let mut session = ChatSession::new(EchoAdvisor);
        let outcome = session.ask("Status?", &context());
        assert_eq!(outcome, AskOutcome::Answered("Status? / net 1000".into()));
        let history = session.history();
        assert_eq!(history.len(), 3);
        assert!(history[1].is_user());
        assert_eq!(history[2].sender, Sender::Advisor);
    }

    #[test]
    fn backend_errors_become_error_messages() {
        let mut session = ChatSession::new(BrokenAdvisor);
        let outcome = session.ask("Status?", &context());
        match outcome {
            AskOutcome::Failed(message) => assert!(message.contains("timeout")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(session.history().last().expect("error").sender, Sender::Error);
    }

    #[test]
    fn clear_resets_history() {
        let mut session = ChatSession::new(EchoAdvisor);
        session.ask("Status?", &context());
        session.clear();
        assert_eq!(session.history().len(), 1);
        assert!(session.history()[0].text.contains("Chat cleared"));
    }
}
