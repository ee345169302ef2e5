//! Client projects: lifecycle, milestones, expenses, and incoming payments.
//!
//! Expenses and payments are mirrored into the transaction list so that the
//! cash-flow reports see them.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use super::{
    ensure_unique, require_non_negative, require_positive, require_range, require_text,
    ProgressService, ServiceError, ServiceResult, XpAward,
};
use crate::domain::{
    FinanceData, LevelCalculator, Project, ProjectExpense, ProjectMilestone, ProjectStatus,
    Transaction,
};

pub const PROJECT_INCOME_CATEGORY: &str = "Projects";
const FALLBACK_EXPENSE_CATEGORY: &str = "Other";

pub struct ProjectService;

impl ProjectService {
    pub fn add(data: &mut FinanceData, project: Project) -> ServiceResult<Uuid> {
        Self::validate(data, None, &project)?;
        let id = project.id;
        info!(name = %project.name, "project added");
        data.projects.push(project);
        data.touch();
        Ok(id)
    }

    /// Replaces the descriptive fields. Status, money received, milestones and
    /// expenses have dedicated operations.
    pub fn edit(data: &mut FinanceData, id: Uuid, changes: Project) -> ServiceResult<()> {
        Self::validate(data, Some(id), &changes)?;
        let project = Self::get_mut(data, id)?;
        project.name = changes.name.trim().to_string();
        project.description = changes.description;
        project.client = changes.client;
        project.budget = changes.budget;
        project.expected_income = changes.expected_income;
        project.currency = changes.currency;
        project.priority = changes.priority;
        project.deadline = changes.deadline;
        project.notes = changes.notes;
        data.touch();
        Ok(())
    }

    /// Drops the project together with its team assignments; receivables are detached.
    pub fn remove(data: &mut FinanceData, id: Uuid) -> ServiceResult<Project> {
        let index = data
            .projects
            .iter()
            .position(|project| project.id == id)
            .ok_or_else(|| ServiceError::NotFound("Project".into()))?;
        let removed = data.projects.remove(index);
        data.team_members.retain(|member| member.project_id != id);
        for receivable in data
            .receivables
            .iter_mut()
            .filter(|receivable| receivable.project_id == Some(id))
        {
            receivable.project_id = None;
        }
        data.touch();
        info!(name = %removed.name, "project removed");
        Ok(removed)
    }

    pub fn set_status(
        data: &mut FinanceData,
        id: Uuid,
        status: ProjectStatus,
        today: NaiveDate,
    ) -> ServiceResult<()> {
        let project = Self::get_mut(data, id)?;
        project.status = status;
        if status == ProjectStatus::Completed {
            project.end_date = Some(today);
        }
        data.touch();
        Ok(())
    }

    pub fn set_priority(data: &mut FinanceData, id: Uuid, priority: u8) -> ServiceResult<()> {
        require_range(priority, 1, 5, "Priority")?;
        Self::get_mut(data, id)?.priority = priority;
        data.touch();
        Ok(())
    }

    pub fn set_notes(data: &mut FinanceData, id: Uuid, notes: &str) -> ServiceResult<()> {
        Self::get_mut(data, id)?.notes = notes.to_string();
        data.touch();
        Ok(())
    }

    pub fn add_milestone(
        data: &mut FinanceData,
        id: Uuid,
        mut milestone: ProjectMilestone,
    ) -> ServiceResult<Uuid> {
        require_text(&milestone.name, "Milestone name")?;
        require_non_negative(milestone.payment_amount, "Payment amount")?;
        let project = Self::get_mut(data, id)?;
        milestone.xp = LevelCalculator::xp_for_milestone(project.priority);
        let milestone_id = milestone.id;
        project.milestones.push(milestone);
        data.touch();
        Ok(milestone_id)
    }

    /// Marks the milestone done, credits its payment, and grants its XP.
    pub fn complete_milestone(
        data: &mut FinanceData,
        id: Uuid,
        milestone_id: Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<XpAward> {
        let project = Self::get_mut(data, id)?;
        if !project.is_active() {
            return Err(ServiceError::Invalid(format!(
                "Project `{}` is not active",
                project.name
            )));
        }
        let milestone = project
            .milestones
            .iter_mut()
            .find(|milestone| milestone.id == milestone_id)
            .ok_or_else(|| ServiceError::NotFound("Milestone".into()))?;
        if milestone.is_completed {
            return Err(ServiceError::Invalid(format!(
                "Milestone `{}` is already completed",
                milestone.name
            )));
        }
        milestone.is_completed = true;
        milestone.completed_date = Some(now.date_naive());
        let (xp, payment, label) = (milestone.xp, milestone.payment_amount, milestone.name.clone());
        project.received_amount += payment;

        let award = ProgressService::award(
            &mut data.level,
            xp,
            &format!("Project milestone: {label}"),
            now,
        );
        data.touch();
        Ok(award)
    }

    /// Records a project cost and books a matching expense transaction.
    pub fn add_expense(
        data: &mut FinanceData,
        id: Uuid,
        mut expense: ProjectExpense,
    ) -> ServiceResult<Uuid> {
        require_text(&expense.description, "Description")?;
        require_positive(expense.amount, "Amount")?;
        if expense.category.trim().is_empty() {
            expense.category = FALLBACK_EXPENSE_CATEGORY.to_string();
        }
        let project = Self::get_mut(data, id)?;
        let transaction = Transaction::expense(
            format!("[{}] {}", project.name, expense.description),
            expense.amount,
            expense.category.clone(),
            expense.date,
        )
        .with_project(project.name.clone())
        .with_currency(project.currency.clone());
        let expense_id = expense.id;
        project.expenses.push(expense);
        data.transactions.push(transaction);
        data.touch();
        Ok(expense_id)
    }

    /// Credits a payment to an active project, books it as income, and grants payment XP.
    pub fn receive_payment(
        data: &mut FinanceData,
        id: Uuid,
        amount: f64,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> ServiceResult<XpAward> {
        require_positive(amount, "Amount")?;
        let project = Self::get_mut(data, id)?;
        if !project.is_active() {
            return Err(ServiceError::Invalid(format!(
                "Project `{}` is not active",
                project.name
            )));
        }
        project.received_amount += amount;
        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Payment for project {}", project.name));
        let transaction = Transaction::income(
            format!("[{}] {}", project.name, description),
            amount,
            PROJECT_INCOME_CATEGORY,
            now.date_naive(),
        )
        .with_project(project.name.clone())
        .with_currency(project.currency.clone());
        let source = format!("Project payment: {}", project.name);
        data.transactions.push(transaction);

        let award = ProgressService::award(
            &mut data.level,
            LevelCalculator::xp_for_payment(amount),
            &source,
            now,
        );
        data.touch();
        Ok(award)
    }

    pub fn find_by_name(data: &FinanceData, name: &str) -> ServiceResult<Uuid> {
        data.project_by_name(name)
            .map(|project| project.id)
            .ok_or_else(|| ServiceError::NotFound(format!("Project `{}`", name.trim())))
    }

    fn get_mut(data: &mut FinanceData, id: Uuid) -> ServiceResult<&mut Project> {
        data.project_mut(id)
            .ok_or_else(|| ServiceError::NotFound("Project".into()))
    }

    fn validate(data: &FinanceData, exclude: Option<Uuid>, project: &Project) -> ServiceResult<()> {
        require_text(&project.name, "Project name")?;
        require_non_negative(project.budget, "Budget")?;
        require_non_negative(project.expected_income, "Expected income")?;
        require_range(project.priority, 1, 5, "Priority")?;
        ensure_unique(
            data.projects
                .iter()
                .filter(|existing| exclude.map_or(true, |id| existing.id != id))
                .map(|existing| existing.name.as_str()),
            &project.name,
            "Project",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PaymentFrequency, ProbabilityLevel, Receivable, TeamMember, TransactionKind};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn setup() -> (FinanceData, Uuid) {
        let mut data = FinanceData::seeded();
        let id = ProjectService::add(&mut data, Project::new("Website", 5000.0, date(1)))
            .expect("add");
        (data, id)
    }

    #[test]
    fn names_must_be_unique_and_priority_bounded() {
        let (mut data, id) = setup();
        assert!(ProjectService::add(&mut data, Project::new("website", 1.0, date(1))).is_err());
        assert!(ProjectService::set_priority(&mut data, id, 6).is_err());
        ProjectService::set_priority(&mut data, id, 5).expect("priority");
        assert_eq!(data.projects[0].priority, 5);
    }

    #[test]
    fn completing_stamps_end_date() {
        let (mut data, id) = setup();
        ProjectService::set_status(&mut data, id, ProjectStatus::Completed, date(20))
            .expect("status");
        assert_eq!(data.projects[0].end_date, Some(date(20)));
    }

    #[test]
    fn milestone_completion_pays_and_awards_xp() {
        let (mut data, id) = setup();
        ProjectService::set_priority(&mut data, id, 2).expect("priority");
        let milestone = ProjectService::add_milestone(
            &mut data,
            id,
            ProjectMilestone::new("Design", 1500.0, None),
        )
        .expect("milestone");
        assert_eq!(data.projects[0].milestones[0].xp, 70);

        let award = ProjectService::complete_milestone(&mut data, id, milestone, Utc::now())
            .expect("complete");
        assert_eq!(award.xp, 70);
        assert_eq!(data.projects[0].received_amount, 1500.0);
        assert_eq!(data.level.total_xp, 70);
        assert!(ProjectService::complete_milestone(&mut data, id, milestone, Utc::now()).is_err());
    }

    #[test]
    fn expense_books_tagged_transaction() {
        let (mut data, id) = setup();
        ProjectService::add_expense(
            &mut data,
            id,
            ProjectExpense::new("Hosting", 120.0, "", date(5)),
        )
        .expect("expense");
        let txn = &data.transactions[0];
        assert_eq!(txn.description, "[Website] Hosting");
        assert_eq!(txn.category, "Other");
        assert_eq!(txn.kind, TransactionKind::Expense);
        assert_eq!(data.projects[0].total_expenses(), 120.0);
    }

    #[test]
    fn payment_requires_active_project() {
        let (mut data, id) = setup();
        let award = ProjectService::receive_payment(&mut data, id, 2599.0, None, Utc::now())
            .expect("payment");
        assert_eq!(award.xp, 25);
        assert_eq!(data.projects[0].received_amount, 2599.0);
        let txn = &data.transactions[0];
        assert_eq!(txn.category, PROJECT_INCOME_CATEGORY);
        assert_eq!(txn.description, "[Website] Payment for project Website");

        ProjectService::set_status(&mut data, id, ProjectStatus::OnHold, date(2)).expect("hold");
        assert!(ProjectService::receive_payment(&mut data, id, 10.0, None, Utc::now()).is_err());
    }

    #[test]
    fn remove_cascades_to_team_and_receivables() {
        let (mut data, id) = setup();
        data.team_members.push(TeamMember::new(
            "Ana",
            "Dev",
            100.0,
            PaymentFrequency::Monthly,
            id,
            date(1),
        ));
        let mut receivable = Receivable::new("Invoice", 10.0, date(9), ProbabilityLevel::Likely);
        receivable.project_id = Some(id);
        data.receivables.push(receivable);

        ProjectService::remove(&mut data, id).expect("remove");
        assert!(data.team_members.is_empty());
        assert_eq!(data.receivables[0].project_id, None);
    }
}
