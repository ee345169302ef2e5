use chrono::{NaiveDate, TimeZone, Utc};
use nexus_finance::{
    analytics::{Dashboard, ProjectAnalysis, SankeyService},
    core::services::{
        AccountService, AchievementService, LiquidityService, ProjectService, TeamService,
        TrackerService, TransactionService,
    },
    domain::{
        Account, AccountKind, FinanceData, Payable, PaymentFrequency, ProbabilityLevel, Project,
        ProjectExpense, ProjectMilestone, ProjectStatus, Receivable, TeamMember, Transaction,
        TransactionKind,
    },
};

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

/// Seeded data with one funded account and an active client project.
fn prepared_data() -> (FinanceData, uuid::Uuid) {
    let mut data = FinanceData::seeded();
    AccountService::add(
        &mut data,
        Account::new("Checking", AccountKind::Checking, 5000.0),
    )
    .unwrap();
    let project = Project::new("Website", 3000.0, day(3, 1)).with_client("Acme");
    let project_id = ProjectService::add(&mut data, project).unwrap();
    ProjectService::set_status(&mut data, project_id, ProjectStatus::InProgress, day(3, 1))
        .unwrap();
    (data, project_id)
}

#[test]
fn project_work_flows_into_transactions_and_profit() {
    let (mut data, project_id) = prepared_data();
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();

    let milestone_id = ProjectService::add_milestone(
        &mut data,
        project_id,
        ProjectMilestone::new("Design", 1000.0, None),
    )
    .unwrap();
    let award = ProjectService::complete_milestone(&mut data, project_id, milestone_id, now)
        .unwrap();
    assert_eq!(award.xp, 80);

    let award =
        ProjectService::receive_payment(&mut data, project_id, 500.0, Some("Deposit"), now)
            .unwrap();
    assert_eq!(award.xp, 5);
    ProjectService::add_expense(
        &mut data,
        project_id,
        ProjectExpense::new("Hosting", 200.0, "Infrastructure", day(3, 10)),
    )
    .unwrap();

    let project = data.project(project_id).unwrap();
    assert_eq!(project.received_amount, 1500.0);
    assert_eq!(data.level.total_xp, 85);

    let booked: Vec<&Transaction> = data
        .transactions
        .iter()
        .filter(|txn| txn.project.as_deref() == Some("Website"))
        .collect();
    assert_eq!(booked.len(), 2);
    let totals = TransactionService::totals(booked.iter().copied());
    assert_eq!(totals.income, 500.0);
    assert_eq!(totals.expense, 200.0);

    let analysis = ProjectAnalysis::build(&data.projects);
    let pnl = &analysis.projects[0];
    assert_eq!(pnl.revenue, 1500.0);
    assert_eq!(pnl.cost, 200.0);
    assert_eq!(pnl.profit, 1300.0);
    assert_eq!(pnl.margin, 86.7);

    let diagram = SankeyService::generate(&data.transactions, 600.0);
    assert_eq!(diagram.nodes.len(), 3);
    let amounts: Vec<f64> = diagram.links.iter().map(|link| link.amount).collect();
    assert_eq!(amounts, vec![500.0, 200.0]);
}

#[test]
fn completed_projects_refuse_payments() {
    let (mut data, project_id) = prepared_data();
    ProjectService::set_status(&mut data, project_id, ProjectStatus::Completed, day(3, 20))
        .unwrap();
    assert_eq!(data.project(project_id).unwrap().end_date, Some(day(3, 20)));
    assert!(ProjectService::receive_payment(&mut data, project_id, 100.0, None, Utc::now())
        .is_err());
    assert!(data.transactions.is_empty());
}

#[test]
fn liquidity_weighs_receivables_against_payables() {
    let (mut data, project_id) = prepared_data();
    LiquidityService::add_payable(&mut data, Payable::new("Rent", 800.0, day(3, 5))).unwrap();
    let mut invoice = Receivable::new("Invoice", 2000.0, day(3, 20), ProbabilityLevel::Likely);
    invoice.project_id = Some(project_id);
    LiquidityService::add_receivable(&mut data, invoice).unwrap();

    let snapshot = LiquidityService::snapshot(&data, day(3, 3));
    assert_eq!(snapshot.current_cash, 5000.0);
    assert_eq!(snapshot.total_payables, 800.0);
    assert_eq!(snapshot.total_receivables, 1500.0);
    assert_eq!(snapshot.projected_balance, 5700.0);
    assert_eq!(snapshot.critical_count, 1);
    assert_eq!(snapshot.overdue_count, 0);

    let overdue = LiquidityService::snapshot(&data, day(3, 6));
    assert_eq!(overdue.overdue_count, 1);
}

#[test]
fn payroll_follows_project_membership() {
    let (mut data, project_id) = prepared_data();
    TeamService::add(
        &mut data,
        TeamMember::new("Ann", "Designer", 3000.0, PaymentFrequency::Monthly, project_id, day(3, 1)),
    )
    .unwrap();
    TeamService::add(
        &mut data,
        TeamMember::new("Bo", "Developer", 20.0, PaymentFrequency::Hourly, project_id, day(3, 1)),
    )
    .unwrap();
    assert_eq!(TeamService::payroll(&data, Some(project_id)), 6200.0);

    ProjectService::remove(&mut data, project_id).unwrap();
    assert!(data.team_members.is_empty());
    assert_eq!(TeamService::payroll(&data, None), 0.0);
}

#[test]
fn daily_tasks_feed_levels_and_achievements() {
    let mut data = FinanceData::seeded();
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
    for index in 0..10 {
        let task = TrackerService::add_task(&mut data, day(3, 10), &format!("Task {index}"), 5)
            .unwrap();
        TrackerService::toggle_task(&mut data, day(3, 10), task.id, now).unwrap();
    }
    assert_eq!(data.level.total_xp, 1100);

    let unlocked = AchievementService::evaluate(&mut data, now);
    assert!(unlocked.contains(&"Getting Things Done".to_string()));
    assert!(AchievementService::evaluate(&mut data, now).is_empty());
}

#[test]
fn dashboard_reports_recent_window() {
    let (mut data, _) = prepared_data();
    for (amount, kind, category, date) in [
        (2000.0, TransactionKind::Income, "Salary", day(3, 1)),
        (500.0, TransactionKind::Expense, "Rent", day(3, 2)),
        (100.0, TransactionKind::Expense, "Food", day(3, 3)),
        (999.0, TransactionKind::Expense, "Food", day(1, 3)),
    ] {
        TransactionService::add(
            &mut data,
            Transaction::new("entry", amount, kind, category, date),
        )
        .unwrap();
    }

    let dashboard = Dashboard::build(&data, day(3, 15));
    assert_eq!(dashboard.income, 2000.0);
    assert_eq!(dashboard.expense, 600.0);
    assert_eq!(dashboard.savings_rate, 70.0);
    assert_eq!(dashboard.top_expenses[0].category, "Rent");
    assert_eq!(dashboard.net_worth, 5000.0);
}
