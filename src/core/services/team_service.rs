use std::cmp::Ordering;

use uuid::Uuid;

use super::{require_non_negative, require_text, ServiceError, ServiceResult};
use crate::domain::{FinanceData, TeamMember};

pub struct TeamService;

impl TeamService {
    pub fn add(data: &mut FinanceData, member: TeamMember) -> ServiceResult<Uuid> {
        Self::validate(data, &member)?;
        let id = member.id;
        data.team_members.push(member);
        data.touch();
        Ok(id)
    }

    pub fn edit(data: &mut FinanceData, id: Uuid, changes: TeamMember) -> ServiceResult<()> {
        Self::validate(data, &changes)?;
        let member = Self::get_mut(data, id)?;
        member.name = changes.name;
        member.role = changes.role;
        member.salary = changes.salary;
        member.frequency = changes.frequency;
        member.is_active = changes.is_active;
        member.project_id = changes.project_id;
        member.joined_date = changes.joined_date;
        data.touch();
        Ok(())
    }

    pub fn remove(data: &mut FinanceData, id: Uuid) -> ServiceResult<TeamMember> {
        let index = data
            .team_members
            .iter()
            .position(|member| member.id == id)
            .ok_or_else(|| ServiceError::NotFound("Team member".into()))?;
        let removed = data.team_members.remove(index);
        data.touch();
        Ok(removed)
    }

    /// Flips the active flag and returns the new value.
    pub fn toggle_active(data: &mut FinanceData, id: Uuid) -> ServiceResult<bool> {
        let member = Self::get_mut(data, id)?;
        member.is_active = !member.is_active;
        let active = member.is_active;
        data.touch();
        Ok(active)
    }

    /// Active members first, then alphabetical.
    pub fn members_for_project(data: &FinanceData, project_id: Uuid) -> Vec<&TeamMember> {
        let mut members: Vec<&TeamMember> = data
            .team_members
            .iter()
            .filter(|member| member.project_id == project_id)
            .collect();
        members.sort_by(|a, b| match (a.is_active, b.is_active) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        });
        members
    }

    /// Monthly cost of the active members; restricted to one project when given.
    pub fn payroll(data: &FinanceData, project_id: Option<Uuid>) -> f64 {
        data.team_members
            .iter()
            .filter(|member| member.is_active)
            .filter(|member| project_id.map_or(true, |id| member.project_id == id))
            .map(TeamMember::monthly_cost)
            .sum()
    }

    fn get_mut(data: &mut FinanceData, id: Uuid) -> ServiceResult<&mut TeamMember> {
        data.team_members
            .iter_mut()
            .find(|member| member.id == id)
            .ok_or_else(|| ServiceError::NotFound("Team member".into()))
    }

    fn validate(data: &FinanceData, member: &TeamMember) -> ServiceResult<()> {
        require_text(&member.name, "Name")?;
        require_non_negative(member.salary, "Salary")?;
        if data.project(member.project_id).is_none() {
            return Err(ServiceError::Invalid("Linked project does not exist".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PaymentFrequency, Project};
    use chrono::NaiveDate;

    fn setup() -> (FinanceData, Uuid, NaiveDate) {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut data = FinanceData::seeded();
        let project = Project::new("App", 0.0, date);
        let id = project.id;
        data.projects.push(project);
        (data, id, date)
    }

    #[test]
    fn add_requires_existing_project() {
        let (mut data, _, date) = setup();
        let orphan = TeamMember::new("Bo", "QA", 10.0, PaymentFrequency::Monthly, Uuid::new_v4(), date);
        assert!(TeamService::add(&mut data, orphan).is_err());
    }

    #[test]
    fn ordering_and_payroll() {
        let (mut data, project, date) = setup();
        let zed = TeamMember::new("Zed", "Dev", 3000.0, PaymentFrequency::Monthly, project, date);
        let amy = TeamMember::new("amy", "Dev", 20.0, PaymentFrequency::Hourly, project, date);
        let bob = TeamMember::new("Bob", "PM", 999.0, PaymentFrequency::OneTime, project, date);
        let bob_id = bob.id;
        for member in [zed, amy, bob] {
            TeamService::add(&mut data, member).expect("add");
        }
        assert!(!TeamService::toggle_active(&mut data, bob_id).expect("toggle"));

        let names: Vec<_> = TeamService::members_for_project(&data, project)
            .into_iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, ["amy", "Zed", "Bob"]);
        assert_eq!(TeamService::payroll(&data, Some(project)), 6200.0);
        assert_eq!(TeamService::payroll(&data, Some(Uuid::new_v4())), 0.0);
    }
}
