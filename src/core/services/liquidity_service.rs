use chrono::NaiveDate;
use uuid::Uuid;

use super::{require_non_negative, require_text, ServiceError, ServiceResult};
use crate::analytics::LiquiditySnapshot;
use crate::domain::{FinanceData, Payable, Receivable};

pub struct LiquidityService;

impl LiquidityService {
    pub fn add_payable(data: &mut FinanceData, payable: Payable) -> ServiceResult<Uuid> {
        require_text(&payable.title, "Title")?;
        require_non_negative(payable.amount, "Amount")?;
        let id = payable.id;
        data.payables.push(payable);
        data.touch();
        Ok(id)
    }

    pub fn edit_payable(data: &mut FinanceData, id: Uuid, changes: Payable) -> ServiceResult<()> {
        require_text(&changes.title, "Title")?;
        require_non_negative(changes.amount, "Amount")?;
        let payable = data
            .payables
            .iter_mut()
            .find(|payable| payable.id == id)
            .ok_or_else(|| ServiceError::NotFound("Payable".into()))?;
        payable.title = changes.title;
        payable.amount = changes.amount;
        payable.creditor = changes.creditor;
        payable.due_date = changes.due_date;
        payable.is_paid = changes.is_paid;
        data.touch();
        Ok(())
    }

    pub fn remove_payable(data: &mut FinanceData, id: Uuid) -> ServiceResult<Payable> {
        let index = data
            .payables
            .iter()
            .position(|payable| payable.id == id)
            .ok_or_else(|| ServiceError::NotFound("Payable".into()))?;
        let removed = data.payables.remove(index);
        data.touch();
        Ok(removed)
    }

    pub fn mark_paid(data: &mut FinanceData, id: Uuid, paid: bool) -> ServiceResult<()> {
        let payable = data
            .payables
            .iter_mut()
            .find(|payable| payable.id == id)
            .ok_or_else(|| ServiceError::NotFound("Payable".into()))?;
        payable.is_paid = paid;
        data.touch();
        Ok(())
    }

    pub fn add_receivable(data: &mut FinanceData, receivable: Receivable) -> ServiceResult<Uuid> {
        Self::validate_receivable(data, &receivable)?;
        let id = receivable.id;
        data.receivables.push(receivable);
        data.touch();
        Ok(id)
    }

    pub fn edit_receivable(
        data: &mut FinanceData,
        id: Uuid,
        changes: Receivable,
    ) -> ServiceResult<()> {
        Self::validate_receivable(data, &changes)?;
        let receivable = data
            .receivables
            .iter_mut()
            .find(|receivable| receivable.id == id)
            .ok_or_else(|| ServiceError::NotFound("Receivable".into()))?;
        receivable.title = changes.title;
        receivable.amount = changes.amount;
        receivable.debtor = changes.debtor;
        receivable.project_id = changes.project_id;
        receivable.expected_date = changes.expected_date;
        receivable.probability = changes.probability;
        receivable.is_received = changes.is_received;
        data.touch();
        Ok(())
    }

    pub fn remove_receivable(data: &mut FinanceData, id: Uuid) -> ServiceResult<Receivable> {
        let index = data
            .receivables
            .iter()
            .position(|receivable| receivable.id == id)
            .ok_or_else(|| ServiceError::NotFound("Receivable".into()))?;
        let removed = data.receivables.remove(index);
        data.touch();
        Ok(removed)
    }

    pub fn mark_received(data: &mut FinanceData, id: Uuid, received: bool) -> ServiceResult<()> {
        let receivable = data
            .receivables
            .iter_mut()
            .find(|receivable| receivable.id == id)
            .ok_or_else(|| ServiceError::NotFound("Receivable".into()))?;
        receivable.is_received = received;
        data.touch();
        Ok(())
    }

    pub fn snapshot(data: &FinanceData, today: NaiveDate) -> LiquiditySnapshot {
        LiquiditySnapshot::build(data, today)
    }

    fn validate_receivable(data: &FinanceData, receivable: &Receivable) -> ServiceResult<()> {
        require_text(&receivable.title, "Title")?;
        require_non_negative(receivable.amount, "Amount")?;
        if let Some(project_id) = receivable.project_id {
            if data.project(project_id).is_none() {
                return Err(ServiceError::Invalid("Linked project does not exist".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProbabilityLevel;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    #[test]
    fn payable_lifecycle() {
        let mut data = FinanceData::seeded();
        assert!(LiquidityService::add_payable(&mut data, Payable::new(" ", 1.0, day(1))).is_err());
        assert!(LiquidityService::add_payable(&mut data, Payable::new("Tax", -1.0, day(1))).is_err());
        let id = LiquidityService::add_payable(&mut data, Payable::new("Tax", 300.0, day(5)))
            .expect("add");
        assert_eq!(LiquidityService::snapshot(&data, day(1)).total_payables, 300.0);
        LiquidityService::mark_paid(&mut data, id, true).expect("paid");
        assert!(LiquidityService::snapshot(&data, day(1)).payables.is_empty());
        LiquidityService::remove_payable(&mut data, id).expect("remove");
        assert!(data.payables.is_empty());
    }

    #[test]
    fn receivable_must_link_existing_project() {
        let mut data = FinanceData::seeded();
        let mut receivable = Receivable::new("Invoice", 100.0, day(9), ProbabilityLevel::Confirmed);
        receivable.project_id = Some(Uuid::new_v4());
        assert!(LiquidityService::add_receivable(&mut data, receivable.clone()).is_err());
        receivable.project_id = None;
        let id = LiquidityService::add_receivable(&mut data, receivable).expect("add");
        LiquidityService::mark_received(&mut data, id, true).expect("received");
        assert!(data.receivables[0].is_received);
    }
}
