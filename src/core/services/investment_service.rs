use uuid::Uuid;

use super::{ensure_unique, require_non_negative, require_text, ServiceError, ServiceResult};
use crate::domain::{FinanceData, Investment};

pub struct InvestmentService;

impl InvestmentService {
    pub fn add(data: &mut FinanceData, investment: Investment) -> ServiceResult<Uuid> {
        Self::validate(data, None, &investment)?;
        let id = investment.id;
        data.investments.push(investment);
        data.touch();
        Ok(id)
    }

    pub fn edit(data: &mut FinanceData, id: Uuid, changes: Investment) -> ServiceResult<()> {
        Self::validate(data, Some(id), &changes)?;
        let investment = data
            .investments
            .iter_mut()
            .find(|investment| investment.id == id)
            .ok_or_else(|| ServiceError::NotFound("Investment".into()))?;
        investment.name = changes.name;
        investment.kind = changes.kind;
        investment.amount = changes.amount;
        investment.current_value = changes.current_value;
        investment.purchase_date = changes.purchase_date;
        data.touch();
        Ok(())
    }

    /// Records a new market value for an existing position.
    pub fn revalue(data: &mut FinanceData, id: Uuid, current_value: f64) -> ServiceResult<()> {
        require_non_negative(current_value, "Current value")?;
        let investment = data
            .investments
            .iter_mut()
            .find(|investment| investment.id == id)
            .ok_or_else(|| ServiceError::NotFound("Investment".into()))?;
        investment.current_value = current_value;
        data.touch();
        Ok(())
    }

    pub fn remove(data: &mut FinanceData, id: Uuid) -> ServiceResult<Investment> {
        let index = data
            .investments
            .iter()
            .position(|investment| investment.id == id)
            .ok_or_else(|| ServiceError::NotFound("Investment".into()))?;
        let removed = data.investments.remove(index);
        data.touch();
        Ok(removed)
    }

    fn validate(data: &FinanceData, exclude: Option<Uuid>, investment: &Investment) -> ServiceResult<()> {
        require_text(&investment.name, "Investment name")?;
        require_non_negative(investment.amount, "Amount")?;
        require_non_negative(investment.current_value, "Current value")?;
        ensure_unique(
            data.investments
                .iter()
                .filter(|existing| exclude.map_or(true, |id| existing.id != id))
                .map(|existing| existing.name.as_str()),
            &investment.name,
            "Investment",
        )
    }
}
