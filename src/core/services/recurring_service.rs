use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use super::{require_positive, require_text, ServiceError, ServiceResult};
use crate::domain::{FinanceData, RecurringTransaction, Transaction};

pub struct RecurringService;

impl RecurringService {
    pub fn add(data: &mut FinanceData, series: RecurringTransaction) -> ServiceResult<Uuid> {
        require_text(&series.description, "Description")?;
        require_text(&series.category, "Category")?;
        require_positive(series.amount, "Amount")?;
        if let Some(day) = series.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(ServiceError::Invalid("Day of month must be between 1 and 31".into()));
            }
        }
        if series.end_date.map_or(false, |end| end < series.start_date) {
            return Err(ServiceError::Invalid("End date is before start date".into()));
        }
        let id = series.id;
        data.recurring.push(series);
        data.touch();
        Ok(id)
    }

    pub fn remove(data: &mut FinanceData, id: Uuid) -> ServiceResult<RecurringTransaction> {
        let index = data
            .recurring
            .iter()
            .position(|series| series.id == id)
            .ok_or_else(|| ServiceError::NotFound("Recurring transaction".into()))?;
        let removed = data.recurring.remove(index);
        data.touch();
        Ok(removed)
    }

    pub fn set_active(data: &mut FinanceData, id: Uuid, active: bool) -> ServiceResult<()> {
        let series = data
            .recurring
            .iter_mut()
            .find(|series| series.id == id)
            .ok_or_else(|| ServiceError::NotFound("Recurring transaction".into()))?;
        series.is_active = active;
        data.touch();
        Ok(())
    }

    /// Books every occurrence that fell due since the last run, up to `today`.
    pub fn apply_due(data: &mut FinanceData, today: NaiveDate) -> Vec<Transaction> {
        let mut booked = Vec::new();
        for series in data.recurring.iter_mut() {
            let due = series.due_dates(today);
            if let Some(last) = due.last() {
                series.last_generated = Some(*last);
            }
            booked.extend(due.into_iter().map(|date| series.materialize(date)));
        }
        if !booked.is_empty() {
            info!(count = booked.len(), "recurring transactions booked");
            data.transactions.extend(booked.iter().cloned());
            data.touch();
        }
        booked
    }
}
