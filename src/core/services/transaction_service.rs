//! Validated bookkeeping for income and expense records.

use uuid::Uuid;

use super::{require_positive, require_text, ServiceError, ServiceResult};
use crate::currency;
use crate::domain::{FinanceData, Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransactionTotals {
    pub income: f64,
    pub expense: f64,
}

impl TransactionTotals {
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

pub struct TransactionService;

impl TransactionService {
    /// Adds a new transaction and returns its identifier.
    pub fn add(data: &mut FinanceData, transaction: Transaction) -> ServiceResult<Uuid> {
        require_text(&transaction.description, "Description")?;
        require_text(&transaction.category, "Category")?;
        require_positive(transaction.amount, "Amount")?;
        if !currency::is_supported(&transaction.currency) {
            return Err(ServiceError::Invalid(format!(
                "Unsupported currency `{}`",
                transaction.currency
            )));
        }
        let id = transaction.id;
        data.transactions.push(transaction);
        data.touch();
        Ok(id)
    }

    /// Removes the transaction identified by `id`, returning the removed instance.
    pub fn remove(data: &mut FinanceData, id: Uuid) -> ServiceResult<Transaction> {
        let index = data
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or_else(|| ServiceError::NotFound("Transaction".into()))?;
        let removed = data.transactions.remove(index);
        data.touch();
        Ok(removed)
    }

    pub fn search<'a>(data: &'a FinanceData, needle: &str) -> Vec<&'a Transaction> {
        data.transactions
            .iter()
            .filter(|txn| txn.matches(needle))
            .collect()
    }

    /// Newest first.
    pub fn recent(data: &FinanceData, limit: usize) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = data.transactions.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted.truncate(limit);
        sorted
    }

    pub fn totals<'a, I>(transactions: I) -> TransactionTotals
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .fold(TransactionTotals::default(), |mut acc, txn| {
                match txn.kind {
                    TransactionKind::Income => acc.income += txn.amount,
                    TransactionKind::Expense => acc.expense += txn.amount,
                }
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn add_validates_input() {
        let mut data = FinanceData::seeded();
        let blank = Transaction::expense(" ", 5.0, "Food", date(1));
        assert!(matches!(
            TransactionService::add(&mut data, blank),
            Err(ServiceError::Invalid(_))
        ));
        let zero = Transaction::expense("Lunch", 0.0, "Food", date(1));
        assert!(TransactionService::add(&mut data, zero).is_err());
        let odd = Transaction::expense("Lunch", 5.0, "Food", date(1)).with_currency("XYZ");
        assert!(TransactionService::add(&mut data, odd).is_err());
        assert!(data.transactions.is_empty());
    }

    #[test]
    fn remove_returns_deleted_transaction() {
        let mut data = FinanceData::seeded();
        let id = TransactionService::add(
            &mut data,
            Transaction::income("Pay", 100.0, "Salary", date(1)),
        )
        .expect("add");
        let removed = TransactionService::remove(&mut data, id).expect("remove");
        assert_eq!(removed.description, "Pay");
        let err = TransactionService::remove(&mut data, id).expect_err("gone");
        assert!(matches!(err, ServiceError::NotFound(_)), "unexpected error: {err:?}");
    }

    #[test]
    fn recent_search_and_totals() {
        let mut data = FinanceData::seeded();
        for txn in [
            Transaction::income("Pay", 100.0, "Salary", date(3)),
            Transaction::expense("Coffee beans", 20.0, "Food", date(5)),
            Transaction::expense("Taxi", 30.0, "Transport", date(4)),
        ] {
            TransactionService::add(&mut data, txn).expect("add");
        }
        let recent = TransactionService::recent(&data, 2);
        assert_eq!(recent[0].description, "Coffee beans");
        assert_eq!(recent[1].description, "Taxi");
        assert_eq!(TransactionService::search(&data, "COFFEE").len(), 1);
        assert_eq!(TransactionService::search(&data, "transport").len(), 1);

        let totals = TransactionService::totals(&data.transactions);
        assert_eq!(totals.income, 100.0);
        assert_eq!(totals.balance(), 50.0);
    }
}
