use uuid::Uuid;

use super::{ensure_unique, require_text, ServiceError, ServiceResult};
use crate::domain::{Account, FinanceData};

pub struct AccountService;

impl AccountService {
    pub fn add(data: &mut FinanceData, account: Account) -> ServiceResult<Uuid> {
        Self::validate_name(data, None, &account.name)?;
        Self::validate_balance(account.balance)?;
        let id = account.id;
        data.accounts.push(account);
        data.touch();
        Ok(id)
    }

    pub fn edit(data: &mut FinanceData, id: Uuid, changes: Account) -> ServiceResult<()> {
        Self::validate_name(data, Some(id), &changes.name)?;
        Self::validate_balance(changes.balance)?;
        let account = data
            .accounts
            .iter_mut()
            .find(|account| account.id == id)
            .ok_or_else(|| ServiceError::NotFound("Account".into()))?;
        account.name = changes.name;
        account.institution = changes.institution;
        account.balance = changes.balance;
        account.kind = changes.kind;
        data.touch();
        Ok(())
    }

    pub fn remove(data: &mut FinanceData, id: Uuid) -> ServiceResult<Account> {
        let index = data
            .accounts
            .iter()
            .position(|account| account.id == id)
            .ok_or_else(|| ServiceError::NotFound("Account".into()))?;
        let removed = data.accounts.remove(index);
        data.touch();
        Ok(removed)
    }

    fn validate_name(data: &FinanceData, exclude: Option<Uuid>, candidate: &str) -> ServiceResult<()> {
        require_text(candidate, "Account name")?;
        ensure_unique(
            data.accounts
                .iter()
                .filter(|account| exclude.map_or(true, |id| account.id != id))
                .map(|account| account.name.as_str()),
            candidate,
            "Account",
        )
    }

    // Negative balances are allowed for credit lines.
    fn validate_balance(balance: f64) -> ServiceResult<()> {
        if balance.is_finite() {
            Ok(())
        } else {
            Err(ServiceError::Invalid("Balance must be a number".into()))
        }
    }
}
