//! Business rules: validated mutations over [`FinanceData`](crate::domain::FinanceData).

pub mod services;
