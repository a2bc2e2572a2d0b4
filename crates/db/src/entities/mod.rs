//! `SeaORM` entity definitions.
#![allow(missing_docs)]

pub mod billed_people;
pub mod customers;
pub mod expense_types;
pub mod payable_account_expense_classifications;
pub mod payable_accounts;
pub mod payable_installments;
pub mod receivable_account_revenue_classifications;
pub mod receivable_accounts;
pub mod receivable_installments;
pub mod revenue_types;
pub mod sea_orm_active_enums;
pub mod suppliers;
