//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Reads return active rows unless a filter asks otherwise; deletes only
//! flip the `active` flag.

mod common;

pub mod billed_person;
pub mod customer;
pub mod expense_type;
pub mod invoice_import;
pub mod payable_account;
pub mod receivable_account;
pub mod revenue_type;
pub mod supplier;

pub use billed_person::{
    BilledPersonError, BilledPersonFilter, BilledPersonRepository, CreateBilledPersonInput,
    UpdateBilledPersonInput,
};
pub use common::is_unique_violation;
pub use customer::{
    CreateCustomerInput, CustomerError, CustomerFilter, CustomerRepository, UpdateCustomerInput,
};
pub use expense_type::{
    CreateExpenseTypeInput, ExpenseTypeError, ExpenseTypeFilter, ExpenseTypeRepository,
    UpdateExpenseTypeInput,
};
pub use invoice_import::{GeneratedAccount, InvoiceImportError, InvoiceImportRepository};
pub use payable_account::{
    CreatePayableAccountInput, PayableAccountDetails, PayableAccountError, PayableAccountFilter,
    PayableAccountRepository, RecordPaymentInput, UpdatePayableAccountInput,
};
pub use receivable_account::{
    CreateReceivableAccountInput, ReceivableAccountDetails, ReceivableAccountError,
    ReceivableAccountFilter, ReceivableAccountRepository, RecordReceiptInput,
    UpdateReceivableAccountInput,
};
pub use revenue_type::{
    CreateRevenueTypeInput, RevenueTypeError, RevenueTypeFilter, RevenueTypeRepository,
    UpdateRevenueTypeInput,
};
pub use supplier::{
    CreateSupplierInput, SupplierError, SupplierFilter, SupplierRepository, UpdateSupplierInput,
};
