//! API route definitions.

mod common;

pub mod billed_people;
pub mod customers;
pub mod expense_types;
pub mod payable_accounts;
pub mod pdf;
pub mod receivable_accounts;
pub mod revenue_types;
pub mod root;
pub mod suppliers;

use axum::Router;
use finadmin_shared::UploadConfig;

use crate::AppState;

/// Creates the `/api/v1` routes.
pub fn api_routes(upload: &UploadConfig) -> Router<AppState> {
    Router::new()
        .merge(suppliers::routes())
        .merge(customers::routes())
        .merge(billed_people::routes())
        .merge(expense_types::routes())
        .merge(revenue_types::routes())
        .merge(payable_accounts::routes())
        .merge(receivable_accounts::routes())
        .merge(pdf::routes(upload))
}
