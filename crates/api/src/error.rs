//! Mapping of domain errors onto HTTP responses.
//!
//! Every handler returns [`ApiError`]. The body is always
//! `{"error": "<CODE>", "message": "<text>"}`; server-side failures are
//! logged with their detail and answered with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use finadmin_core::classification::UnknownCategory;
use finadmin_core::people::DocumentError;
use finadmin_db::repositories::{
    BilledPersonError, CustomerError, ExpenseTypeError, InvoiceImportError, PayableAccountError,
    ReceivableAccountError, RevenueTypeError, SupplierError,
};
use finadmin_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::{debug, error};

/// Error returned by API handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Shorthand for a 400 response.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.0.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            debug!(error = %self.0, "Request rejected");
        }

        let body = Json(json!({
            "error": self.0.error_code(),
            "message": self.0.public_message(),
        }));
        (status, body).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<UnknownCategory> for ApiError {
    fn from(err: UnknownCategory) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<SupplierError> for ApiError {
    fn from(err: SupplierError) -> Self {
        let message = err.to_string();
        Self(match err {
            SupplierError::NotFound(_) => AppError::NotFound(message),
            SupplierError::DuplicateTaxId(_) | SupplierError::InactiveDuplicate { .. } => {
                AppError::Conflict(message)
            }
            SupplierError::Database(_) => AppError::Database(message),
        })
    }
}

impl From<CustomerError> for ApiError {
    fn from(err: CustomerError) -> Self {
        let message = err.to_string();
        Self(match err {
            CustomerError::NotFound(_) => AppError::NotFound(message),
            CustomerError::DuplicateDocument(_) | CustomerError::InactiveDuplicate { .. } => {
                AppError::Conflict(message)
            }
            CustomerError::Database(_) => AppError::Database(message),
        })
    }
}

impl From<BilledPersonError> for ApiError {
    fn from(err: BilledPersonError) -> Self {
        let message = err.to_string();
        Self(match err {
            BilledPersonError::NotFound(_) => AppError::NotFound(message),
            BilledPersonError::DuplicateDocument(_)
            | BilledPersonError::InactiveDuplicate { .. } => AppError::Conflict(message),
            BilledPersonError::Database(_) => AppError::Database(message),
        })
    }
}

impl From<ExpenseTypeError> for ApiError {
    fn from(err: ExpenseTypeError) -> Self {
        let message = err.to_string();
        Self(match err {
            ExpenseTypeError::NotFound(_) => AppError::NotFound(message),
            ExpenseTypeError::Database(_) => AppError::Database(message),
        })
    }
}

impl From<RevenueTypeError> for ApiError {
    fn from(err: RevenueTypeError) -> Self {
        let message = err.to_string();
        Self(match err {
            RevenueTypeError::NotFound(_) => AppError::NotFound(message),
            RevenueTypeError::Database(_) => AppError::Database(message),
        })
    }
}

impl From<PayableAccountError> for ApiError {
    fn from(err: PayableAccountError) -> Self {
        let message = err.to_string();
        Self(match err {
            PayableAccountError::NotFound(_) | PayableAccountError::InstallmentNotFound { .. } => {
                AppError::NotFound(message)
            }
            PayableAccountError::InactiveSupplier(_)
            | PayableAccountError::InactiveBilledPerson(_)
            | PayableAccountError::InactiveExpenseType(_)
            | PayableAccountError::Rule(_) => AppError::BusinessRule(message),
            PayableAccountError::Database(_) => AppError::Database(message),
        })
    }
}

impl From<ReceivableAccountError> for ApiError {
    fn from(err: ReceivableAccountError) -> Self {
        let message = err.to_string();
        Self(match err {
            ReceivableAccountError::NotFound(_)
            | ReceivableAccountError::InstallmentNotFound { .. } => AppError::NotFound(message),
            ReceivableAccountError::InactiveCustomer(_)
            | ReceivableAccountError::InactiveRevenueType(_)
            | ReceivableAccountError::Rule(_) => AppError::BusinessRule(message),
            ReceivableAccountError::Database(_) => AppError::Database(message),
        })
    }
}

impl From<InvoiceImportError> for ApiError {
    fn from(err: InvoiceImportError) -> Self {
        let message = err.to_string();
        Self(match err {
            InvoiceImportError::Document(_) => AppError::Validation(message),
            InvoiceImportError::Rule(_) => AppError::BusinessRule(message),
            InvoiceImportError::Database(_) => AppError::Database(message),
        })
    }
}
