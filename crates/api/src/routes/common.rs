//! Query and body helpers shared by the CRUD routes.

use finadmin_shared::types::PageRequest;
use serde::{Deserialize, Deserializer};

use crate::error::{ApiError, ApiResult};

/// Builds and checks a page request from optional query values.
pub(crate) fn page_request(page: Option<u32>, per_page: Option<u32>) -> ApiResult<PageRequest> {
    let defaults = PageRequest::default();
    let request = PageRequest::new(
        page.unwrap_or(defaults.page),
        per_page.unwrap_or(defaults.per_page),
    );
    request.validate()?;
    Ok(request)
}

/// Query parameters for `/search` endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search term.
    #[serde(default)]
    pub q: String,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl SearchQuery {
    /// Returns the trimmed term and page, rejecting an empty term.
    pub(crate) fn parts(&self) -> ApiResult<(&str, PageRequest)> {
        let term = self.q.trim();
        if term.is_empty() {
            return Err(ApiError::validation("q must have at least 1 character"));
        }
        Ok((term, page_request(self.page, self.per_page)?))
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Blank strings become `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
