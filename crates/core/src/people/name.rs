//! Name field rules shared by people and types.

/// Longest accepted name, matching the `VARCHAR(255)` columns.
pub const MAX_NAME_LEN: usize = 255;

/// Trims a required name and checks its length.
///
/// Length is counted in characters so accented names are not penalized.
pub fn validate_name(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} is required"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(format!("{field} must be at most {MAX_NAME_LEN} characters"));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional name. Blank values become `None`.
pub fn validate_optional_name(field: &str, value: Option<&str>) -> Result<Option<String>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => validate_name(field, v).map(Some),
    }
}
