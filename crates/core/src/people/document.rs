//! CNPJ and CPF normalization.

use thiserror::Error;

/// Kind of Brazilian tax document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Company tax id, 14 digits.
    Cnpj,
    /// Personal tax id, 11 digits.
    Cpf,
}

impl DocumentKind {
    /// Number of digits the document must have.
    #[must_use]
    pub const fn digit_count(self) -> usize {
        match self {
            Self::Cnpj => 14,
            Self::Cpf => 11,
        }
    }

    /// Display name used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cnpj => "CNPJ",
            Self::Cpf => "CPF",
        }
    }
}

/// Document validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Nothing (or only punctuation) was provided.
    #[error("{} is required", .0.name())]
    Missing(DocumentKind),

    /// Wrong number of digits after stripping punctuation.
    #[error("{} must have {} digits", .kind.name(), .kind.digit_count())]
    InvalidLength {
        /// Document kind being validated.
        kind: DocumentKind,
        /// Digits actually found.
        found: usize,
    },
}

/// Normalizes a CNPJ to `XX.XXX.XXX/XXXX-XX`.
///
/// ```
/// use finadmin_core::people::normalize_cnpj;
///
/// assert_eq!(normalize_cnpj("12345678000190").unwrap(), "12.345.678/0001-90");
/// ```
pub fn normalize_cnpj(raw: &str) -> Result<String, DocumentError> {
    let d = digits(raw, DocumentKind::Cnpj)?;
    Ok(format!(
        "{}.{}.{}/{}-{}",
        &d[0..2],
        &d[2..5],
        &d[5..8],
        &d[8..12],
        &d[12..14]
    ))
}

/// Normalizes a CPF to `XXX.XXX.XXX-XX`.
pub fn normalize_cpf(raw: &str) -> Result<String, DocumentError> {
    let d = digits(raw, DocumentKind::Cpf)?;
    Ok(format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11]))
}

fn digits(raw: &str, kind: DocumentKind) -> Result<String, DocumentError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(DocumentError::Missing(kind));
    }
    if digits.len() != kind.digit_count() {
        return Err(DocumentError::InvalidLength {
            kind,
            found: digits.len(),
        });
    }
    Ok(digits)
}
