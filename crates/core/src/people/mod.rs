//! Suppliers, customers and billed people.
//!
//! Brazilian document numbers arrive in every shape imaginable (masked,
//! unmasked, with stray spaces). They are reduced to digits, checked for
//! length and stored in their canonical masked form so the unique indexes
//! compare like with like.

mod document;
mod name;

pub use document::{DocumentError, DocumentKind, normalize_cnpj, normalize_cpf};
pub use name::{MAX_NAME_LEN, validate_name, validate_optional_name};

#[cfg(test)]
mod tests;
