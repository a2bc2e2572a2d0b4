//! Core business logic for finadmin.
//!
//! This crate contains business rules with ZERO web framework or database dependencies.
//!
//! # Modules
//!
//! - `people` - CNPJ/CPF normalization and name rules for suppliers, customers, billed people
//! - `classification` - Expense category catalog and keyword classifier
//! - `account` - Installment plans, installment status and classification percentages
//! - `extraction` - Invoice PDF extraction through a generative model
//! - `archive` - Storage for uploaded invoice PDFs

pub mod account;
pub mod archive;
pub mod classification;
pub mod extraction;
pub mod people;
