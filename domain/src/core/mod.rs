//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: column-name helpers shared by prompt ids and analysis

pub mod error;
pub mod string;
