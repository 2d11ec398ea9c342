//! Domain vocabulary for the Jobbit marketplace.
//!
//! Everything in this crate is free of I/O: error types, id aliases, the
//! status enumerations stored on records, request validation helpers,
//! page-number pagination math and the subscription plan vocabulary.

#[macro_use]
pub mod enums;
pub mod error;
pub mod pagination;
pub mod subscription;
pub mod types;
pub mod validation;
