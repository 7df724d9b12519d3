//! StumpCalc library
//!
//! This module exposes the quote engine and its collaborators for use in
//! tests and as a library.

pub mod core;
pub mod db;
pub mod export;
pub mod i18n;
pub mod quote;
pub mod relay;

pub use crate::quote::compute_quote;
