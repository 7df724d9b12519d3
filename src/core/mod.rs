//! Core module - Configuration, job model, and common types

mod config;
mod error;
mod types;

pub use config::{Config, GeneralConfig, PricingConfig, RelayConfig};
pub use error::{Error, Result};
pub use types::{Job, JobStatus, QuoteResult, Stump, StumpUpdate};
