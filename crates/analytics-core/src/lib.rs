//! Shared types for the web analytics workspace: the session record model,
//! the error type, CLI settings and metric formatting.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{AnalyticsError, Result};
