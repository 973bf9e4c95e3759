//! payplan Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod domain;
pub mod handlers;
pub mod jobs;
pub mod queries;

// Private modules (used only by main.rs binary)
pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{Capabilities, DomainError, InstallmentStatus, Money, MoneyError, PlanStatus, Role};
