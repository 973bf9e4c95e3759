//! Domain module
//!
//! Core domain types and business logic.

pub mod error;
pub mod money;
pub mod role;
pub mod schedule;
pub mod status;
pub mod validation;

pub use error::DomainError;
pub use money::{Money, MoneyError};
pub use role::{Capabilities, PlanVisibility, Role};
pub use schedule::{monthly_schedule, ScheduledInstallment};
pub use status::{InstallmentStatus, PlanStatus, UnknownStatus};
pub use validation::{validate_plan_creation, validate_registration, ValidationErrors};
