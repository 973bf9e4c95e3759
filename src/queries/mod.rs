//! Query module
//!
//! Read-side services for the API boundary.

mod service;

pub use service::{InstallmentView, PlanQueryService, PlanView};
