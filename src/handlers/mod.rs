//! Command Handlers module
//!
//! Handlers that orchestrate the plan lifecycle: creation with installment
//! allocation, and payments with the plan-completion check.

mod commands;
mod create_plan_handler;
mod pay_installment_handler;

pub use commands::*;
pub use create_plan_handler::CreatePlanHandler;
pub use pay_installment_handler::{PayInstallmentHandler, PayInstallmentResult};
