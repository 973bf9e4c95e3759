//! Command definitions
//!
//! Commands represent intentions to change the system state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Command to create a payment plan with its installment schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlanCommand {
    /// User ID of the plan recipient
    pub user_id: Uuid,
    /// Total amount owed (as string for precise decimal)
    pub total_amount: String,
    /// Number of monthly installments to split the total into
    pub number_of_installments: i64,
    /// Due date of the first installment
    pub start_date: NaiveDate,
}

impl CreatePlanCommand {
    pub fn new(
        user_id: Uuid,
        total_amount: String,
        number_of_installments: i64,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            user_id,
            total_amount,
            number_of_installments,
            start_date,
        }
    }
}

/// Command to pay a single installment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayInstallmentCommand {
    pub installment_id: Uuid,
}

impl PayInstallmentCommand {
    pub fn new(installment_id: Uuid) -> Self {
        Self { installment_id }
    }
}
