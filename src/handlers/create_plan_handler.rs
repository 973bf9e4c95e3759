//! Plan Creation Handler
//!
//! Creates a payment plan and its full installment schedule in one
//! transaction: either the plan and every installment exist afterward,
//! or none do.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{monthly_schedule, validate_plan_creation, Capabilities, DomainError, ValidationErrors};
use crate::error::AppError;
use crate::queries::{PlanQueryService, PlanView};

use super::CreatePlanCommand;

/// Handler for payment plan creation
pub struct CreatePlanHandler {
    queries: PlanQueryService,
    pool: PgPool,
}

impl CreatePlanHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            queries: PlanQueryService::new(pool.clone()),
            pool,
        }
    }

    /// Execute the create plan command on behalf of `merchant_id`.
    pub async fn execute(
        &self,
        command: CreatePlanCommand,
        merchant_id: Uuid,
        capabilities: &Capabilities,
    ) -> Result<PlanView, AppError> {
        if !capabilities.can_create_plans {
            return Err(DomainError::NotPermitted.into());
        }

        let today = Utc::now().date_naive();
        let input = validate_plan_creation(
            &command.total_amount,
            command.number_of_installments,
            command.start_date,
            today,
        )
        .map_err(AppError::Validation)?;

        // The recipient must be an active user-role account
        let recipient: Option<(String, bool)> =
            sqlx::query_as("SELECT role, is_active FROM users WHERE id = $1")
                .bind(command.user_id)
                .fetch_optional(&self.pool)
                .await?;

        match recipient {
            Some((role, true)) if role == "user" => {}
            _ => {
                let mut errors = ValidationErrors::new();
                errors.add("user_id", "User not found or not eligible for payment plans.");
                return Err(AppError::Validation(errors));
            }
        }

        let schedule = monthly_schedule(
            input.total_amount,
            input.number_of_installments,
            input.start_date,
        );

        // Splitting a tiny total across many installments can leave the
        // remainder entry at zero or below, which no schedule may contain
        if schedule.iter().any(|e| e.amount <= rust_decimal::Decimal::ZERO) {
            let mut errors = ValidationErrors::new();
            errors.add(
                "number_of_installments",
                "Total amount is too small to split into that many installments.",
            );
            return Err(AppError::Validation(errors));
        }

        let installment_count = i32::try_from(input.number_of_installments)
            .map_err(|_| AppError::Internal("Installment count out of range".to_string()))?;

        let plan_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO payment_plans
                (id, merchant_id, user_id, total_amount, number_of_installments,
                 start_date, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'Active', NOW(), NOW())
            "#,
        )
        .bind(plan_id)
        .bind(merchant_id)
        .bind(command.user_id)
        .bind(input.total_amount.value())
        .bind(installment_count)
        .bind(input.start_date)
        .execute(&mut *tx)
        .await?;

        // Bulk insert the whole schedule in one statement
        let due_dates: Vec<chrono::NaiveDate> = schedule.iter().map(|e| e.due_date).collect();
        let amounts: Vec<rust_decimal::Decimal> = schedule.iter().map(|e| e.amount).collect();

        sqlx::query(
            r#"
            INSERT INTO installments (id, plan_id, due_date, amount, status, created_at, updated_at)
            SELECT gen_random_uuid(), $1, t.due_date, t.amount, 'Pending', NOW(), NOW()
            FROM UNNEST($2::date[], $3::numeric[]) AS t(due_date, amount)
            "#,
        )
        .bind(plan_id)
        .bind(&due_dates)
        .bind(&amounts)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            plan_id = %plan_id,
            merchant_id = %merchant_id,
            user_id = %command.user_id,
            total_amount = %input.total_amount,
            installments = input.number_of_installments,
            "Payment plan created"
        );

        self.queries
            .fetch_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::Internal("Created plan not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_create_plan_command() {
        let user_id = Uuid::new_v4();
        let cmd = CreatePlanCommand::new(
            user_id,
            "1000.00".to_string(),
            4,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        );

        assert_eq!(cmd.user_id, user_id);
        assert_eq!(cmd.total_amount, "1000.00");
        assert_eq!(cmd.number_of_installments, 4);
    }
}
