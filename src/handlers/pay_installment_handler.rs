//! Installment Payment Handler
//!
//! Marks a single installment Paid and flips the parent plan to Paid when
//! the last installment clears. The installment and plan rows are locked
//! for the duration of the transaction, so concurrent payments on sibling
//! installments serialize and the plan transition fires exactly once.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::{Capabilities, DomainError, InstallmentStatus, PlanStatus};
use crate::error::AppError;
use crate::queries::InstallmentView;

use super::PayInstallmentCommand;

/// Result of a successful installment payment
#[derive(Debug, Clone, Serialize)]
pub struct PayInstallmentResult {
    pub installment: InstallmentView,
    /// Plan status after the payment (Paid once all installments clear)
    pub plan_status: PlanStatus,
}

/// Handler for installment payments
pub struct PayInstallmentHandler {
    pool: PgPool,
}

impl PayInstallmentHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the payment on behalf of `acting_user_id`.
    pub async fn execute(
        &self,
        command: PayInstallmentCommand,
        acting_user_id: Uuid,
        capabilities: &Capabilities,
    ) -> Result<PayInstallmentResult, AppError> {
        if !capabilities.can_pay_installments {
            return Err(DomainError::NotPermitted.into());
        }

        let mut tx = self.pool.begin().await?;

        // Lock the installment and its plan together. The plan lock is what
        // serializes concurrent payments on siblings of the same plan.
        let row: Option<(Uuid, Uuid, NaiveDate, Decimal, String, Option<Uuid>)> = sqlx::query_as(
            r#"
            SELECT i.id, i.plan_id, i.due_date, i.amount, i.status, p.user_id
            FROM installments i
            JOIN payment_plans p ON p.id = i.plan_id
            WHERE i.id = $1
            FOR UPDATE OF i, p
            "#,
        )
        .bind(command.installment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (installment_id, plan_id, due_date, amount, status, plan_user_id) = row
            .ok_or_else(|| AppError::InstallmentNotFound(command.installment_id.to_string()))?;

        if plan_user_id != Some(acting_user_id) {
            return Err(DomainError::InstallmentNotOwned.into());
        }

        let status = InstallmentStatus::from_str(&status)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if status == InstallmentStatus::Paid {
            return Err(DomainError::InstallmentAlreadyPaid.into());
        }
        if !status.is_payable() {
            return Err(DomainError::InstallmentNotPayable(status).into());
        }

        let (created_at, updated_at): (DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
            r#"
            UPDATE installments
            SET status = 'Paid', updated_at = NOW()
            WHERE id = $1
            RETURNING created_at, updated_at
            "#,
        )
        .bind(installment_id)
        .fetch_one(&mut *tx)
        .await?;

        // Fan-in aggregation under the plan lock: one query decides whether
        // this payment was the last one.
        let unpaid: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM installments WHERE plan_id = $1 AND status <> 'Paid'",
        )
        .bind(plan_id)
        .fetch_one(&mut *tx)
        .await?;

        let plan_status = if unpaid == 0 {
            sqlx::query("UPDATE payment_plans SET status = 'Paid', updated_at = NOW() WHERE id = $1")
                .bind(plan_id)
                .execute(&mut *tx)
                .await?;
            PlanStatus::Paid
        } else {
            PlanStatus::Active
        };

        tx.commit().await?;

        tracing::info!(
            installment_id = %installment_id,
            plan_id = %plan_id,
            user_id = %acting_user_id,
            plan_status = %plan_status,
            "Installment paid"
        );

        Ok(PayInstallmentResult {
            installment: InstallmentView {
                id: installment_id,
                plan_id,
                due_date,
                amount,
                status: InstallmentStatus::Paid,
                created_at,
                updated_at,
            },
            plan_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pay_installment_command() {
        let id = Uuid::new_v4();
        let cmd = PayInstallmentCommand::new(id);
        assert_eq!(cmd.installment_id, id);
    }
}
