//! Plan Query Service
//!
//! Read side for plans and installments: listing by caller visibility and
//! fetching single plans with their nested installment schedule.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::{Capabilities, InstallmentStatus, PlanStatus, PlanVisibility};
use crate::error::AppError;

/// Installment as exposed at the API boundary
#[derive(Debug, Clone, Serialize)]
pub struct InstallmentView {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub status: InstallmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment plan with its nested installments
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub total_amount: Decimal,
    pub number_of_installments: i32,
    pub start_date: NaiveDate,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub installments: Vec<InstallmentView>,
}

type PlanRow = (
    Uuid,
    Uuid,
    Option<Uuid>,
    Decimal,
    i32,
    NaiveDate,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

type InstallmentRow = (
    Uuid,
    Uuid,
    NaiveDate,
    Decimal,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

/// Query service for plan read models
#[derive(Debug, Clone)]
pub struct PlanQueryService {
    pool: PgPool,
}

impl PlanQueryService {
    /// Create a new PlanQueryService
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List plans visible to the caller, most recent first, with nested
    /// installments ordered by due date.
    pub async fn list_for_caller(
        &self,
        caller_id: Uuid,
        capabilities: &Capabilities,
    ) -> Result<Vec<PlanView>, AppError> {
        let rows: Vec<PlanRow> = match capabilities.plan_visibility {
            PlanVisibility::CreatedByCaller => {
                sqlx::query_as(
                    r#"
                    SELECT id, merchant_id, user_id, total_amount, number_of_installments,
                           start_date, status, created_at, updated_at
                    FROM payment_plans
                    WHERE merchant_id = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(caller_id)
                .fetch_all(&self.pool)
                .await?
            }
            PlanVisibility::AssignedToCaller => {
                sqlx::query_as(
                    r#"
                    SELECT id, merchant_id, user_id, total_amount, number_of_installments,
                           start_date, status, created_at, updated_at
                    FROM payment_plans
                    WHERE user_id = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(caller_id)
                .fetch_all(&self.pool)
                .await?
            }
            PlanVisibility::None => Vec::new(),
        };

        self.attach_installments(rows).await
    }

    /// Fetch a single plan with its installments.
    pub async fn fetch_plan(&self, plan_id: Uuid) -> Result<Option<PlanView>, AppError> {
        let row: Option<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, merchant_id, user_id, total_amount, number_of_installments,
                   start_date, status, created_at, updated_at
            FROM payment_plans
            WHERE id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut plans = self.attach_installments(vec![row]).await?;
        Ok(plans.pop())
    }

    /// Load installments for a batch of plans and nest them under their plans.
    async fn attach_installments(&self, rows: Vec<PlanRow>) -> Result<Vec<PlanView>, AppError> {
        let plan_ids: Vec<Uuid> = rows.iter().map(|r| r.0).collect();

        let installment_rows: Vec<InstallmentRow> = if plan_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query_as(
                r#"
                SELECT id, plan_id, due_date, amount, status, created_at, updated_at
                FROM installments
                WHERE plan_id = ANY($1)
                ORDER BY due_date ASC
                "#,
            )
            .bind(&plan_ids)
            .fetch_all(&self.pool)
            .await?
        };

        let mut by_plan: HashMap<Uuid, Vec<InstallmentView>> = HashMap::new();
        for row in installment_rows {
            let view = installment_from_row(row)?;
            by_plan.entry(view.plan_id).or_default().push(view);
        }

        rows.into_iter()
            .map(|row| {
                let (
                    id,
                    merchant_id,
                    user_id,
                    total_amount,
                    number_of_installments,
                    start_date,
                    status,
                    created_at,
                    updated_at,
                ) = row;
                Ok(PlanView {
                    id,
                    merchant_id,
                    user_id,
                    total_amount,
                    number_of_installments,
                    start_date,
                    status: PlanStatus::from_str(&status)
                        .map_err(|e| AppError::Internal(e.to_string()))?,
                    created_at,
                    updated_at,
                    installments: by_plan.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }
}

fn installment_from_row(row: InstallmentRow) -> Result<InstallmentView, AppError> {
    let (id, plan_id, due_date, amount, status, created_at, updated_at) = row;
    Ok(InstallmentView {
        id,
        plan_id,
        due_date,
        amount,
        status: InstallmentStatus::from_str(&status)
            .map_err(|e| AppError::Internal(e.to_string()))?,
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_installment_view_serializes_status_as_string() {
        let view = InstallmentView {
            id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            due_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            amount: dec!(250.00),
            status: InstallmentStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["due_date"], "2025-05-01");
    }

    #[test]
    fn test_bad_status_row_is_internal_error() {
        let row: InstallmentRow = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            dec!(10.00),
            "Cancelled".to_string(),
            Utc::now(),
            Utc::now(),
        );

        let result = installment_from_row(row);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
