//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{validate_registration, DomainError, Role};
use crate::error::AppError;
use crate::handlers::{
    CreatePlanCommand, CreatePlanHandler, PayInstallmentCommand, PayInstallmentHandler,
    PayInstallmentResult,
};
use crate::queries::{PlanQueryService, PlanView};

use super::credentials::{generate_api_key, generate_salt, hash_password, sha256_hex};
use super::middleware::AuthenticatedUser;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    /// Plaintext API key, shown once at registration
    pub api_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Directory entry for a plan-eligible account
#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePlanRequest {
    pub user_id: Uuid,
    /// Amount as string for precise decimal handling
    pub total_amount: String,
    pub number_of_installments: i64,
    pub start_date: NaiveDate,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the authenticated API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        .route("/me", get(me))
        .route("/users", get(list_users))
        .route("/plans", post(create_plan))
        .route("/plans", get(list_plans))
        .route("/installments/:installment_id/pay", post(pay_installment))
}

// =========================================================================
// GET /me
// =========================================================================

/// Identity of the authenticated caller
async fn me(Extension(caller): Extension<AuthenticatedUser>) -> Json<MeResponse> {
    Json(MeResponse {
        id: caller.id,
        email: caller.email,
        role: caller.role,
    })
}

// =========================================================================
// GET /users
// =========================================================================

/// List active plan-eligible accounts, so merchants can pick recipients
async fn list_users(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    if !caller.capabilities.can_list_users {
        return Err(DomainError::NotPermitted.into());
    }

    let rows: Vec<(Uuid, String)> = sqlx::query_as(
        r#"
        SELECT id, email
        FROM users
        WHERE role = 'user' AND is_active
        ORDER BY email
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, email)| UserSummary { id, email })
            .collect(),
    ))
}

// =========================================================================
// POST /register (public)
// =========================================================================

/// Register a new user and issue their API key
pub async fn register(
    State(pool): State<PgPool>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let input = validate_registration(&request.email, &request.password, &request.role)
        .map_err(AppError::Validation)?;

    let user_id = Uuid::new_v4();
    let api_key = generate_api_key();
    let salt = generate_salt();

    // The unique index on email is the duplicate check; a racing duplicate
    // registration loses here rather than at a separate lookup
    let inserted = sqlx::query(
        r#"
        INSERT INTO users
            (id, email, password_salt, password_hash, api_key_hash, role, is_active,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, true, NOW(), NOW())
        "#,
    )
    .bind(user_id)
    .bind(&input.email)
    .bind(&salt)
    .bind(hash_password(&input.password, &salt))
    .bind(sha256_hex(&api_key))
    .bind(input.role.as_str())
    .execute(&pool)
    .await;

    if let Err(e) = inserted {
        if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
            return Err(AppError::EmailTaken);
        }
        return Err(e.into());
    }

    tracing::info!(user_id = %user_id, role = %input.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            email: input.email,
            role: input.role,
            api_key,
        }),
    ))
}

// =========================================================================
// POST /plans
// =========================================================================

/// Create a payment plan with its installment schedule (merchants only)
async fn create_plan(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<PlanView>), AppError> {
    let handler = CreatePlanHandler::new(pool);

    let command = CreatePlanCommand::new(
        request.user_id,
        request.total_amount,
        request.number_of_installments,
        request.start_date,
    );

    let plan = handler
        .execute(command, caller.id, &caller.capabilities)
        .await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

// =========================================================================
// GET /plans
// =========================================================================

/// List plans visible to the caller, most recent first
async fn list_plans(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<PlanView>>, AppError> {
    let queries = PlanQueryService::new(pool);

    let plans = queries
        .list_for_caller(caller.id, &caller.capabilities)
        .await?;

    Ok(Json(plans))
}

// =========================================================================
// POST /installments/:installment_id/pay
// =========================================================================

/// Pay a single installment (plan recipient only)
async fn pay_installment(
    State(pool): State<PgPool>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(installment_id): Path<Uuid>,
) -> Result<Json<PayInstallmentResult>, AppError> {
    let handler = PayInstallmentHandler::new(pool);

    let result = handler
        .execute(
            PayInstallmentCommand::new(installment_id),
            caller.id,
            &caller.capabilities,
        )
        .await?;

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserialize() {
        let json = r#"{
            "email": "merchant@example.com",
            "password": "password123",
            "role": "merchant"
        }"#;

        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email, "merchant@example.com");
        assert_eq!(request.role, "merchant");
    }

    #[test]
    fn test_create_plan_request_deserialize() {
        let json = r#"{
            "user_id": "550e8400-e29b-41d4-a716-446655440000",
            "total_amount": "1000.00",
            "number_of_installments": 4,
            "start_date": "2025-05-01"
        }"#;

        let request: CreatePlanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.total_amount, "1000.00");
        assert_eq!(request.number_of_installments, 4);
        assert_eq!(
            request.start_date,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
        );
    }

    #[test]
    fn test_register_response_serializes_role_lowercase() {
        let response = RegisterResponse {
            user_id: Uuid::new_v4(),
            email: "u@example.com".to_string(),
            role: Role::User,
            api_key: "pp_test".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["role"], "user");
    }
}
