//! API Middleware
//!
//! Authentication and request logging middleware.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::{Capabilities, Role};

use super::credentials::sha256_hex;

/// Authenticated caller attached to the request by the auth middleware
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub capabilities: Capabilities,
}

// =========================================================================
// API Key Authentication Middleware
// =========================================================================

/// Extract and validate the API key from the X-API-Key header, resolve the
/// caller's capabilities, and attach them to the request.
pub async fn auth_middleware(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let api_key = match headers.get("X-API-Key").and_then(|v| v.to_str().ok()) {
        Some(key) => key,
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Missing X-API-Key header",
                    "error_code": "missing_api_key"
                })),
            )
                .into_response());
        }
    };

    let user_record: Option<(Uuid, String, String, bool)> = match sqlx::query_as(
        r#"
        SELECT id, email, role, is_active
        FROM users
        WHERE api_key_hash = $1
        "#,
    )
    .bind(sha256_hex(api_key))
    .fetch_optional(&pool)
    .await
    {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Database error during API key validation: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "error_code": "database_error"
                })),
            )
                .into_response());
        }
    };

    let (user_id, email, role, is_active) = match user_record {
        Some(record) => record,
        None => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Invalid API key",
                    "error_code": "invalid_api_key"
                })),
            )
                .into_response());
        }
    };

    if !is_active {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Account is disabled",
                "error_code": "account_disabled"
            })),
        )
            .into_response());
    }

    let role = match Role::from_str(&role) {
        Ok(role) => role,
        Err(e) => {
            tracing::error!("Unknown role in users table for {}: {}", user_id, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "error_code": "internal_error"
                })),
            )
                .into_response());
        }
    };

    request.extensions_mut().insert(AuthenticatedUser {
        id: user_id,
        email,
        role,
        capabilities: Capabilities::for_role(role),
    });

    Ok(next.run(request).await)
}

// =========================================================================
// Header masking
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &[
    "x-api-key",
    "authorization",
    "cookie",
    "set-cookie",
];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    let headers = mask_headers_for_logging(request.headers());

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_headers_for_logging() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("x-api-key", "pp_secret_key_12345".parse().unwrap());

        let masked = mask_headers_for_logging(&headers);

        let api_key = masked.iter().find(|(k, _)| k == "x-api-key");
        let content_type = masked.iter().find(|(k, _)| k == "content-type");

        assert_eq!(api_key.unwrap().1, "[REDACTED]");
        assert_eq!(content_type.unwrap().1, "application/json");
    }

    #[test]
    fn test_sensitive_headers_list() {
        assert!(SENSITIVE_HEADERS.contains(&"x-api-key"));
        assert!(SENSITIVE_HEADERS.contains(&"authorization"));
        assert!(!SENSITIVE_HEADERS.contains(&"content-type"));
    }

    #[test]
    fn test_authenticated_user_carries_capabilities() {
        let user = AuthenticatedUser {
            id: Uuid::new_v4(),
            email: "m@example.com".to_string(),
            role: Role::Merchant,
            capabilities: Capabilities::for_role(Role::Merchant),
        };

        assert!(user.capabilities.can_create_plans);
        assert!(!user.capabilities.can_pay_installments);
    }
}
