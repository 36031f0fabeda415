use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ScrapeError;
use crate::models::{AuthOutcome, Credentials, RecordSet};
use crate::scraper;

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/scrape-data", post(scrape_data))
        .route("/test-login", post(test_login))
        .fallback(not_found)
}

/// Incoming credential body. Fields are optional so that missing values
/// surface as field-level validation errors instead of a decode failure.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ApiMessage {
    success: bool,
    message: String,
}

#[derive(Serialize)]
struct ScrapeResponse {
    success: bool,
    message: String,
    data: RecordSet,
}

#[derive(Serialize)]
struct ValidationResponse {
    success: bool,
    message: String,
    errors: Vec<FieldError>,
}

fn validate(request: &CredentialsRequest) -> Result<Credentials, Vec<FieldError>> {
    let mut errors = Vec::new();

    let username = request.username.as_deref().unwrap_or_default();
    if username.is_empty() {
        errors.push(FieldError {
            field: "username",
            message: "username is required".to_string(),
        });
    }

    let password = request.password.as_deref().unwrap_or_default();
    if password.is_empty() {
        errors.push(FieldError {
            field: "password",
            message: "password is required".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    } else {
        Err(errors)
    }
}

fn validation_failure(errors: Vec<FieldError>) -> Response {
    let body = ValidationResponse {
        success: false,
        message: "Invalid input data".to_string(),
        errors,
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Portal table scraping API",
        "status": "online",
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp_millis(),
    }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiMessage {
            success: false,
            message: "Route not found".to_string(),
        }),
    )
}

/// Full extraction flow. Runs headed, as the portal session is driven
/// interactively; the login-only probe below runs headless.
async fn scrape_data(Json(request): Json<CredentialsRequest>) -> Response {
    let credentials = match validate(&request) {
        Ok(credentials) => credentials,
        Err(errors) => return validation_failure(errors),
    };

    match scraper::run_extraction(&credentials, false).await {
        Ok(records) if records.is_empty() => (
            StatusCode::OK,
            Json(ScrapeResponse {
                success: false,
                message: "No data found in table".to_string(),
                data: records,
            }),
        )
            .into_response(),
        Ok(records) => (
            StatusCode::OK,
            Json(ScrapeResponse {
                success: true,
                message: format!("Extracted {} records successfully", records.len()),
                data: records,
            }),
        )
            .into_response(),
        Err(ScrapeError::AuthenticationFailed) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiMessage {
                success: false,
                message: "Authentication failed".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("scrape request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiMessage {
                    success: false,
                    message: format!("Internal error: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// Login-only probe. Always answers 200 with a success flag; internal
/// errors are reported in the message rather than as an error status.
async fn test_login(Json(request): Json<CredentialsRequest>) -> Response {
    let credentials = match validate(&request) {
        Ok(credentials) => credentials,
        Err(errors) => return validation_failure(errors),
    };

    let body = match scraper::verify_login(&credentials).await {
        Ok(AuthOutcome::Authenticated) => ApiMessage {
            success: true,
            message: "Login successful".to_string(),
        },
        Ok(_) => ApiMessage {
            success: false,
            message: "Login failed".to_string(),
        },
        Err(e) => {
            error!("test-login failed: {}", e);
            ApiMessage {
                success: false,
                message: format!("Error: {}", e),
            }
        }
    };

    Json(body).into_response()
}
