//! `ApiError` (§7.1) — the error type every API handler converts into
//! before returning. Never leaks internals: `Internal`'s message is
//! logged with a generated request id and only the id crosses the wire.

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use vpnsentinel_core::ValidationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("authentication failed")]
    Auth,
    #[error("rate limited")]
    RateLimited { retry_after_secs: u64 },
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

#[derive(Serialize)]
struct RateLimitedBody {
    error: &'static str,
    message: String,
    retry_after: u64,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "validation_error",
                    message: e.to_string(),
                }),
            )
                .into_response(),
            ApiError::MalformedBody(reason) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "validation_error",
                    message: reason,
                }),
            )
                .into_response(),
            ApiError::Auth => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    error: "unauthorized",
                    message: "missing or invalid API key".to_string(),
                }),
            )
                .into_response(),
            ApiError::RateLimited { retry_after_secs } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(RateLimitedBody {
                        error: "rate_limited",
                        message: "too many requests".to_string(),
                        retry_after: retry_after_secs,
                    }),
                )
                    .into_response();
                response.headers_mut().insert(
                    axum::http::header::RETRY_AFTER,
                    axum::http::HeaderValue::from_str(&retry_after_secs.to_string())
                        .expect("integer formats to a valid header value"),
                );
                response
            }
            ApiError::Internal(message) => {
                let request_id = uuid::Uuid::new_v4();
                tracing::error!(target: "api", %request_id, %message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "internal_error",
                        message: format!("request_id={request_id}"),
                    }),
                )
                    .into_response()
            }
        }
    }
}

/// Drop-in replacement for `axum::Json` that converts a parse failure
/// into [`ApiError::MalformedBody`] instead of axum's default
/// plain-text rejection, so every client-visible failure crosses the
/// wire as `{error, message}` per §6/§7.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => Err(ApiError::MalformedBody(rejection.to_string())),
        }
    }
}
