use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::claims::ClaimError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `PERMISSION_DENIED`, `NOT_FOUND`,
    /// `USERNAME_TAKEN`, `SELF_CLAIM_NOT_ALLOWED`, `DUPLICATE_CLAIM`,
    /// `INVALID_TRANSITION`, `PREMATURE_DISCLOSURE`, `STORE_UNAVAILABLE`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Claim message must be at least 20 characters")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    PermissionDenied,
    NotFound(String),
    UsernameTaken,
    SelfClaimNotAllowed,
    DuplicateClaim,
    /// The claim is not in the status the operation needs.
    InvalidTransition(String),
    PrematureDisclosure,
    /// Transient persistence failure. Safe to retry.
    StoreUnavailable(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid username or password".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Insufficient permissions".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::UsernameTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "USERNAME_TAKEN",
                    message: "Username is already taken".into(),
                },
            ),
            AppError::SelfClaimNotAllowed => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "SELF_CLAIM_NOT_ALLOWED",
                    message: "You cannot claim an item you reported".into(),
                },
            ),
            AppError::DuplicateClaim => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "DUPLICATE_CLAIM",
                    message: "You already have an open claim on this item".into(),
                },
            ),
            AppError::InvalidTransition(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "INVALID_TRANSITION",
                    message: msg,
                },
            ),
            AppError::PrematureDisclosure => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "PREMATURE_DISCLOSURE",
                    message: "Contact details are only available once the claim is approved".into(),
                },
            ),
            AppError::StoreUnavailable(detail) => {
                tracing::warn!("Store unavailable: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        code: "STORE_UNAVAILABLE",
                        message: "Service temporarily unavailable, please retry".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        ClaimError::from(err).into()
    }
}

impl From<ClaimError> for AppError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::Validation(msg) => AppError::Validation(msg),
            ClaimError::SelfClaimNotAllowed => AppError::SelfClaimNotAllowed,
            ClaimError::DuplicateClaim => AppError::DuplicateClaim,
            ClaimError::NotAuthorized => AppError::PermissionDenied,
            ClaimError::InvalidTransition { .. } => AppError::InvalidTransition(err.to_string()),
            ClaimError::PrematureDisclosure => AppError::PrematureDisclosure,
            ClaimError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            ClaimError::StoreUnavailable(detail) => AppError::StoreUnavailable(detail),
            ClaimError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
