//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::access::{AccessDecision, DenyReason};

/// Application errors.
///
/// Denials are modeled explicitly so handlers can return the precise status
/// the decision procedure implies; storage faults stay 5xx and are never
/// presented as 403/404.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Map a denied [`AccessDecision`] to the matching error.
    ///
    /// Callers must only pass denied decisions; a granted decision maps to
    /// an internal error rather than a spurious denial.
    pub fn from_denied(decision: &AccessDecision) -> Self {
        match decision.reason {
            Some(DenyReason::NotFound) => AppError::NotFound,
            Some(DenyReason::Forbidden) | Some(DenyReason::InsufficientRole) => AppError::Forbidden,
            None => AppError::Internal(anyhow::anyhow!(
                "granted decision treated as denial"
            )),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // 5xx details go to the log, not the response body.
        let body = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn denied(reason: DenyReason) -> AccessDecision {
        AccessDecision {
            granted: false,
            effective_role: None,
            reason: Some(reason),
        }
    }

    #[test]
    fn test_denied_decisions_map_to_statuses() {
        assert!(matches!(
            AppError::from_denied(&denied(DenyReason::NotFound)),
            AppError::NotFound
        ));
        assert!(matches!(
            AppError::from_denied(&denied(DenyReason::Forbidden)),
            AppError::Forbidden
        ));
        assert!(matches!(
            AppError::from_denied(&denied(DenyReason::InsufficientRole)),
            AppError::Forbidden
        ));
    }

    #[test]
    fn test_granted_decision_is_not_a_denial() {
        let granted = AccessDecision {
            granted: true,
            effective_role: Some(Role::Editor),
            reason: None,
        };

        assert!(matches!(
            AppError::from_denied(&granted),
            AppError::Internal(_)
        ));
    }
}
