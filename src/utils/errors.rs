use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Application error taxonomy.
///
/// Every public operation converts its failures into one of these variants;
/// nothing crosses the transport boundary as an unhandled fault. `Internal`
/// wraps unexpected errors (database, hashing, encoding), which are logged
/// with context and rendered as a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("School not found")]
    TenantNotFound,
    #[error("An account with this email already exists for this school")]
    DuplicateAccount,
    #[error("{0}")]
    DuplicateTenant(String),
    #[error("Validation failed")]
    Validation(Vec<String>),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account is temporarily locked. Try again later")]
    AccountLocked,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Account not found")]
    AccountNotFound,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation<S: Into<String>>(detail: S) -> Self {
        Self::Validation(vec![detail.into()])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::TenantNotFound | Self::AccountNotFound | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::DuplicateAccount | Self::DuplicateTenant(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidCredentials | Self::InvalidToken | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::AccountLocked => StatusCode::LOCKED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Internal(source) = &self {
            error!(error = ?source, "Unhandled internal error");
        }

        let body = match &self {
            Self::Validation(details) => Json(json!({
                "error": self.to_string(),
                "errors": details,
            })),
            _ => Json(json!({ "error": self.to_string() })),
        };

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::TenantNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::DuplicateAccount.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::DuplicateTenant("School code already in use".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Validation(vec![]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::AccountLocked.status(), StatusCode::LOCKED);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AccountNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_error_hides_source_text() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused on 10.0.0.3"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn test_credentials_message_does_not_distinguish_missing_account() {
        // Same message for "no such account" and "wrong password".
        assert_eq!(
            AppError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }

    #[test]
    fn test_sqlx_error_converts_to_internal() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
