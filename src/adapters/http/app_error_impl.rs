use crate::app_error::{AppError, Credential, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Non-standard status telling clients to renew with the refresh cookie.
pub const ACCESS_TOKEN_EXPIRED: u16 = 419;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::EmailTaken => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TokenExpired(Credential::AccessToken) => {
                StatusCode::from_u16(ACCESS_TOKEN_EXPIRED).unwrap_or(StatusCode::UNAUTHORIZED)
            }
            AppError::InvalidCredentials
            | AppError::CredentialMissing(_)
            | AppError::SignatureInvalid(_)
            | AppError::TokenExpired(_)
            | AppError::ClaimsMalformed(_)
            | AppError::CredentialMismatch
            | AppError::RoleMismatch
            | AppError::RevocationMismatch => StatusCode::UNAUTHORIZED,
        }
    }

    /// Client-facing message. Storage and internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) => "Database error".into(),
            AppError::Internal(_) => "Internal error".into(),
            AppError::InvalidCredentials => "Incorrect Email/Password was provided".into(),
            AppError::CredentialMissing(_) => "Authentication credentials are missing".into(),
            AppError::TokenExpired(Credential::AccessToken) => "Access token expired".into(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::SignatureInvalid(_)
            | AppError::TokenExpired(_)
            | AppError::ClaimsMalformed(_)
            | AppError::CredentialMismatch
            | AppError::RoleMismatch
            | AppError::RevocationMismatch => "Unauthorized".into(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        error_resp(status, self.code(), self.public_message())
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: String) -> Response {
    let body = serde_json::json!({
        "status": "error",
        "code": code.as_str(),
        "message": message,
    });
    (status, Json(body)).into_response()
}
