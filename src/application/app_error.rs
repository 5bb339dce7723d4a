use thiserror::Error;

/// The two transports a session credential can arrive on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    RefreshCookie,
    AccessToken,
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::RefreshCookie => write!(f, "refresh cookie"),
            Credential::AccessToken => write!(f, "access token"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Email already in use")]
    EmailTaken,

    #[error("Not found")]
    NotFound,

    #[error("Missing {0}")]
    CredentialMissing(Credential),

    #[error("Signature or format check failed for {0}")]
    SignatureInvalid(Credential),

    #[error("Expired {0}")]
    TokenExpired(Credential),

    #[error("Malformed claims in {0}")]
    ClaimsMalformed(Credential),

    #[error("Refresh and access tokens name different principals")]
    CredentialMismatch,

    #[error("Role not permitted for this route")]
    RoleMismatch,

    #[error("Token version no longer current")]
    RevocationMismatch,

    #[error("Session storage unavailable")]
    StorageUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    DatabaseError,
    InvalidCredentials,
    InvalidInput,
    EmailTaken,
    NotFound,
    ChangeBrowser,
    MissingAccessToken,
    InvalidRefreshToken,
    ExpiredAccessToken,
    InvalidAccessToken,
    Unauthorized,
    StorageUnavailable,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::EmailTaken => "EMAIL_TAKEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ChangeBrowser => "CHANGE_BROWSER",
            ErrorCode::MissingAccessToken => "MISSING_ACCESS_TOKEN",
            ErrorCode::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            ErrorCode::ExpiredAccessToken => "EXPIRED_ACCESS_TOKEN",
            ErrorCode::InvalidAccessToken => "INVALID_ACCESS_TOKEN",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::StorageUnavailable => "STORAGE_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::EmailTaken => ErrorCode::EmailTaken,
            AppError::NotFound => ErrorCode::NotFound,
            AppError::CredentialMissing(Credential::RefreshCookie) => ErrorCode::ChangeBrowser,
            AppError::CredentialMissing(Credential::AccessToken) => ErrorCode::MissingAccessToken,
            AppError::SignatureInvalid(Credential::RefreshCookie)
            | AppError::TokenExpired(Credential::RefreshCookie)
            | AppError::ClaimsMalformed(Credential::RefreshCookie) => {
                ErrorCode::InvalidRefreshToken
            }
            AppError::TokenExpired(Credential::AccessToken) => ErrorCode::ExpiredAccessToken,
            AppError::SignatureInvalid(Credential::AccessToken)
            | AppError::ClaimsMalformed(Credential::AccessToken) => ErrorCode::InvalidAccessToken,
            AppError::CredentialMismatch
            | AppError::RoleMismatch
            | AppError::RevocationMismatch => ErrorCode::Unauthorized,
            AppError::StorageUnavailable => ErrorCode::StorageUnavailable,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
