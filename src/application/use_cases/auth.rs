use std::sync::Arc;

use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        jwt::{IssuedTokens, TokenIssuer},
        ports::principal_repo::PrincipalRepo,
        validators::{MIN_PASSWORD_LEN, is_valid_email, is_valid_password, normalize_email},
    },
    domain::entities::principal::{NewPrincipal, Principal, PrincipalKind},
    infra::password::{hash_password, verify_dummy_password, verify_password},
    use_cases::{gate::AuthenticatedPrincipal, ledger::RevocationLedger},
};

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A freshly authenticated session: the principal and its token pair.
#[derive(Debug)]
pub struct Session {
    pub principal: Principal,
    pub tokens: IssuedTokens,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub email: String,
    /// False when the ledger did not move past the presented refresh token.
    pub logged_out: bool,
    pub token_version: i64,
}

#[derive(Clone)]
pub struct AuthUseCases {
    repo: Arc<dyn PrincipalRepo>,
    issuer: Arc<TokenIssuer>,
    ledger: RevocationLedger,
}

impl AuthUseCases {
    pub fn new(
        repo: Arc<dyn PrincipalRepo>,
        issuer: Arc<TokenIssuer>,
        ledger: RevocationLedger,
    ) -> Self {
        Self {
            repo,
            issuer,
            ledger,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, kind: PrincipalKind, input: RegisterInput) -> AppResult<Session> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("name is required".into()));
        }
        if !is_valid_email(&input.email) {
            return Err(AppError::InvalidInput("email is not valid".into()));
        }
        if !is_valid_password(&input.password) {
            return Err(AppError::InvalidInput(format!(
                "Password length should be at least {MIN_PASSWORD_LEN}"
            )));
        }

        let email = normalize_email(&input.email);
        // Skips hashing for the common case; `create` is what enforces it.
        if self.repo.email_in_use(&email).await? {
            return Err(AppError::EmailTaken);
        }

        let principal = self
            .repo
            .create(NewPrincipal {
                kind,
                email,
                name: name.to_string(),
                role: kind.default_role(),
                password_hash: hash_password(&input.password)?,
            })
            .await?;
        let tokens = self.issuer.issue_pair(&principal)?;

        tracing::info!(principal_kind = %kind, principal_id = %principal.id, "Principal registered");
        Ok(Session { principal, tokens })
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, kind: PrincipalKind, email: &str, password: &str) -> AppResult<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::InvalidInput("email and password are required".into()));
        }

        let Some(credentials) = self
            .repo
            .find_credentials_by_email(kind, &normalize_email(email))
            .await?
        else {
            verify_dummy_password(password);
            return Err(AppError::InvalidCredentials);
        };
        if !verify_password(password, &credentials.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        let principal = credentials.principal;
        let tokens = self.issuer.issue_pair(&principal)?;
        Ok(Session { principal, tokens })
    }

    /// Revokes every outstanding token of the authenticated principal.
    #[instrument(skip(self, session), fields(principal_id = %session.principal.id))]
    pub async fn logout(
        &self,
        session: &AuthenticatedPrincipal,
        email: &str,
    ) -> AppResult<LogoutOutcome> {
        if normalize_email(email) != session.access.claims.email {
            tracing::warn!("Logout email does not match the authenticated principal");
            return Err(AppError::CredentialMismatch);
        }

        let principal = &session.principal;
        let token_version = self.ledger.revoke(principal.kind, principal.id).await?;
        let logged_out = token_version != session.refresh.claims.token_version;
        if !logged_out {
            tracing::error!(token_version, "Token version did not advance on logout");
        }

        Ok(LogoutOutcome {
            email: principal.email.clone(),
            logged_out,
            token_version,
        })
    }

    /// New pair from the live record, so renewed tokens carry the current version.
    pub fn refresh(&self, session: &AuthenticatedPrincipal) -> AppResult<IssuedTokens> {
        self.issuer.issue_pair(&session.principal)
    }
}
