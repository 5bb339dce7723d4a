//! Request-time authorization decision.
//!
//! One `Authenticator` per principal kind; the kind only selects the
//! `KindProfile` (secrets, lifetimes, role set), the procedure is shared.

use std::sync::Arc;

use crate::{
    app_error::{AppError, AppResult, Credential},
    application::jwt::{ExpiryCheck, InvalidReason, TokenVerifier, Verification, VerifiedToken},
    domain::entities::{
        principal::{Principal, PrincipalKind, Role},
        token_kind::TokenKind,
    },
    use_cases::ledger::RevocationLedger,
};

/// Credentials and route requirements for one protected request.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateRequest<'a> {
    /// Value of the `jid` cookie.
    pub refresh_token: Option<&'a str>,
    /// Bearer token from the `Authorization` header.
    pub access_token: Option<&'a str>,
    /// The request targets the renewal route; access-token expiry is not checked.
    pub renewal: bool,
    pub required_role: Option<Role>,
}

/// What a request carries forward once the gate lets it through.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub principal: Principal,
    pub access: VerifiedToken,
    pub refresh: VerifiedToken,
}

pub struct Authenticator {
    kind: PrincipalKind,
    verifier: Arc<TokenVerifier>,
    ledger: RevocationLedger,
}

impl Authenticator {
    pub fn new(kind: PrincipalKind, verifier: Arc<TokenVerifier>, ledger: RevocationLedger) -> Self {
        Self {
            kind,
            verifier,
            ledger,
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }

    pub async fn authorize(&self, request: GateRequest<'_>) -> AppResult<AuthenticatedPrincipal> {
        let kind = self.kind;
        let profile = self.verifier.config().profile(kind);

        let Some(refresh_token) = request.refresh_token.filter(|t| !t.is_empty()) else {
            return Err(self.reject(AppError::CredentialMissing(Credential::RefreshCookie)));
        };
        let refresh = match self.verifier.verify(refresh_token, kind, TokenKind::Refresh) {
            Verification::Valid(token) => token,
            Verification::Expired => {
                return Err(self.reject(AppError::TokenExpired(Credential::RefreshCookie)));
            }
            Verification::Invalid(reason) => {
                return Err(self.reject(invalid(reason, Credential::RefreshCookie)));
            }
        };

        let Some(access_token) = request.access_token.filter(|t| !t.is_empty()) else {
            return Err(self.reject(AppError::CredentialMissing(Credential::AccessToken)));
        };
        let expiry = if request.renewal {
            ExpiryCheck::Skip
        } else {
            ExpiryCheck::Enforce
        };
        let access = match self
            .verifier
            .verify_with(access_token, kind, TokenKind::Access, expiry)
        {
            Verification::Valid(token) => token,
            Verification::Expired => {
                return Err(self.reject(AppError::TokenExpired(Credential::AccessToken)));
            }
            Verification::Invalid(reason) => {
                return Err(self.reject(invalid(reason, Credential::AccessToken)));
            }
        };

        let Some(role) = access.claims.role.filter(|r| profile.permits(*r)) else {
            return Err(self.reject(AppError::ClaimsMalformed(Credential::AccessToken)));
        };

        if access.claims.principal_id != refresh.claims.principal_id {
            return Err(self.reject(AppError::CredentialMismatch));
        }

        let Some(principal) = self
            .ledger
            .load_principal(kind, access.claims.principal_id)
            .await?
        else {
            return Err(self.reject(AppError::RevocationMismatch));
        };

        if principal.token_version != refresh.claims.token_version
            || principal.token_version != access.claims.token_version
        {
            tracing::warn!(
                principal_kind = %kind,
                principal_id = %principal.id,
                live = principal.token_version,
                refresh = refresh.claims.token_version,
                access = access.claims.token_version,
                "Token version mismatch"
            );
            return Err(AppError::RevocationMismatch);
        }

        if let Some(required) = request.required_role {
            if !profile.permits(required) {
                tracing::warn!(
                    principal_kind = %kind,
                    email = %principal.email,
                    required_role = %required,
                    "Route requires a role this principal kind cannot hold"
                );
                return Err(AppError::RoleMismatch);
            }
            if required != role {
                return Err(self.reject(AppError::RoleMismatch));
            }
        }

        Ok(AuthenticatedPrincipal {
            principal,
            access,
            refresh,
        })
    }

    fn reject(&self, err: AppError) -> AppError {
        tracing::warn!(principal_kind = %self.kind, reason = %err, "Request rejected by gate");
        err
    }
}

fn invalid(reason: InvalidReason, credential: Credential) -> AppError {
    match reason {
        InvalidReason::Signature => AppError::SignatureInvalid(credential),
        InvalidReason::Claims => AppError::ClaimsMalformed(credential),
    }
}
