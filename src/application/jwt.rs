use std::sync::Arc;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    app_error::{AppError, AppResult},
    application::claims::{self, Claims},
    domain::entities::{
        principal::{Principal, PrincipalKind, Role},
        token_kind::TokenKind,
    },
    infra::crypto::{ClaimsCipher, EncryptedBlob},
};

// ============================================================================
// Configuration
// ============================================================================

/// Signing secrets, lifetimes and admissible roles for one principal kind.
pub struct KindProfile {
    pub access_secret: SecretString,
    pub refresh_secret: SecretString,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub roles: Vec<Role>,
}

impl KindProfile {
    fn signing(&self, token_kind: TokenKind) -> (&SecretString, Duration) {
        match token_kind {
            TokenKind::Access => (&self.access_secret, self.access_ttl),
            TokenKind::Refresh => (&self.refresh_secret, self.refresh_ttl),
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Everything the issuer and verifier need. Built once from the environment
/// and shared; nothing below reads the environment itself.
pub struct TokenConfig {
    pub user: KindProfile,
    pub seller: KindProfile,
    /// Encrypts the claims of every access and refresh token, both kinds.
    pub encryption_secret: SecretString,
    pub verification_secret: SecretString,
    pub verification_ttl: Duration,
}

impl TokenConfig {
    pub fn profile(&self, kind: PrincipalKind) -> &KindProfile {
        match kind {
            PrincipalKind::User => &self.user,
            PrincipalKind::Seller => &self.seller,
        }
    }
}

// ============================================================================
// Token envelope and verification outcome
// ============================================================================

/// The signed JWT body. Identity lives only inside the encrypted `meta_data`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenEnvelope {
    pub meta_data: EncryptedBlob,
    pub iat: i64,
    pub exp: i64,
    /// Set only on verification tokens, which share one secret across kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PrincipalKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub claims: Claims,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Bad signature, wrong secret, or not a JWT at all.
    Signature,
    /// Authentic envelope whose payload did not decrypt or decode.
    Claims,
}

/// Tri-state verification result. Verification never fails past this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid(VerifiedToken),
    Expired,
    Invalid(InvalidReason),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid(_))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Verification::Expired)
    }

    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Verification::Valid(token) => Some(&token.claims),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryCheck {
    Enforce,
    /// Used only on the renewal route, where an expired access token is expected.
    Skip,
}

#[derive(Debug)]
pub struct IssuedTokens {
    pub access: String,
    pub refresh: String,
}

// ============================================================================
// Issuer
// ============================================================================

pub struct TokenIssuer {
    config: Arc<TokenConfig>,
    cipher: ClaimsCipher,
}

impl TokenIssuer {
    pub fn new(config: Arc<TokenConfig>) -> Self {
        let cipher = ClaimsCipher::new(&config.encryption_secret);
        Self { config, cipher }
    }

    /// Issue a token of `token_kind` for `principal`, signed under the
    /// secret and lifetime configured for the principal's kind.
    pub fn issue(&self, principal: &Principal, token_kind: TokenKind) -> AppResult<String> {
        let (secret, ttl) = self.config.profile(principal.kind).signing(token_kind);
        self.seal(principal, token_kind, secret, ttl, None)
    }

    pub fn issue_pair(&self, principal: &Principal) -> AppResult<IssuedTokens> {
        Ok(IssuedTokens {
            access: self.issue(principal, TokenKind::Access)?,
            refresh: self.issue(principal, TokenKind::Refresh)?,
        })
    }

    /// Short-lived token for email-verification style links, meant for the
    /// mail flow that sits outside this crate. Carries the refresh projection
    /// of the claims and records the principal kind it was issued for.
    pub fn issue_verification(&self, principal: &Principal) -> AppResult<String> {
        self.seal(
            principal,
            TokenKind::Refresh,
            &self.config.verification_secret,
            self.config.verification_ttl,
            Some(principal.kind),
        )
    }

    fn seal(
        &self,
        principal: &Principal,
        token_kind: TokenKind,
        secret: &SecretString,
        ttl: Duration,
        kind: Option<PrincipalKind>,
    ) -> AppResult<String> {
        let plaintext =
            claims::encode(principal, token_kind).map_err(|e| AppError::Internal(e.to_string()))?;
        let meta_data = self
            .cipher
            .encrypt(&plaintext)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let envelope = TokenEnvelope {
            meta_data,
            iat: now,
            exp: now + ttl.whole_seconds(),
            kind,
        };
        let header = Header::new(Algorithm::HS256);
        encode(
            &header,
            &envelope,
            &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        )
        .map_err(|e| AppError::Internal(e.to_string()))
    }
}

// ============================================================================
// Verifier
// ============================================================================

pub struct TokenVerifier {
    config: Arc<TokenConfig>,
    cipher: ClaimsCipher,
}

impl TokenVerifier {
    pub fn new(config: Arc<TokenConfig>) -> Self {
        let cipher = ClaimsCipher::new(&config.encryption_secret);
        Self { config, cipher }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn verify(&self, token: &str, kind: PrincipalKind, token_kind: TokenKind) -> Verification {
        self.verify_with(token, kind, token_kind, ExpiryCheck::Enforce)
    }

    pub fn verify_with(
        &self,
        token: &str,
        kind: PrincipalKind,
        token_kind: TokenKind,
        expiry: ExpiryCheck,
    ) -> Verification {
        let (secret, _) = self.config.profile(kind).signing(token_kind);
        let outcome = self.open(token, secret, expiry, None);
        if !outcome.is_valid() {
            tracing::debug!(
                principal_kind = %kind,
                token_kind = %token_kind,
                outcome = ?outcome,
                "Token verification failed"
            );
        }
        outcome
    }

    /// Counterpart of `TokenIssuer::issue_verification` for the link handler.
    /// A token issued for the other kind is `Invalid(Claims)`.
    pub fn verify_verification(&self, token: &str, kind: PrincipalKind) -> Verification {
        self.open(
            token,
            &self.config.verification_secret,
            ExpiryCheck::Enforce,
            Some(kind),
        )
    }

    fn open(
        &self,
        token: &str,
        secret: &SecretString,
        expiry: ExpiryCheck,
        kind: Option<PrincipalKind>,
    ) -> Verification {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = expiry == ExpiryCheck::Enforce;

        let envelope = match decode::<TokenEnvelope>(
            token,
            &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            &validation,
        ) {
            Ok(data) => data.claims,
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                return Verification::Expired;
            }
            Err(_) => return Verification::Invalid(InvalidReason::Signature),
        };
        if envelope.kind != kind {
            tracing::warn!(expected = ?kind, found = ?envelope.kind, "Token issued for another principal kind");
            return Verification::Invalid(InvalidReason::Claims);
        }

        let claims = match self
            .cipher
            .decrypt(&envelope.meta_data)
            .map_err(|e| e.to_string())
            .and_then(|plaintext| claims::decode(&plaintext).map_err(|e| e.to_string()))
        {
            Ok(claims) => claims,
            Err(err) => {
                tracing::warn!(error = %err, "Authentic token carried unreadable claims");
                return Verification::Invalid(InvalidReason::Claims);
            }
        };

        Verification::Valid(VerifiedToken {
            claims,
            issued_at: envelope.iat,
            expires_at: envelope.exp,
        })
    }
}
