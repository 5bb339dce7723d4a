use std::{net::SocketAddr, sync::Arc};

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;

use crate::{
    application::jwt::{KindProfile, TokenConfig},
    domain::entities::principal::PrincipalKind,
    infra::error::InfraError,
};

pub struct AppConfig {
    /// Secrets, lifetimes and role sets handed to the issuer, verifier and gates.
    pub tokens: Arc<TokenConfig>,
    /// Upper bound on each revocation-ledger storage call.
    pub ledger_timeout: std::time::Duration,
    /// `SameSite=Strict` on the refresh cookie when set, `SameSite=None` otherwise.
    pub cookie_same_site_strict: bool,
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let secret = |var: &'static str| SecretString::new(get_env::<String>(var).into());

        let access_token_ttl_secs: i64 = get_env_default("ACCESS_TOKEN_TTL_SECS", 900);
        let refresh_token_ttl_secs: i64 = get_env_default("REFRESH_TOKEN_TTL_SECS", 604_800);
        let seller_access_token_ttl_secs: i64 =
            get_env_default("SELLER_ACCESS_TOKEN_TTL_SECS", 86_400);
        let seller_refresh_token_ttl_secs: i64 =
            get_env_default("SELLER_REFRESH_TOKEN_TTL_SECS", 604_800);
        let verify_token_ttl_secs: i64 = get_env_default("VERIFY_TOKEN_TTL_SECS", 300);

        let tokens = TokenConfig {
            user: KindProfile {
                access_secret: secret("JWT_SIGNING_SECRET"),
                refresh_secret: secret("REFRESH_SIGNING_SECRET"),
                access_ttl: Duration::seconds(access_token_ttl_secs),
                refresh_ttl: Duration::seconds(refresh_token_ttl_secs),
                roles: vec![PrincipalKind::User.default_role()],
            },
            seller: KindProfile {
                access_secret: secret("SELLER_JWT_SIGNING_SECRET"),
                refresh_secret: secret("SELLER_REFRESH_SIGNING_SECRET"),
                access_ttl: Duration::seconds(seller_access_token_ttl_secs),
                refresh_ttl: Duration::seconds(seller_refresh_token_ttl_secs),
                roles: vec![PrincipalKind::Seller.default_role()],
            },
            encryption_secret: secret("ACCESS_TOKEN_SECRET"),
            verification_secret: secret("JWT_EMAILVERIFY_SECRET"),
            verification_ttl: Duration::seconds(verify_token_ttl_secs),
        };

        let ledger_timeout_ms: u64 = get_env_default("LEDGER_TIMEOUT_MS", 2_000);
        let cookie_same_site_strict: bool = get_env_default("COOKIE_SAME_SITE_STRICT", false);
        let database_url: String = get_env("DATABASE_URL");
        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3001)),
        );
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid { var: "CORS_ORIGIN" })?;

        Ok(Self {
            tokens: Arc::new(tokens),
            ledger_timeout: std::time::Duration::from_millis(ledger_timeout_ms),
            cookie_same_site_strict,
            database_url,
            bind_addr,
            cors_origin,
        })
    }
}
