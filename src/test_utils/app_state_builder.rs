//! Test app state builder for HTTP-level integration testing.
//!
//! `TestAppStateBuilder` creates an `AppState` over an in-memory principal
//! repository and fixed token secrets.

use std::{net::SocketAddr, sync::Arc};

use axum::http::HeaderValue;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        jwt::{TokenConfig, TokenIssuer, TokenVerifier},
        ports::principal_repo::PrincipalRepo,
    },
    domain::entities::principal::{Principal, PrincipalCredentials},
    infra::config::AppConfig,
    test_utils::{InMemoryPrincipalRepo, test_token_config, with_test_password},
};

type TokenOverrides = Box<dyn FnOnce(&mut TokenConfig)>;

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let user = create_test_user(|u| u.token_version = 3);
///
/// let app_state = TestAppStateBuilder::new()
///     .with_principal(user)
///     .with_token_config(|c| c.user.access_ttl = Duration::seconds(-60))
///     .build();
/// ```
pub struct TestAppStateBuilder {
    credentials: Vec<PrincipalCredentials>,
    repo: Option<Arc<dyn PrincipalRepo>>,
    token_overrides: Option<TokenOverrides>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            credentials: vec![],
            repo: None,
            token_overrides: None,
        }
    }

    /// Add a principal that cannot log in (empty password hash).
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.credentials.push(PrincipalCredentials {
            principal,
            password_hash: String::new(),
        });
        self
    }

    /// Add a principal whose password is `password`.
    pub fn with_password(mut self, principal: Principal, password: &str) -> Self {
        self.credentials.push(with_test_password(principal, password));
        self
    }

    /// Replace the in-memory repository (e.g. with `FailingPrincipalRepo`).
    /// Principals added through the builder are ignored.
    pub fn with_repo(mut self, repo: Arc<dyn PrincipalRepo>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn with_token_config(mut self, overrides: impl FnOnce(&mut TokenConfig) + 'static) -> Self {
        self.token_overrides = Some(Box::new(overrides));
        self
    }

    pub fn build(self) -> AppState {
        let repo: Arc<dyn PrincipalRepo> = match self.repo {
            Some(repo) => repo,
            None => Arc::new(InMemoryPrincipalRepo::with_credentials(self.credentials)),
        };

        let mut tokens = test_token_config();
        if let Some(overrides) = self.token_overrides {
            overrides(&mut tokens);
        }

        let config = AppConfig {
            tokens: Arc::new(tokens),
            ledger_timeout: std::time::Duration::from_millis(200),
            cookie_same_site_strict: false,
            database_url: String::new(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
        };

        AppState::new(config, repo)
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Issuer over the same token config, for minting test credentials.
    pub fn issuer(&self) -> TokenIssuer {
        TokenIssuer::new(self.config.tokens.clone())
    }

    pub fn verifier(&self) -> TokenVerifier {
        TokenVerifier::new(self.config.tokens.clone())
    }
}
