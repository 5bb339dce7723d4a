use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    application::{
        jwt::{TokenIssuer, TokenVerifier},
        ports::principal_repo::PrincipalRepo,
    },
    domain::entities::principal::PrincipalKind,
    infra::config::AppConfig,
    use_cases::{auth::AuthUseCases, gate::Authenticator, ledger::RevocationLedger},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub user_gate: Arc<Authenticator>,
    pub seller_gate: Arc<Authenticator>,
}

impl AppState {
    /// Wires issuer, verifier, ledger and both gates around one repository.
    pub fn new(config: AppConfig, repo: Arc<dyn PrincipalRepo>) -> Self {
        let ledger = RevocationLedger::new(repo.clone(), config.ledger_timeout);
        let issuer = Arc::new(TokenIssuer::new(config.tokens.clone()));
        let verifier = Arc::new(TokenVerifier::new(config.tokens.clone()));

        let user_gate = Authenticator::new(PrincipalKind::User, verifier.clone(), ledger.clone());
        let seller_gate = Authenticator::new(PrincipalKind::Seller, verifier, ledger.clone());
        let auth_use_cases = AuthUseCases::new(repo, issuer, ledger);

        Self {
            config: Arc::new(config),
            auth_use_cases: Arc::new(auth_use_cases),
            user_gate: Arc::new(user_gate),
            seller_gate: Arc::new(seller_gate),
        }
    }

    pub fn gate(&self, kind: PrincipalKind) -> &Authenticator {
        match kind {
            PrincipalKind::User => &self.user_gate,
            PrincipalKind::Seller => &self.seller_gate,
        }
    }
}

impl FromRef<AppState> for Arc<AuthUseCases> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_use_cases.clone()
    }
}
