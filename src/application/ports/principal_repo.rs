use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    domain::entities::principal::{NewPrincipal, Principal, PrincipalCredentials, PrincipalKind},
};

/// Storage operations the session core needs. Users and sellers live in
/// separate collections; `kind` selects which one.
#[async_trait]
pub trait PrincipalRepo: Send + Sync {
    async fn find_by_id(&self, kind: PrincipalKind, id: Uuid) -> AppResult<Option<Principal>>;

    async fn find_credentials_by_email(
        &self,
        kind: PrincipalKind,
        email: &str,
    ) -> AppResult<Option<PrincipalCredentials>>;

    /// True if any principal of either kind already uses `email`.
    async fn email_in_use(&self, email: &str) -> AppResult<bool>;

    /// Claims the email across both kinds and inserts the principal in one
    /// atomic step. `EmailTaken` if either kind already holds the email.
    async fn create(&self, principal: NewPrincipal) -> AppResult<Principal>;

    async fn get_token_version(&self, kind: PrincipalKind, id: Uuid) -> AppResult<Option<i64>>;

    /// Atomically adds one to the stored version and returns the new value.
    /// `None` if no such principal exists.
    async fn increment_token_version(
        &self,
        kind: PrincipalKind,
        id: Uuid,
    ) -> AppResult<Option<i64>>;
}
