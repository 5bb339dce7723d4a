use std::{future::Future, sync::Arc, time::Duration};

use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::principal_repo::PrincipalRepo,
    domain::entities::principal::{Principal, PrincipalKind},
};

/// Per-principal `token_version` counter. Bumping it logically revokes every
/// token issued before the bump; there is no blacklist.
///
/// Every storage call is bounded by `timeout`. Timeouts and storage errors
/// surface as `StorageUnavailable` so the gate fails closed.
#[derive(Clone)]
pub struct RevocationLedger {
    repo: Arc<dyn PrincipalRepo>,
    timeout: Duration,
}

impl RevocationLedger {
    pub fn new(repo: Arc<dyn PrincipalRepo>, timeout: Duration) -> Self {
        Self { repo, timeout }
    }

    /// Version check without loading the whole record, for callers that only
    /// hold an id (verification links). The gate reads it via `load_principal`.
    #[instrument(skip(self))]
    pub async fn current_version(&self, kind: PrincipalKind, id: Uuid) -> AppResult<i64> {
        self.bounded("get_token_version", self.repo.get_token_version(kind, id))
            .await?
            .ok_or(AppError::NotFound)
    }

    /// The single revocation primitive. Logout and "sign out everywhere" are
    /// both one call to this.
    #[instrument(skip(self))]
    pub async fn revoke(&self, kind: PrincipalKind, id: Uuid) -> AppResult<i64> {
        let version = self
            .bounded(
                "increment_token_version",
                self.repo.increment_token_version(kind, id),
            )
            .await?
            .ok_or(AppError::NotFound)?;
        tracing::info!(principal_kind = %kind, principal_id = %id, version, "Token version advanced");
        Ok(version)
    }

    /// Live record used by the gate for the version comparison.
    pub async fn load_principal(
        &self,
        kind: PrincipalKind,
        id: Uuid,
    ) -> AppResult<Option<Principal>> {
        self.bounded("find_by_id", self.repo.find_by_id(kind, id))
            .await
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                tracing::error!(op, error = %err, "Ledger storage call failed");
                Err(AppError::StorageUnavailable)
            }
            Err(_) => {
                tracing::error!(op, timeout_ms = self.timeout.as_millis() as u64, "Ledger storage call timed out");
                Err(AppError::StorageUnavailable)
            }
        }
    }
}
