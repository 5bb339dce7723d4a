//! In-memory and failure-injecting implementations of `PrincipalRepo`.

use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::principal_repo::PrincipalRepo,
    domain::entities::principal::{NewPrincipal, Principal, PrincipalCredentials, PrincipalKind},
};

// ============================================================================
// InMemoryPrincipalRepo
// ============================================================================

/// In-memory implementation of PrincipalRepo. Increments happen under the
/// map lock, so they are atomic like the SQL `UPDATE .. RETURNING`.
#[derive(Default)]
pub struct InMemoryPrincipalRepo {
    pub records: Mutex<HashMap<(PrincipalKind, Uuid), PrincipalCredentials>>,
}

impl InMemoryPrincipalRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Principals stored without a usable password hash.
    pub fn with_principals(principals: Vec<Principal>) -> Self {
        Self::with_credentials(
            principals
                .into_iter()
                .map(|principal| PrincipalCredentials {
                    principal,
                    password_hash: String::new(),
                })
                .collect(),
        )
    }

    pub fn with_credentials(credentials: Vec<PrincipalCredentials>) -> Self {
        let map = credentials
            .into_iter()
            .map(|c| ((c.principal.kind, c.principal.id), c))
            .collect();
        Self {
            records: Mutex::new(map),
        }
    }
}

#[async_trait]
impl PrincipalRepo for InMemoryPrincipalRepo {
    async fn find_by_id(&self, kind: PrincipalKind, id: Uuid) -> AppResult<Option<Principal>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(kind, id))
            .map(|c| c.principal.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        kind: PrincipalKind,
        email: &str,
    ) -> AppResult<Option<PrincipalCredentials>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|c| c.principal.kind == kind && c.principal.email == email)
            .cloned())
    }

    async fn email_in_use(&self, email: &str) -> AppResult<bool> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .any(|c| c.principal.email == email))
    }

    async fn create(&self, new: NewPrincipal) -> AppResult<Principal> {
        let mut records = self.records.lock().unwrap();

        // Mirrors the cross-kind email claim taken inside the insert transaction.
        if records.values().any(|c| c.principal.email == new.email) {
            return Err(AppError::EmailTaken);
        }

        let now = chrono::Utc::now().naive_utc();
        let principal = Principal {
            id: Uuid::new_v4(),
            kind: new.kind,
            email: new.email,
            name: new.name,
            role: new.role,
            token_version: 0,
            created_at: Some(now),
            updated_at: Some(now),
        };
        records.insert(
            (principal.kind, principal.id),
            PrincipalCredentials {
                principal: principal.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(principal)
    }

    async fn get_token_version(&self, kind: PrincipalKind, id: Uuid) -> AppResult<Option<i64>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(kind, id))
            .map(|c| c.principal.token_version))
    }

    async fn increment_token_version(
        &self,
        kind: PrincipalKind,
        id: Uuid,
    ) -> AppResult<Option<i64>> {
        let mut records = self.records.lock().unwrap();
        Ok(records.get_mut(&(kind, id)).map(|c| {
            c.principal.token_version += 1;
            c.principal.updated_at = Some(chrono::Utc::now().naive_utc());
            c.principal.token_version
        }))
    }
}

// ============================================================================
// FailingPrincipalRepo
// ============================================================================

/// Every call fails as if the database connection was lost.
pub struct FailingPrincipalRepo;

fn connection_lost<T>() -> AppResult<T> {
    Err(AppError::Database("connection refused".into()))
}

#[async_trait]
impl PrincipalRepo for FailingPrincipalRepo {
    async fn find_by_id(&self, _kind: PrincipalKind, _id: Uuid) -> AppResult<Option<Principal>> {
        connection_lost()
    }

    async fn find_credentials_by_email(
        &self,
        _kind: PrincipalKind,
        _email: &str,
    ) -> AppResult<Option<PrincipalCredentials>> {
        connection_lost()
    }

    async fn email_in_use(&self, _email: &str) -> AppResult<bool> {
        connection_lost()
    }

    async fn create(&self, _principal: NewPrincipal) -> AppResult<Principal> {
        connection_lost()
    }

    async fn get_token_version(&self, _kind: PrincipalKind, _id: Uuid) -> AppResult<Option<i64>> {
        connection_lost()
    }

    async fn increment_token_version(
        &self,
        _kind: PrincipalKind,
        _id: Uuid,
    ) -> AppResult<Option<i64>> {
        connection_lost()
    }
}

// ============================================================================
// StalledPrincipalRepo
// ============================================================================

/// Every call hangs far longer than any ledger timeout used in tests.
pub struct StalledPrincipalRepo;

async fn stall() {
    tokio::time::sleep(Duration::from_secs(30)).await;
}

#[async_trait]
impl PrincipalRepo for StalledPrincipalRepo {
    async fn find_by_id(&self, _kind: PrincipalKind, _id: Uuid) -> AppResult<Option<Principal>> {
        stall().await;
        Ok(None)
    }

    async fn find_credentials_by_email(
        &self,
        _kind: PrincipalKind,
        _email: &str,
    ) -> AppResult<Option<PrincipalCredentials>> {
        stall().await;
        Ok(None)
    }

    async fn email_in_use(&self, _email: &str) -> AppResult<bool> {
        stall().await;
        Ok(false)
    }

    async fn create(&self, _principal: NewPrincipal) -> AppResult<Principal> {
        stall().await;
        connection_lost()
    }

    async fn get_token_version(&self, _kind: PrincipalKind, _id: Uuid) -> AppResult<Option<i64>> {
        stall().await;
        Ok(None)
    }

    async fn increment_token_version(
        &self,
        _kind: PrincipalKind,
        _id: Uuid,
    ) -> AppResult<Option<i64>> {
        stall().await;
        Ok(None)
    }
}
