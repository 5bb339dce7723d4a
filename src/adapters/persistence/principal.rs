use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::ports::principal_repo::PrincipalRepo,
    domain::entities::principal::{
        NewPrincipal, Principal, PrincipalCredentials, PrincipalKind, Role,
    },
};

const COLUMNS: &str = "id, email, name, role, token_version, password_hash, created_at, updated_at";

// Principal row as stored in the db. Both tables share this shape.
#[derive(sqlx::FromRow, Debug)]
pub struct PrincipalDb {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub token_version: i64,
    pub password_hash: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl PrincipalDb {
    fn into_credentials(self, kind: PrincipalKind) -> AppResult<PrincipalCredentials> {
        let role: Role = self.role.parse().map_err(|e: String| {
            tracing::error!(principal_id = %self.id, role = %self.role, "Stored role is not recognized");
            AppError::Internal(e)
        })?;
        Ok(PrincipalCredentials {
            principal: Principal {
                id: self.id,
                kind,
                email: self.email,
                name: self.name,
                role,
                token_version: self.token_version,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            password_hash: self.password_hash,
        })
    }
}

fn table(kind: PrincipalKind) -> &'static str {
    match kind {
        PrincipalKind::User => "users",
        PrincipalKind::Seller => "sellers",
    }
}

#[async_trait]
impl PrincipalRepo for PostgresPersistence {
    async fn find_by_id(&self, kind: PrincipalKind, id: Uuid) -> AppResult<Option<Principal>> {
        let rec = sqlx::query_as::<_, PrincipalDb>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE id = $1",
            table(kind)
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        rec.map(|r| r.into_credentials(kind).map(|c| c.principal))
            .transpose()
    }

    async fn find_credentials_by_email(
        &self,
        kind: PrincipalKind,
        email: &str,
    ) -> AppResult<Option<PrincipalCredentials>> {
        let rec = sqlx::query_as::<_, PrincipalDb>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE email = $1",
            table(kind)
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        rec.map(|r| r.into_credentials(kind)).transpose()
    }

    async fn email_in_use(&self, email: &str) -> AppResult<bool> {
        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM principal_emails WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(in_use)
    }

    async fn create(&self, new: NewPrincipal) -> AppResult<Principal> {
        // The email claim and the principal row commit together; a concurrent
        // registration of the same email under either kind hits the primary key.
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO principal_emails (email, kind) VALUES ($1, $2)")
            .bind(&new.email)
            .bind(new.kind.as_str())
            .execute(&mut *tx)
            .await?;

        let id = Uuid::new_v4();
        let rec = sqlx::query_as::<_, PrincipalDb>(&format!(
            r#"INSERT INTO {} (id, email, name, role, password_hash)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {COLUMNS}"#,
            table(new.kind)
        ))
        .bind(id)
        .bind(&new.email)
        .bind(&new.name)
        .bind(new.role.as_str())
        .bind(&new.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(rec.into_credentials(new.kind)?.principal)
    }

    async fn get_token_version(&self, kind: PrincipalKind, id: Uuid) -> AppResult<Option<i64>> {
        let version = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT token_version FROM {} WHERE id = $1",
            table(kind)
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(version)
    }

    async fn increment_token_version(
        &self,
        kind: PrincipalKind,
        id: Uuid,
    ) -> AppResult<Option<i64>> {
        // Single statement; concurrent increments serialize on the row lock.
        let version = sqlx::query_scalar::<_, i64>(&format!(
            r#"UPDATE {}
               SET token_version = token_version + 1, updated_at = now()
               WHERE id = $1
               RETURNING token_version"#,
            table(kind)
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(version)
    }
}
