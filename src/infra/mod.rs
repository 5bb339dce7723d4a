use crate::{adapters::persistence::PostgresPersistence, infra::db::init_db, infra::error::InfraError};

pub mod app;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod password;
pub mod setup;

pub async fn postgres_persistence(database_url: &str) -> Result<PostgresPersistence, InfraError> {
    let pool = init_db(database_url).await?;
    let persistence = PostgresPersistence::new(pool);
    Ok(persistence)
}
