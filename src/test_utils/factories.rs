//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::NaiveDateTime;
use secrecy::SecretString;
use time::Duration;
use uuid::Uuid;

use crate::{
    application::jwt::{KindProfile, TokenConfig},
    domain::entities::principal::{Principal, PrincipalCredentials, PrincipalKind, Role},
    infra::password::hash_password,
};

/// Password used by `with_test_password`.
pub const TEST_PASSWORD: &str = "correct-horse";

/// Create a test user (buyer) with sensible defaults.
pub fn create_test_user(overrides: impl FnOnce(&mut Principal)) -> Principal {
    let mut user = Principal {
        id: Uuid::new_v4(),
        kind: PrincipalKind::User,
        email: "buyer@example.com".to_string(),
        name: "Test Buyer".to_string(),
        role: Role::Buyer,
        token_version: 0,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut user);
    user
}

/// Create a test seller with sensible defaults.
pub fn create_test_seller(overrides: impl FnOnce(&mut Principal)) -> Principal {
    let mut seller = Principal {
        id: Uuid::new_v4(),
        kind: PrincipalKind::Seller,
        email: "seller@example.com".to_string(),
        name: "Test Seller".to_string(),
        role: Role::Seller,
        token_version: 0,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut seller);
    seller
}

/// Attach an argon2 hash of `password` to the principal.
pub fn with_test_password(principal: Principal, password: &str) -> PrincipalCredentials {
    PrincipalCredentials {
        principal,
        password_hash: hash_password(password).unwrap(),
    }
}

/// Fixed secrets and the default lifetimes (user access 15m, seller access 1d,
/// refresh 7d, verification 5m).
pub fn test_token_config() -> TokenConfig {
    TokenConfig {
        user: KindProfile {
            access_secret: SecretString::new("test-user-access".into()),
            refresh_secret: SecretString::new("test-user-refresh".into()),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            roles: vec![Role::Buyer],
        },
        seller: KindProfile {
            access_secret: SecretString::new("test-seller-access".into()),
            refresh_secret: SecretString::new("test-seller-refresh".into()),
            access_ttl: Duration::days(1),
            refresh_ttl: Duration::days(7),
            roles: vec![Role::Seller],
        },
        encryption_secret: SecretString::new("test-claims-encryption".into()),
        verification_secret: SecretString::new("test-email-verify".into()),
        verification_ttl: Duration::minutes(5),
    }
}

fn test_datetime() -> NaiveDateTime {
    chrono::DateTime::from_timestamp(1_700_000_000, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}
