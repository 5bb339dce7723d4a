//! Claims codec: projects a principal into the JSON document that gets
//! encrypted into a token payload, and parses it back.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{
    principal::{Principal, Role},
    token_kind::TokenKind,
};

/// Identity fields carried inside a token.
///
/// Access claims always carry `role`; refresh claims never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub principal_id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub token_version: i64,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("claims could not be serialized: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("claims document is malformed: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("token version must be non-negative")]
    NegativeVersion,
}

impl Claims {
    pub fn for_principal(principal: &Principal, token_kind: TokenKind) -> Self {
        let role = match token_kind {
            TokenKind::Access => Some(principal.role),
            TokenKind::Refresh => None,
        };
        Self {
            principal_id: principal.id,
            email: principal.email.clone(),
            role,
            token_version: principal.token_version,
        }
    }
}

pub fn encode(principal: &Principal, token_kind: TokenKind) -> Result<String, CodecError> {
    serde_json::to_string(&Claims::for_principal(principal, token_kind)).map_err(CodecError::Encode)
}

pub fn decode(plaintext: &str) -> Result<Claims, CodecError> {
    let claims: Claims = serde_json::from_str(plaintext).map_err(CodecError::Malformed)?;
    if claims.token_version < 0 {
        return Err(CodecError::NegativeVersion);
    }
    Ok(claims)
}
