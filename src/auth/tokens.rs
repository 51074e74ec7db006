use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::jwt::{new_access_claims, new_refresh_claims, sha256_hex, JwtKeys},
    errors::AppError,
    models::account::Role,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// A freshly signed pair plus the digest that must replace the stored one.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub pair: TokenPair,
    pub refresh_token_hash: String,
}

pub fn issue_tokens(keys: &JwtKeys, user_id: Uuid, role: Role) -> Result<IssuedTokens, AppError> {
    let access_claims = new_access_claims(user_id, role, keys.access_ttl_seconds);
    let refresh_claims = new_refresh_claims(user_id, role, keys.refresh_ttl_seconds);

    let access_token = keys.make_token(&access_claims)?;
    let refresh_token = keys.make_token(&refresh_claims)?;

    Ok(IssuedTokens {
        refresh_token_hash: sha256_hex(&refresh_token),
        pair: TokenPair {
            access_token,
            refresh_token,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_refresh_token() {
        let keys = JwtKeys::new(b"secret", 60, 600);
        let issued = issue_tokens(&keys, Uuid::new_v4(), Role::Admin).unwrap();
        assert_eq!(issued.refresh_token_hash, sha256_hex(&issued.pair.refresh_token));
        assert_ne!(issued.pair.access_token, issued.pair.refresh_token);
    }
}
