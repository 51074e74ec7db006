use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{config::JwtConfig, errors::AppError, models::account::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,

    pub typ: TokenKind,
    pub jti: String,
}

impl Claims {
    pub fn subject(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::unauthorized("invalid token subject"))
    }
}

/// Signing material shared by every service, plus the lifetimes used when issuing.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

impl JwtKeys {
    pub fn new(secret: &[u8], access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self::new(
            cfg.secret.as_bytes(),
            cfg.access_ttl_seconds,
            cfg.refresh_ttl_seconds,
        )
    }

    pub fn make_token(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("failed to generate new JWT token : {e}")))
    }

    /// Signature, expiry (no leeway) and kind of an access token.
    pub fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding, &strict_validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::unauthorized("token expired"),
                _ => AppError::unauthorized("invalid token"),
            })?
            .claims;

        if claims.typ != TokenKind::Access {
            return Err(AppError::unauthorized("invalid token"));
        }
        Ok(claims)
    }

    /// Signature and kind of a refresh token. Expiry is left to the caller,
    /// which treats an expired refresh token as an ended session.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = strict_validation();
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| AppError::Validation("invalid refresh token".into()))?
            .claims;

        if claims.typ != TokenKind::Refresh {
            return Err(AppError::Validation("invalid refresh token".into()));
        }
        Ok(claims)
    }
}

fn strict_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation
}

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

pub fn now_unix() -> usize {
    Utc::now().timestamp().max(0) as usize
}

fn new_claims(subject: Uuid, role: Role, typ: TokenKind, ttl_seconds: i64) -> Claims {
    let now = Utc::now();
    Claims {
        sub: subject.to_string(),
        role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::seconds(ttl_seconds)).timestamp().max(0) as usize,
        typ,
        jti: Uuid::new_v4().to_string(),
    }
}

pub fn new_access_claims(subject: Uuid, role: Role, ttl_seconds: i64) -> Claims {
    new_claims(subject, role, TokenKind::Access, ttl_seconds)
}

pub fn new_refresh_claims(subject: Uuid, role: Role, ttl_seconds: i64) -> Claims {
    new_claims(subject, role, TokenKind::Refresh, ttl_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new(b"test-secret", 60, 3600)
    }

    #[test]
    fn access_token_round_trips_subject_and_role() {
        let keys = keys();
        let id = Uuid::new_v4();
        let token = keys
            .make_token(&new_access_claims(id, Role::Nurse, 60))
            .unwrap();

        let claims = keys.verify_access(&token).unwrap();
        assert_eq!(claims.subject().unwrap(), id);
        assert_eq!(claims.role, Role::Nurse);
        assert!(claims.exp > now_unix());
    }

    #[test]
    fn expired_access_token_is_reported_as_expired() {
        let keys = keys();
        let token = keys
            .make_token(&new_access_claims(Uuid::new_v4(), Role::Admin, -30))
            .unwrap();

        match keys.verify_access(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "token expired"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let token = JwtKeys::new(b"someone-else", 60, 60)
            .make_token(&new_access_claims(Uuid::new_v4(), Role::Admin, 60))
            .unwrap();

        match keys().verify_access(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "invalid token"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let keys = keys();
        let id = Uuid::new_v4();
        let refresh = keys
            .make_token(&new_refresh_claims(id, Role::Admin, 3600))
            .unwrap();
        let access = keys
            .make_token(&new_access_claims(id, Role::Admin, 60))
            .unwrap();

        assert!(keys.verify_access(&refresh).is_err());
        assert!(matches!(
            keys.verify_refresh(&access),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn expired_refresh_token_still_decodes() {
        let keys = keys();
        let token = keys
            .make_token(&new_refresh_claims(Uuid::new_v4(), Role::Admin, -30))
            .unwrap();

        let claims = keys.verify_refresh(&token).unwrap();
        assert!(claims.exp < now_unix());
    }

    #[test]
    fn same_second_issues_are_distinct() {
        let keys = keys();
        let id = Uuid::new_v4();
        let a = keys.make_token(&new_access_claims(id, Role::Admin, 60)).unwrap();
        let b = keys.make_token(&new_access_claims(id, Role::Admin, 60)).unwrap();
        assert_ne!(a, b);
    }
}
