use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::tokens::TokenPair, models::account::Account};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub nip: i64,
    pub name: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub nip: i64,
    pub password: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RenewRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub nip: i64,
    pub name: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthResponse {
    pub fn new(account: &Account, tokens: TokenPair) -> Self {
        Self {
            user_id: account.id,
            nip: account.nip_number(),
            name: account.name.clone(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct RenewResponse {
    pub message: String,
    pub tokens: TokenPair,
}
