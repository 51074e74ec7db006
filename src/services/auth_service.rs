use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::{
        jwt::{now_unix, sha256_hex, Claims},
        tokens::{issue_tokens, TokenPair},
    },
    dto::auth::{LoginRequest, RegisterRequest, RenewRequest},
    errors::AppError,
    models::account::{Account, Role},
    password::{hash_password, verify_password},
    state::AuthState,
    validation::{is_admin_nip, is_valid_name, is_valid_password, nip_role, Checks},
};

pub struct AuthOutput {
    pub account: Account,
    pub tokens: TokenPair,
}

pub async fn register(state: &AuthState, req: RegisterRequest) -> Result<AuthOutput, AppError> {
    let nip = req.nip.to_string();
    let name = req.name.trim().to_string();

    Checks::new()
        .check(is_admin_nip(&nip), "nip", "must be a valid admin nip")
        .check(is_valid_name(&name), "name", "must be 5 to 50 characters")
        .check(is_valid_password(&req.password), "password", "must be 5 to 33 characters")
        .finish()?;
    let role = nip_role(&nip).ok_or_else(|| AppError::Validation("invalid nip".into()))?;

    if state.accounts.find_by_nip(&nip).await?.is_some() {
        return Err(AppError::Conflict("user already exists".into()));
    }

    let password_hash = hash_password(&req.password).await?;
    let id = Uuid::new_v4();
    let issued = issue_tokens(&state.keys, id, role)?;

    let account = Account {
        id,
        nip,
        name,
        role,
        password_hash: Some(password_hash),
        access: true,
        identity_card_scan_img: None,
        refresh_token_hash: Some(issued.refresh_token_hash),
        created_at: Utc::now(),
        updated_at: None,
    };
    state.accounts.create(&account).await?;

    tracing::info!(user_id = %account.id, nip = %account.nip, "admin registered");
    Ok(AuthOutput {
        account,
        tokens: issued.pair,
    })
}

pub async fn login(state: &AuthState, req: LoginRequest) -> Result<AuthOutput, AppError> {
    login_as(state, req, Role::Admin).await
}

pub async fn nurse_login(state: &AuthState, req: LoginRequest) -> Result<AuthOutput, AppError> {
    login_as(state, req, Role::Nurse).await
}

async fn login_as(state: &AuthState, req: LoginRequest, role: Role) -> Result<AuthOutput, AppError> {
    let nip = req.nip.to_string();

    // a NIP of the other role looks exactly like an unknown one
    if Role::from_nip_prefix(&nip) != Some(role) {
        return Err(AppError::not_found("user is not found"));
    }

    Checks::new()
        .check(nip_role(&nip) == Some(role), "nip", "must be a valid nip")
        .check(is_valid_password(&req.password), "password", "must be 5 to 33 characters")
        .finish()?;

    let account = state
        .accounts
        .find_by_nip(&nip)
        .await?
        .filter(|a| a.role == role)
        .ok_or_else(|| AppError::not_found("user is not found"))?;

    if role == Role::Nurse && !account.can_log_in() {
        return Err(AppError::Validation("user doesn't have access".into()));
    }
    let Some(hash) = account.password_hash.as_deref() else {
        return Err(AppError::Validation("user doesn't have access".into()));
    };
    if !verify_password(&req.password, hash).await? {
        return Err(AppError::Validation("wrong password".into()));
    }

    let issued = issue_tokens(&state.keys, account.id, account.role)?;
    if state
        .accounts
        .update_refresh_token(account.id, &issued.refresh_token_hash)
        .await?
        == 0
    {
        return Err(AppError::not_found("user is not found"));
    }

    tracing::info!(user_id = %account.id, role = %role, "user logged in");
    Ok(AuthOutput {
        account,
        tokens: issued.pair,
    })
}

/// Rotates the pair. `claims` come from the still valid access token.
pub async fn renew(
    state: &AuthState,
    claims: &Claims,
    req: RenewRequest,
) -> Result<TokenPair, AppError> {
    let user_id = claims.subject()?;

    let refresh = state.keys.verify_refresh(&req.refresh_token)?;
    if refresh.sub != claims.sub {
        return Err(AppError::unauthorized("refresh token does not match session"));
    }
    if refresh.exp <= now_unix() {
        return Err(AppError::unauthorized("session ended"));
    }

    let account = state
        .accounts
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user is not found"))?;

    let presented = sha256_hex(&req.refresh_token);
    if account.refresh_token_hash.as_deref() != Some(presented.as_str()) {
        return Err(AppError::unauthorized("refresh token is no longer valid"));
    }

    let issued = issue_tokens(&state.keys, account.id, account.role)?;
    if state
        .accounts
        .update_refresh_token(account.id, &issued.refresh_token_hash)
        .await?
        == 0
    {
        return Err(AppError::not_found("user is not found"));
    }

    tracing::debug!(user_id = %account.id, "tokens renewed");
    Ok(issued.pair)
}
