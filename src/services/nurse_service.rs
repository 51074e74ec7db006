use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::jwt::Claims,
    dto::nurse::{NurseAccessRequest, NurseRegisterForm, NurseUpdateRequest, UserQuery},
    errors::AppError,
    models::account::{Account, AccountFilter, AccountSnapshot, Role},
    password::hash_password,
    services::{is_numeric, listing, non_blank},
    state::NurseState,
    validation::{image_extension, is_nurse_nip, is_valid_name, is_valid_password, Checks},
};

fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found("user is not found"))
}

/// The account behind `id`, provided it is a nurse.
async fn find_nurse(state: &NurseState, id: Uuid) -> Result<Account, AppError> {
    state
        .accounts
        .find_by_id(id)
        .await?
        .filter(|a| a.role == Role::Nurse && Role::from_nip_prefix(&a.nip) == Some(Role::Nurse))
        .ok_or_else(|| AppError::not_found("user is not found"))
}

pub async fn register(state: &NurseState, form: NurseRegisterForm) -> Result<Account, AppError> {
    let nip = form.nip.trim().to_string();
    let name = form.name.trim().to_string();
    let image = form.identity_card_scan_img;

    Checks::new()
        .check(is_nurse_nip(&nip), "nip", "must be a valid nurse nip")
        .check(is_valid_name(&name), "name", "must be 5 to 50 characters")
        .check(
            image
                .as_ref()
                .is_some_and(|img| image_extension(&img.file_name).is_some()),
            "identityCardScanImg",
            "must be a jpg, jpeg or png image",
        )
        .finish()?;
    let image =
        image.ok_or_else(|| AppError::Validation("identityCardScanImg is required".into()))?;

    if state.accounts.find_by_nip(&nip).await?.is_some() {
        return Err(AppError::Conflict("user already exists".into()));
    }

    let image_url = state.images.upload(image).await?;

    let account = Account {
        id: Uuid::new_v4(),
        nip,
        name,
        role: Role::Nurse,
        password_hash: None,
        access: false,
        identity_card_scan_img: Some(image_url),
        refresh_token_hash: None,
        created_at: Utc::now(),
        updated_at: None,
    };
    state.accounts.create(&account).await?;

    tracing::info!(user_id = %account.id, nip = %account.nip, "nurse registered");
    Ok(account)
}

pub async fn update(
    state: &NurseState,
    raw_id: &str,
    req: NurseUpdateRequest,
) -> Result<(), AppError> {
    let nip = req.nip.to_string();
    let name = req.name.trim().to_string();

    Checks::new()
        .check(is_nurse_nip(&nip), "nip", "must be a valid nurse nip")
        .check(is_valid_name(&name), "name", "must be 5 to 50 characters")
        .finish()?;

    let id = parse_user_id(raw_id)?;
    if let Some(holder) = state.accounts.find_by_nip(&nip).await? {
        if holder.id != id {
            return Err(AppError::Conflict("nip already exists".into()));
        }
    }
    find_nurse(state, id).await?;

    if state.accounts.update_profile(id, &nip, &name).await? == 0 {
        return Err(AppError::not_found("user is not found"));
    }
    tracing::info!(user_id = %id, "nurse updated");
    Ok(())
}

pub async fn delete(state: &NurseState, raw_id: &str) -> Result<(), AppError> {
    let id = parse_user_id(raw_id)?;
    find_nurse(state, id).await?;

    if state.accounts.delete(id).await? == 0 {
        return Err(AppError::not_found("user is not found"));
    }
    tracing::info!(user_id = %id, "nurse deleted");
    Ok(())
}

/// Enables login for a nurse and announces it on the access queue.
pub async fn grant_access(
    state: &NurseState,
    raw_id: &str,
    req: NurseAccessRequest,
) -> Result<(), AppError> {
    Checks::new()
        .check(is_valid_password(&req.password), "password", "must be 5 to 33 characters")
        .finish()?;

    let id = parse_user_id(raw_id)?;
    find_nurse(state, id).await?;

    let password_hash = hash_password(&req.password).await?;
    let account = state
        .accounts
        .grant_access(id, &password_hash)
        .await?
        .ok_or_else(|| AppError::not_found("user is not found"))?;

    if let Err(e) = state.publisher.publish(&AccountSnapshot::from(&account)).await {
        tracing::warn!(user_id = %id, error = %e, "access granted but event was not published");
    }

    tracing::info!(user_id = %id, "nurse access granted");
    Ok(())
}

pub async fn list(
    state: &NurseState,
    caller: &Claims,
    query: UserQuery,
) -> Result<Vec<Account>, AppError> {
    let mut user_id = non_blank(query.user_id.as_ref())
        .map(|raw| {
            Uuid::parse_str(raw)
                .map_err(|_| AppError::Validation("userId must be a valid uuid".into()))
        })
        .transpose()?;
    if caller.role == Role::Nurse {
        user_id = Some(caller.subject()?);
    }

    let (page, order) = listing(
        query.limit.as_ref(),
        query.offset.as_ref(),
        query.created_at.as_ref(),
    );

    let filter = AccountFilter {
        user_id,
        name: non_blank(query.name.as_ref()).map(str::to_string),
        nip_prefix: non_blank(query.nip.as_ref())
            .filter(|n| is_numeric(n))
            .map(str::to_string),
        role: non_blank(query.role.as_ref()).and_then(|r| r.parse().ok()),
        page,
        order,
    };

    state.accounts.list(&filter).await
}
