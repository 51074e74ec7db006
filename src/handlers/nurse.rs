use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{AdminClaims, AuthClaims},
    dto::{
        nurse::{
            NurseAccessRequest, NurseRegisterForm, NurseRegisterResponse, NurseUpdateRequest,
            UserItem, UserQuery,
        },
        Envelope, IdMessage,
    },
    errors::AppError,
    handlers::{read_form, AppJson, AppQuery},
    services::nurse_service,
    state::NurseState,
};

pub async fn list_users(
    State(state): State<NurseState>,
    AuthClaims(claims): AuthClaims,
    AppQuery(query): AppQuery<UserQuery>,
) -> Result<Json<Envelope<Vec<UserItem>>>, AppError> {
    let users = nurse_service::list(&state, &claims, query).await?;
    Ok(Json(Envelope::success(users.iter().map(UserItem::from).collect())))
}

pub async fn register(
    State(state): State<NurseState>,
    AdminClaims(_): AdminClaims,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Envelope<NurseRegisterResponse>>), AppError> {
    let mut form = read_form(multipart).await?;
    let input = NurseRegisterForm {
        nip: form.take("nip"),
        name: form.take("name"),
        identity_card_scan_img: form.image.take(),
    };

    let account = nurse_service::register(&state, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(
            "Nurse registered successfully",
            NurseRegisterResponse {
                user_id: account.id,
                nip: account.nip_number(),
                name: account.name,
            },
        )),
    ))
}

pub async fn update(
    State(state): State<NurseState>,
    AdminClaims(_): AdminClaims,
    Path(user_id): Path<String>,
    AppJson(req): AppJson<NurseUpdateRequest>,
) -> Result<Json<IdMessage>, AppError> {
    nurse_service::update(&state, &user_id, req).await?;
    Ok(Json(IdMessage {
        id: user_id,
        message: "success updated nurse".into(),
    }))
}

pub async fn delete(
    State(state): State<NurseState>,
    AdminClaims(_): AdminClaims,
    Path(user_id): Path<String>,
) -> Result<Json<IdMessage>, AppError> {
    nurse_service::delete(&state, &user_id).await?;
    Ok(Json(IdMessage {
        id: user_id,
        message: "success deleted nurse".into(),
    }))
}

pub async fn grant_access(
    State(state): State<NurseState>,
    AdminClaims(_): AdminClaims,
    Path(user_id): Path<String>,
    AppJson(req): AppJson<NurseAccessRequest>,
) -> Result<Json<IdMessage>, AppError> {
    nurse_service::grant_access(&state, &user_id, req).await?;
    Ok(Json(IdMessage {
        id: user_id,
        message: "success add new access".into(),
    }))
}
