use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::{AuthClaims, BearerToken},
    dto::{
        medical_record::{RecordItem, RecordQuery, RecordRequest},
        Envelope,
    },
    errors::AppError,
    handlers::{AppJson, AppQuery},
    services::medical_record_service,
    state::RecordState,
};

pub async fn register(
    State(state): State<RecordState>,
    AuthClaims(claims): AuthClaims,
    BearerToken(token): BearerToken,
    AppJson(req): AppJson<RecordRequest>,
) -> Result<(StatusCode, Json<Envelope<RecordRequest>>), AppError> {
    medical_record_service::register(&state, &claims, &token, &req).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("Medical record added successfully", req)),
    ))
}

pub async fn list(
    State(state): State<RecordState>,
    AuthClaims(_): AuthClaims,
    AppQuery(query): AppQuery<RecordQuery>,
) -> Result<Json<Envelope<Vec<RecordItem>>>, AppError> {
    let records = medical_record_service::list(&state, query).await?;
    Ok(Json(Envelope::success(
        records.iter().map(RecordItem::from).collect(),
    )))
}
