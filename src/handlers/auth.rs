use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::AuthClaims,
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest, RenewRequest, RenewResponse},
        Envelope,
    },
    errors::AppError,
    handlers::AppJson,
    services::auth_service,
    state::AuthState,
};

pub async fn register(
    State(state): State<AuthState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<AuthResponse>>), AppError> {
    let out = auth_service::register(&state, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(
            "User registered successfully",
            AuthResponse::new(&out.account, out.tokens),
        )),
    ))
}

pub async fn login(
    State(state): State<AuthState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<Envelope<AuthResponse>>, AppError> {
    let out = auth_service::login(&state, req).await?;

    Ok(Json(Envelope::new(
        "User logged in successfully",
        AuthResponse::new(&out.account, out.tokens),
    )))
}

pub async fn nurse_login(
    State(state): State<AuthState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<Envelope<AuthResponse>>, AppError> {
    let out = auth_service::nurse_login(&state, req).await?;

    Ok(Json(Envelope::new(
        "User logged in successfully",
        AuthResponse::new(&out.account, out.tokens),
    )))
}

pub async fn renew(
    State(state): State<AuthState>,
    AuthClaims(claims): AuthClaims,
    AppJson(req): AppJson<RenewRequest>,
) -> Result<Json<RenewResponse>, AppError> {
    let tokens = auth_service::renew(&state, &claims, req).await?;

    Ok(Json(RenewResponse {
        message: "success".into(),
        tokens,
    }))
}
