use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::ServerConfig,
    errors::AppError,
    handlers::{auth, medical_record, nurse, patient},
    state::{AuthState, NurseState, PatientState, RecordState},
};

const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

async fn fallback() -> AppError {
    AppError::not_found("resource not found")
}

pub fn auth_router(state: AuthState) -> Router {
    let user = Router::new()
        .route("/admin/register", post(auth::register))
        .route("/admin/login", post(auth::login))
        .route("/nurse/login", post(auth::nurse_login))
        .route("/token/renew", post(auth::renew));

    Router::new()
        .nest("/v1/user", user)
        .fallback(fallback)
        .with_state(state)
}

pub fn nurse_router(state: NurseState) -> Router {
    let user = Router::new()
        .route("/", get(nurse::list_users))
        .route("/nurse/register", post(nurse::register))
        .route("/nurse/{user_id}", put(nurse::update).delete(nurse::delete))
        .route("/nurse/{user_id}/access", post(nurse::grant_access));

    Router::new()
        .nest("/v1/user", user)
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .with_state(state)
}

pub fn patient_router(state: PatientState) -> Router {
    Router::new()
        .route(
            "/v1/medical/patient",
            post(patient::register).get(patient::list),
        )
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .with_state(state)
}

pub fn record_router(state: RecordState) -> Router {
    Router::new()
        .route(
            "/v1/medical/record",
            post(medical_record::register).get(medical_record::list),
        )
        .fallback(fallback)
        .with_state(state)
}

async fn deadline(State(limit): State<Duration>, req: Request, next: Next) -> Response {
    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(res) => res,
        Err(_) => AppError::Timeout("request took too long".into()).into_response(),
    }
}

/// Request timeout, CORS and HTTP tracing shared by every service.
pub fn with_http_layers(router: Router, read_timeout: Duration) -> Router {
    router
        .layer(middleware::from_fn_with_state(read_timeout, deadline))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(name: &str, router: Router, cfg: &ServerConfig) -> std::io::Result<()> {
    let addr = cfg.bind_addr().map_err(std::io::Error::other)?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(service = name, %addr, "listening");

    axum::serve(listener, with_http_layers(router, cfg.read_timeout))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
