#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use hospital_mgt::{
    auth::jwt::JwtKeys,
    errors::AppError,
    events::AccessGrantPublisher,
    imaging::{ImageHost, ImageUpload},
    models::account::AccountSnapshot,
    repositories::memory::MemoryStore,
    routes::{auth_router, nurse_router, patient_router},
    state::{AuthState, NurseState, PatientState},
};

pub const ADMIN_NIP: i64 = 6151202401001;
pub const ADMIN_PASSWORD: &str = "secret1";
pub const NURSE_NIP: &str = "3031202401002";
pub const NURSE_PASSWORD: &str = "nursepass";
pub const PATIENT_ID: &str = "3201234567890123";

#[derive(Default)]
pub struct StubImageHost {
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageHost for StubImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, AppError> {
        let url = format!("https://images.test/{}", image.public_id());
        self.uploads.lock().unwrap().push(url.clone());
        Ok(url)
    }
}

pub struct FailingImageHost;

#[async_trait]
impl ImageHost for FailingImageHost {
    async fn upload(&self, _image: ImageUpload) -> Result<String, AppError> {
        Err(AppError::Upstream("failed to upload image: host unreachable".into()))
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<AccountSnapshot>>,
}

#[async_trait]
impl AccessGrantPublisher for RecordingPublisher {
    async fn publish(&self, snapshot: &AccountSnapshot) -> Result<(), AppError> {
        self.events.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

pub struct FailingPublisher;

#[async_trait]
impl AccessGrantPublisher for FailingPublisher {
    async fn publish(&self, _snapshot: &AccountSnapshot) -> Result<(), AppError> {
        Err(AppError::Upstream("broker down".into()))
    }
}

pub struct Harness {
    pub keys: Arc<JwtKeys>,
    pub store: Arc<MemoryStore>,
    pub images: Arc<StubImageHost>,
    pub publisher: Arc<RecordingPublisher>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            keys: Arc::new(JwtKeys::new(b"integration-secret", 900, 3600)),
            store: Arc::new(MemoryStore::new()),
            images: Arc::new(StubImageHost::default()),
            publisher: Arc::new(RecordingPublisher::default()),
        }
    }

    pub fn auth_app(&self) -> Router {
        auth_router(AuthState {
            keys: self.keys.clone(),
            accounts: self.store.clone(),
        })
    }

    pub fn nurse_app(&self) -> Router {
        self.nurse_app_with(self.images.clone(), self.publisher.clone())
    }

    pub fn nurse_app_with(
        &self,
        images: Arc<dyn ImageHost>,
        publisher: Arc<dyn AccessGrantPublisher>,
    ) -> Router {
        nurse_router(NurseState {
            keys: self.keys.clone(),
            accounts: self.store.clone(),
            images,
            publisher,
        })
    }

    pub fn patient_app(&self) -> Router {
        self.patient_app_with(self.images.clone())
    }

    pub fn patient_app_with(&self, images: Arc<dyn ImageHost>) -> Router {
        patient_router(PatientState {
            keys: self.keys.clone(),
            patients: self.store.clone(),
            images,
        })
    }

    /// Registers the default admin and returns `(userId, accessToken)`.
    pub async fn register_admin(&self) -> (String, String) {
        let (status, body) = send(
            &self.auth_app(),
            json_request(
                Method::POST,
                "/v1/user/admin/register",
                None,
                json!({ "nip": ADMIN_NIP, "name": "Alice Admin", "password": ADMIN_PASSWORD }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["data"]["userId"].as_str().unwrap().to_string(),
            body["data"]["accessToken"].as_str().unwrap().to_string(),
        )
    }

    pub async fn register_nurse(&self, admin_token: &str, nip: &str, name: &str) -> String {
        let (status, body) = send(
            &self.nurse_app(),
            multipart_request(
                "/v1/user/nurse/register",
                Some(admin_token),
                &[("nip", nip), ("name", name)],
                Some(("card.png", &b"png-bytes"[..])),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["userId"].as_str().unwrap().to_string()
    }

    pub async fn grant_access(&self, admin_token: &str, user_id: &str, password: &str) -> StatusCode {
        let (status, _) = send(
            &self.nurse_app(),
            json_request(
                Method::POST,
                &format!("/v1/user/nurse/{user_id}/access"),
                Some(admin_token),
                json!({ "password": password }),
            ),
        )
        .await;
        status
    }

    pub async fn nurse_login(&self, nip: &str, password: &str) -> (StatusCode, Value) {
        send(
            &self.auth_app(),
            json_request(
                Method::POST,
                "/v1/user/nurse/login",
                None,
                json!({ "nip": nip.parse::<i64>().unwrap(), "password": password }),
            ),
        )
        .await
    }

    /// A nurse with access granted, returned as `(userId, accessToken)`.
    pub async fn active_nurse(&self, admin_token: &str) -> (String, String) {
        let user_id = self.register_nurse(admin_token, NURSE_NIP, "Nina Nurse").await;
        assert_eq!(
            self.grant_access(admin_token, &user_id, NURSE_PASSWORD).await,
            StatusCode::OK
        );
        let (status, body) = self.nurse_login(NURSE_NIP, NURSE_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (user_id, body["data"]["accessToken"].as_str().unwrap().to_string())
    }

    pub async fn register_patient(&self, token: &str, identity_number: &str) -> (StatusCode, Value) {
        send(
            &self.patient_app(),
            patient_form(token, identity_number, "+628123456789", "Budi Santoso"),
        )
        .await
    }
}

pub fn patient_form(token: &str, identity_number: &str, phone: &str, name: &str) -> Request<Body> {
    multipart_request(
        "/v1/medical/patient",
        Some(token),
        &[
            ("identityNumber", identity_number),
            ("phoneNumber", phone),
            ("name", name),
            ("birthDate", "1990-05-01T00:00:00Z"),
            ("gender", "male"),
        ],
        Some(("ktp.jpg", &b"jpg-bytes"[..])),
    )
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    req.body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method(Method::DELETE).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    req.body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    req.body(Body::from(body.to_string())).unwrap()
}

pub fn multipart_request(
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
) -> Request<Body> {
    const BOUNDARY: &str = "hospital-mgt-test-boundary";

    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"identityCardScanImg\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    req.body(Body::from(body)).unwrap()
}
