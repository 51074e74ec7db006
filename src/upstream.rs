//! Calls from the medical record service to the nurse and patient services.
//! The caller's bearer token is forwarded unchanged.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use uuid::Uuid;

use crate::{config::UpstreamConfig, errors::AppError, models::medical_record::CreatorSnapshot};

#[async_trait]
pub trait NurseDirectory: Send + Sync {
    /// NotFound when the nurse service has no such user.
    async fn find_user(&self, user_id: Uuid, bearer: &str) -> Result<CreatorSnapshot, AppError>;
}

#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn patient_exists(&self, identity_number: i64, bearer: &str) -> Result<bool, AppError>;
}

#[derive(Deserialize)]
struct Listing<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteUser {
    user_id: Uuid,
    nip: i64,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemotePatient {
    identity_number: i64,
}

#[derive(Clone)]
pub struct HttpDirectory {
    client: reqwest::Client,
    nurse_service_url: String,
    patient_service_url: String,
}

impl HttpDirectory {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            nurse_service_url: cfg.nurse_service_url.trim_end_matches('/').to_string(),
            patient_service_url: cfg.patient_service_url.trim_end_matches('/').to_string(),
        })
    }

    /// `Ok(None)` for a remote 404; every other non-2xx is an upstream failure.
    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: &str,
    ) -> Result<Option<Vec<T>>, AppError> {
        let res = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("request to {url} failed: {e}")))?;

        match res.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            s if !s.is_success() => {
                return Err(AppError::Upstream(format!("{url} answered {s}")));
            }
            _ => {}
        }

        let listing: Listing<T> = res
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("unexpected body from {url}: {e}")))?;
        Ok(Some(listing.data))
    }
}

#[async_trait]
impl NurseDirectory for HttpDirectory {
    async fn find_user(&self, user_id: Uuid, bearer: &str) -> Result<CreatorSnapshot, AppError> {
        let url = format!("{}/v1/user", self.nurse_service_url);
        let users: Vec<RemoteUser> = self
            .fetch(&url, &[("userId", user_id.to_string())], bearer)
            .await?
            .unwrap_or_default();

        users
            .into_iter()
            .find(|u| u.user_id == user_id)
            .map(|u| CreatorSnapshot {
                nip: u.nip.to_string(),
                name: u.name,
                user_id: u.user_id,
            })
            .ok_or_else(|| AppError::not_found("user is not found"))
    }
}

#[async_trait]
impl PatientDirectory for HttpDirectory {
    async fn patient_exists(&self, identity_number: i64, bearer: &str) -> Result<bool, AppError> {
        let url = format!("{}/v1/medical/patient", self.patient_service_url);
        let patients: Vec<RemotePatient> = self
            .fetch(&url, &[("identityNumber", identity_number.to_string())], bearer)
            .await?
            .unwrap_or_default();

        Ok(patients
            .iter()
            .any(|p| p.identity_number == identity_number))
    }
}
