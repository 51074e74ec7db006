use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    auth::jwt::JwtKeys,
    config::{AmqpConfig, ConfigError, DbConfig, ImageHostConfig, JwtConfig, UpstreamConfig},
    db::{self, DbInitError},
    errors::AppError,
    events::{AccessGrantPublisher, AmqpPublisher},
    imaging::{HttpImageHost, ImageHost},
    repositories::{
        accounts::PgAccountRepository, medical_records::PgMedicalRecordRepository,
        patients::PgPatientRepository, AccountRepository, MedicalRecordRepository,
        PatientRepository,
    },
    upstream::{HttpDirectory, NurseDirectory, PatientDirectory},
};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbInitError),

    #[error(transparent)]
    Client(#[from] AppError),
}

fn keys_from_env() -> Result<Arc<JwtKeys>, ConfigError> {
    Ok(Arc::new(JwtKeys::from_config(&JwtConfig::from_env()?)))
}

#[derive(Clone, FromRef)]
pub struct AuthState {
    pub keys: Arc<JwtKeys>,
    pub accounts: Arc<dyn AccountRepository>,
}

impl AuthState {
    pub async fn from_env() -> Result<Self, StartupError> {
        let pool = db::connect(&DbConfig::from_env()?).await?;
        Ok(Self {
            keys: keys_from_env()?,
            accounts: Arc::new(PgAccountRepository::new(pool)),
        })
    }
}

#[derive(Clone, FromRef)]
pub struct NurseState {
    pub keys: Arc<JwtKeys>,
    pub accounts: Arc<dyn AccountRepository>,
    pub images: Arc<dyn ImageHost>,
    pub publisher: Arc<dyn AccessGrantPublisher>,
}

impl NurseState {
    pub async fn from_env() -> Result<Self, StartupError> {
        let pool = db::connect(&DbConfig::from_env()?).await?;
        Ok(Self {
            keys: keys_from_env()?,
            accounts: Arc::new(PgAccountRepository::new(pool)),
            images: Arc::new(HttpImageHost::new(&ImageHostConfig::from_env()?)?),
            publisher: Arc::new(AmqpPublisher::new(&AmqpConfig::from_env()?)),
        })
    }
}

#[derive(Clone, FromRef)]
pub struct PatientState {
    pub keys: Arc<JwtKeys>,
    pub patients: Arc<dyn PatientRepository>,
    pub images: Arc<dyn ImageHost>,
}

impl PatientState {
    pub async fn from_env() -> Result<Self, StartupError> {
        let pool = db::connect(&DbConfig::from_env()?).await?;
        Ok(Self {
            keys: keys_from_env()?,
            patients: Arc::new(PgPatientRepository::new(pool)),
            images: Arc::new(HttpImageHost::new(&ImageHostConfig::from_env()?)?),
        })
    }
}

#[derive(Clone, FromRef)]
pub struct RecordState {
    pub keys: Arc<JwtKeys>,
    pub records: Arc<dyn MedicalRecordRepository>,
    pub nurses: Arc<dyn NurseDirectory>,
    pub patients: Arc<dyn PatientDirectory>,
}

impl RecordState {
    pub async fn from_env() -> Result<Self, StartupError> {
        let pool = db::connect(&DbConfig::from_env()?).await?;
        let directory = Arc::new(HttpDirectory::new(&UpstreamConfig::from_env()?)?);
        Ok(Self {
            keys: keys_from_env()?,
            records: Arc::new(PgMedicalRecordRepository::new(pool)),
            nurses: directory.clone(),
            patients: directory,
        })
    }
}
