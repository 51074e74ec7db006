//! Storage seams. Services only see these traits; Postgres backs them in
//! the binaries and `memory` (behind the `test-util` feature) backs them in tests.

pub mod accounts;
pub mod medical_records;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod patients;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{
        account::{Account, AccountFilter},
        medical_record::{MedicalRecord, MedicalRecordFilter, NewMedicalRecord},
        patient::{Patient, PatientFilter},
    },
};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_nip(&self, nip: &str) -> Result<Option<Account>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    /// Uniqueness check and insert run as one unit; a taken NIP is a Conflict.
    async fn create(&self, account: &Account) -> Result<(), AppError>;

    async fn update_refresh_token(&self, id: Uuid, refresh_token_hash: &str)
        -> Result<u64, AppError>;

    async fn update_profile(&self, id: Uuid, nip: &str, name: &str) -> Result<u64, AppError>;

    /// Sets the password, enables access and returns the updated account.
    async fn grant_access(&self, id: Uuid, password_hash: &str)
        -> Result<Option<Account>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<u64, AppError>;

    async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, AppError>;
}

#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn exists(&self, identity_number: i64) -> Result<bool, AppError>;

    async fn create(&self, patient: &Patient) -> Result<(), AppError>;

    async fn list(&self, filter: &PatientFilter) -> Result<Vec<Patient>, AppError>;
}

#[async_trait]
pub trait MedicalRecordRepository: Send + Sync {
    async fn create(&self, record: &NewMedicalRecord) -> Result<(), AppError>;

    /// Records joined with the demographics of the referenced patient.
    async fn list(&self, filter: &MedicalRecordFilter) -> Result<Vec<MedicalRecord>, AppError>;
}
