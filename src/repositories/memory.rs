//! In-process store behind the same repository traits. One `MemoryStore`
//! plays all three tables so record listings can join against patients.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{
        account::{Account, AccountFilter},
        listing::{Page, SortOrder},
        medical_record::{MedicalRecord, MedicalRecordFilter, NewMedicalRecord},
        patient::{Patient, PatientFilter},
    },
    repositories::{AccountRepository, MedicalRecordRepository, PatientRepository},
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: RwLock<Vec<Account>>,
    patients: RwLock<Vec<Patient>>,
    records: RwLock<Vec<(NewMedicalRecord, DateTime<Utc>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        read(&self.records).map(|r| r.len()).unwrap_or_default()
    }
}

fn poisoned() -> AppError {
    AppError::Internal("memory store lock poisoned".into())
}

fn read<T>(lock: &RwLock<T>) -> Result<std::sync::RwLockReadGuard<'_, T>, AppError> {
    lock.read().map_err(|_| poisoned())
}

fn write<T>(lock: &RwLock<T>) -> Result<std::sync::RwLockWriteGuard<'_, T>, AppError> {
    lock.write().map_err(|_| poisoned())
}

fn sort_and_page<T>(
    mut items: Vec<T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    order: SortOrder,
    page: Page,
) -> Vec<T> {
    items.sort_by_key(|item| created_at(item));
    if order == SortOrder::Desc {
        items.reverse();
    }
    items
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find_by_nip(&self, nip: &str) -> Result<Option<Account>, AppError> {
        Ok(read(&self.accounts)?.iter().find(|a| a.nip == nip).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(read(&self.accounts)?.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, account: &Account) -> Result<(), AppError> {
        let mut accounts = write(&self.accounts)?;
        if accounts.iter().any(|a| a.nip == account.nip) {
            return Err(AppError::Conflict("user already exists".into()));
        }
        accounts.push(account.clone());
        Ok(())
    }

    async fn update_refresh_token(
        &self,
        id: Uuid,
        refresh_token_hash: &str,
    ) -> Result<u64, AppError> {
        let mut accounts = write(&self.accounts)?;
        Ok(match accounts.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.refresh_token_hash = Some(refresh_token_hash.to_string());
                1
            }
            None => 0,
        })
    }

    async fn update_profile(&self, id: Uuid, nip: &str, name: &str) -> Result<u64, AppError> {
        let mut accounts = write(&self.accounts)?;
        if accounts.iter().any(|a| a.nip == nip && a.id != id) {
            return Err(AppError::Conflict("failed to update nurse: already exists".into()));
        }
        Ok(match accounts.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.nip = nip.to_string();
                a.name = name.to_string();
                a.updated_at = Some(Utc::now());
                1
            }
            None => 0,
        })
    }

    async fn grant_access(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<Account>, AppError> {
        let mut accounts = write(&self.accounts)?;
        Ok(accounts.iter_mut().find(|a| a.id == id).map(|a| {
            a.password_hash = Some(password_hash.to_string());
            a.access = true;
            a.updated_at = Some(Utc::now());
            a.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let mut accounts = write(&self.accounts)?;
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        Ok((before - accounts.len()) as u64)
    }

    async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, AppError> {
        let matching: Vec<Account> = read(&self.accounts)?
            .iter()
            .filter(|a| filter.user_id.is_none_or(|id| a.id == id))
            .filter(|a| {
                filter
                    .name
                    .as_deref()
                    .is_none_or(|n| contains_ignore_case(&a.name, n))
            })
            .filter(|a| {
                filter
                    .nip_prefix
                    .as_deref()
                    .is_none_or(|p| a.nip.starts_with(p))
            })
            .filter(|a| filter.role.is_none_or(|r| a.role == r))
            .cloned()
            .collect();

        Ok(sort_and_page(matching, |a: &Account| a.created_at, filter.order, filter.page))
    }
}

#[async_trait]
impl PatientRepository for MemoryStore {
    async fn exists(&self, identity_number: i64) -> Result<bool, AppError> {
        Ok(read(&self.patients)?
            .iter()
            .any(|p| p.identity_number == identity_number))
    }

    async fn create(&self, patient: &Patient) -> Result<(), AppError> {
        let mut patients = write(&self.patients)?;
        if patients
            .iter()
            .any(|p| p.identity_number == patient.identity_number)
        {
            return Err(AppError::Conflict(
                "patient with this identity number: already exists".into(),
            ));
        }
        patients.push(patient.clone());
        Ok(())
    }

    async fn list(&self, filter: &PatientFilter) -> Result<Vec<Patient>, AppError> {
        let matching: Vec<Patient> = read(&self.patients)?
            .iter()
            .filter(|p| filter.identity_number.is_none_or(|n| p.identity_number == n))
            .filter(|p| {
                filter
                    .name
                    .as_deref()
                    .is_none_or(|n| contains_ignore_case(&p.name, n))
            })
            .filter(|p| {
                filter
                    .phone_prefix
                    .as_deref()
                    .is_none_or(|prefix| p.phone_number.starts_with(&format!("+{prefix}")))
            })
            .cloned()
            .collect();

        Ok(sort_and_page(matching, |p: &Patient| p.created_at, filter.order, filter.page))
    }
}

#[async_trait]
impl MedicalRecordRepository for MemoryStore {
    async fn create(&self, record: &NewMedicalRecord) -> Result<(), AppError> {
        if !PatientRepository::exists(self, record.identity_number).await? {
            return Err(AppError::NotFound("patient is not found".into()));
        }
        write(&self.records)?.push((record.clone(), Utc::now()));
        Ok(())
    }

    async fn list(&self, filter: &MedicalRecordFilter) -> Result<Vec<MedicalRecord>, AppError> {
        let patients = read(&self.patients)?;
        let matching: Vec<MedicalRecord> = read(&self.records)?
            .iter()
            .filter(|(r, _)| filter.identity_number.is_none_or(|n| r.identity_number == n))
            .filter(|(r, _)| {
                filter
                    .created_by_nip
                    .as_deref()
                    .is_none_or(|nip| r.created_by.nip == nip)
            })
            .filter(|(r, _)| {
                filter
                    .created_by_user_id
                    .is_none_or(|id| r.created_by.user_id == id)
            })
            .filter_map(|(r, created_at)| {
                let patient = patients
                    .iter()
                    .find(|p| p.identity_number == r.identity_number)?;
                Some(MedicalRecord {
                    patient: patient.clone(),
                    symptoms: r.symptoms.clone(),
                    medications: r.medications.clone(),
                    created_by: r.created_by.clone(),
                    created_at: *created_at,
                })
            })
            .collect();

        Ok(sort_and_page(matching, |r: &MedicalRecord| r.created_at, filter.order, filter.page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::Role;
    use chrono::Duration;

    fn account(nip: &str, name: &str, age_minutes: i64) -> Account {
        Account {
            id: Uuid::new_v4(),
            nip: nip.into(),
            name: name.into(),
            role: Role::from_nip_prefix(nip).unwrap(),
            password_hash: None,
            access: false,
            identity_card_scan_img: None,
            refresh_token_hash: None,
            created_at: Utc::now() - Duration::minutes(age_minutes),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn duplicate_nip_conflicts() {
        let store = MemoryStore::new();
        AccountRepository::create(&store, &account("6151202401001", "Alice Admin", 0))
            .await
            .unwrap();
        let err = AccountRepository::create(&store, &account("6151202401001", "Other One", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_filters_sorts_and_pages() {
        let store = MemoryStore::new();
        for (nip, name, age) in [
            ("3031202401001", "Nina Nurse", 3),
            ("3031202401002", "Nora Nurse", 2),
            ("6151202401003", "Alice Admin", 1),
        ] {
            AccountRepository::create(&store, &account(nip, name, age))
                .await
                .unwrap();
        }

        let nurses = AccountRepository::list(
            &store,
            &AccountFilter {
                name: Some("NURSE".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(
            nurses.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            ["Nora Nurse", "Nina Nurse"]
        );

        let oldest = AccountRepository::list(
            &store,
            &AccountFilter {
                order: SortOrder::Asc,
                page: Page { limit: 1, offset: 0 },
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(oldest[0].nip, "3031202401001");

        let by_prefix = AccountRepository::list(
            &store,
            &AccountFilter {
                nip_prefix: Some("615".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_prefix.len(), 1);
    }

    #[tokio::test]
    async fn update_profile_rejects_a_taken_nip() {
        let store = MemoryStore::new();
        let a = account("3031202401001", "Nina Nurse", 0);
        let b = account("3031202401002", "Nora Nurse", 0);
        AccountRepository::create(&store, &a).await.unwrap();
        AccountRepository::create(&store, &b).await.unwrap();

        let err = store.update_profile(b.id, &a.nip, "Nora Nurse").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let missing = store
            .update_profile(Uuid::new_v4(), "3031202401009", "Ghost Nurse")
            .await
            .unwrap();
        assert_eq!(missing, 0);
    }
}
