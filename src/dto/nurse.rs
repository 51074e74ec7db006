use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{imaging::ImageUpload, models::account::Account};

/// Multipart fields of a nurse registration, still unvalidated.
#[derive(Debug, Default)]
pub struct NurseRegisterForm {
    pub nip: String,
    pub name: String,
    pub identity_card_scan_img: Option<ImageUpload>,
}

#[derive(Debug, Deserialize)]
pub struct NurseUpdateRequest {
    pub nip: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NurseAccessRequest {
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub nip: Option<String>,
    pub role: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NurseRegisterResponse {
    pub user_id: Uuid,
    pub nip: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserItem {
    pub user_id: Uuid,
    pub nip: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for UserItem {
    fn from(a: &Account) -> Self {
        Self {
            user_id: a.id,
            nip: a.nip_number(),
            name: a.name.clone(),
            created_at: a.created_at,
        }
    }
}
