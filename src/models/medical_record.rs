use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    listing::{Page, SortOrder},
    patient::Patient,
};

/// Who wrote the record, frozen at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSnapshot {
    pub nip: String,
    pub name: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMedicalRecord {
    pub identity_number: i64,
    pub symptoms: String,
    pub medications: String,
    pub created_by: CreatorSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MedicalRecord {
    pub patient: Patient,
    pub symptoms: String,
    pub medications: String,
    pub created_by: CreatorSnapshot,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct MedicalRecordFilter {
    pub identity_number: Option<i64>,
    pub created_by_nip: Option<String>,
    pub created_by_user_id: Option<Uuid>,
    pub page: Page,
    pub order: SortOrder,
}
