use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    medical_record::{CreatorSnapshot, MedicalRecord},
    patient::{Gender, Patient},
};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    pub identity_number: i64,
    pub symptoms: String,
    pub medications: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    pub identity_number: Option<String>,
    #[serde(alias = "createdBy.nip")]
    pub nip: Option<String>,
    #[serde(alias = "createdBy.userId")]
    pub user_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDetail {
    pub identity_number: i64,
    pub phone_number: String,
    pub name: String,
    pub birth_date: DateTime<Utc>,
    pub gender: Gender,
    pub identity_card_scan_img: String,
}

impl From<&Patient> for IdentityDetail {
    fn from(p: &Patient) -> Self {
        Self {
            identity_number: p.identity_number,
            phone_number: p.phone_number.clone(),
            name: p.name.clone(),
            birth_date: p.birth_date,
            gender: p.gender,
            identity_card_scan_img: p.identity_card_scan_img.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordItem {
    pub identity_detail: IdentityDetail,
    pub symptoms: String,
    pub medications: String,
    pub created_by: CreatorSnapshot,
    pub created_at: DateTime<Utc>,
}

impl From<&MedicalRecord> for RecordItem {
    fn from(r: &MedicalRecord) -> Self {
        Self {
            identity_detail: IdentityDetail::from(&r.patient),
            symptoms: r.symptoms.clone(),
            medications: r.medications.clone(),
            created_by: r.created_by.clone(),
            created_at: r.created_at,
        }
    }
}
