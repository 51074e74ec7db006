use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    imaging::ImageUpload,
    models::patient::{Gender, Patient},
};

#[derive(Debug, Default)]
pub struct PatientRegisterForm {
    pub identity_number: String,
    pub phone_number: String,
    pub name: String,
    pub birth_date: String,
    pub gender: String,
    pub identity_card_scan_img: Option<ImageUpload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientQuery {
    pub identity_number: Option<String>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRegisterResponse {
    pub identity_number: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientItem {
    pub identity_number: i64,
    pub phone_number: String,
    pub name: String,
    pub birth_date: DateTime<Utc>,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
}

impl From<&Patient> for PatientItem {
    fn from(p: &Patient) -> Self {
        Self {
            identity_number: p.identity_number,
            phone_number: p.phone_number.clone(),
            name: p.name.clone(),
            birth_date: p.birth_date,
            gender: p.gender,
            created_at: p.created_at,
        }
    }
}
