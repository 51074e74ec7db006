pub mod auth;
pub mod medical_record;
pub mod nurse;
pub mod patient;

use std::collections::HashMap;

use axum::extract::{
    multipart::MultipartRejection,
    rejection::{JsonRejection, QueryRejection},
    FromRequest, FromRequestParts, Multipart,
};

use crate::{errors::AppError, imaging::ImageUpload};

/// `Json` whose rejection is reported in the service's error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(r: JsonRejection) -> Self {
        AppError::Validation(r.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(r: QueryRejection) -> Self {
        AppError::Validation(r.body_text())
    }
}

pub(crate) const IMAGE_FIELD: &str = "identityCardScanImg";

/// Text fields by name plus the identity-card image, if one was attached.
#[derive(Debug, Default)]
pub(crate) struct FormData {
    fields: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

impl FormData {
    pub fn take(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }
}

pub(crate) async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<FormData, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let mut form = FormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            if !file_name.is_empty() && !bytes.is_empty() {
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
