use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::{config::ImageHostConfig, errors::AppError};

/// An identity-document image received through multipart.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// `YYYYMMDD-<file stem>`, the public id the image is stored under.
    pub fn public_id(&self) -> String {
        let stem = self
            .file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.file_name);
        format!("{}-{}", Utc::now().format("%Y%m%d"), stem)
    }
}

/// Stores an image and returns the URL it can be fetched from.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<String, AppError>;
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Unsigned upload to a Cloudinary-style endpoint.
#[derive(Clone)]
pub struct HttpImageHost {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl HttpImageHost {
    pub fn new(cfg: &ImageHostConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            upload_url: cfg.upload_url.clone(),
            upload_preset: cfg.upload_preset.clone(),
        })
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, AppError> {
        let public_id = image.public_id();
        let mut file = Part::bytes(image.bytes).file_name(image.file_name);
        if let Some(ct) = &image.content_type {
            file = file
                .mime_str(ct)
                .map_err(|e| AppError::Validation(format!("invalid image content type: {e}")))?;
        }

        let form = Form::new()
            .part("file", file)
            .text("upload_preset", self.upload_preset.clone())
            .text("public_id", public_id.clone());

        let res = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("failed to upload image: {e}")))?;

        if !res.status().is_success() {
            return Err(AppError::Upstream(format!(
                "failed to upload image: image host answered {}",
                res.status()
            )));
        }

        let body: UploadResponse = res
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("failed to upload image: {e}")))?;

        tracing::debug!(%public_id, url = %body.secure_url, "image uploaded");
        Ok(body.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_id_is_dated_stem() {
        let image = ImageUpload {
            file_name: "card.front.png".into(),
            content_type: Some("image/png".into()),
            bytes: vec![1, 2, 3],
        };
        let id = image.public_id();
        assert!(id.ends_with("-card.front"));
        assert_eq!(id.len(), "YYYYMMDD-card.front".len());
    }
}
