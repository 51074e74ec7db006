pub mod auth;
pub mod medical_record;
pub mod nurse;
pub mod patient;

use serde::Serialize;

/// Success body shared by every service.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }

    pub fn success(data: T) -> Self {
        Self::new("success", data)
    }
}

/// Acknowledgement for mutations addressed by id.
#[derive(Debug, Serialize)]
pub struct IdMessage {
    pub id: String,
    pub message: String,
}
