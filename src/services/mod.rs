pub mod auth_service;
pub mod medical_record_service;
pub mod nurse_service;
pub mod patient_service;

use crate::{
    errors::AppError,
    models::listing::{Page, SortOrder},
    validation::is_valid_identity_number,
};

/// Optional query value with blanks treated as absent.
pub(crate) fn non_blank(raw: Option<&String>) -> Option<&str> {
    raw.map(|s| s.trim()).filter(|s| !s.is_empty())
}

pub(crate) fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn listing(
    limit: Option<&String>,
    offset: Option<&String>,
    created_at: Option<&String>,
) -> (Page, SortOrder) {
    (
        Page::from_query(limit.map(String::as_str), offset.map(String::as_str)),
        SortOrder::from_query(created_at.map(String::as_str)),
    )
}

/// Numeric values must be a 16-digit identity number; anything else is ignored.
pub(crate) fn identity_number_filter(raw: Option<&String>) -> Result<Option<i64>, AppError> {
    match non_blank(raw) {
        Some(raw) if is_numeric(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|n| is_valid_identity_number(*n))
            .map(Some)
            .ok_or_else(|| AppError::Validation("identityNumber must be 16 digits".into())),
        _ => Ok(None),
    }
}
