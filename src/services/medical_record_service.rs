use uuid::Uuid;

use crate::{
    auth::jwt::Claims,
    dto::medical_record::{RecordQuery, RecordRequest},
    errors::AppError,
    models::medical_record::{MedicalRecord, MedicalRecordFilter, NewMedicalRecord},
    services::{identity_number_filter, is_numeric, listing, non_blank},
    state::RecordState,
    validation::{is_valid_clinical_text, is_valid_identity_number, Checks},
};

/// Resolves the creator and the patient through their own services, then
/// stores the record with a frozen creator snapshot.
pub async fn register(
    state: &RecordState,
    caller: &Claims,
    bearer: &str,
    req: &RecordRequest,
) -> Result<(), AppError> {
    let user_id = caller.subject()?;
    let created_by = state.nurses.find_user(user_id, bearer).await?;

    Checks::new()
        .check(
            is_valid_identity_number(req.identity_number),
            "identityNumber",
            "must be 16 digits",
        )
        .check(
            is_valid_clinical_text(&req.symptoms),
            "symptoms",
            "must be 1 to 2000 characters",
        )
        .check(
            is_valid_clinical_text(&req.medications),
            "medications",
            "must be 1 to 2000 characters",
        )
        .finish()?;

    if !state
        .patients
        .patient_exists(req.identity_number, bearer)
        .await?
    {
        return Err(AppError::not_found("identity number is not found"));
    }

    let record = NewMedicalRecord {
        identity_number: req.identity_number,
        symptoms: req.symptoms.clone(),
        medications: req.medications.clone(),
        created_by,
    };
    state.records.create(&record).await?;

    tracing::info!(
        identity_number = record.identity_number,
        created_by = %record.created_by.user_id,
        "medical record added"
    );
    Ok(())
}

pub async fn list(state: &RecordState, query: RecordQuery) -> Result<Vec<MedicalRecord>, AppError> {
    let identity_number = identity_number_filter(query.identity_number.as_ref())?;

    let created_by_user_id = non_blank(query.user_id.as_ref())
        .map(|raw| {
            Uuid::parse_str(raw)
                .map_err(|_| AppError::Validation("userId must be a valid uuid".into()))
        })
        .transpose()?;

    let (page, order) = listing(
        query.limit.as_ref(),
        query.offset.as_ref(),
        query.created_at.as_ref(),
    );

    let filter = MedicalRecordFilter {
        identity_number,
        created_by_nip: non_blank(query.nip.as_ref())
            .filter(|n| is_numeric(n))
            .map(str::to_string),
        created_by_user_id,
        page,
        order,
    };

    state.records.list(&filter).await
}
