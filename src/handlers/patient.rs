use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::AuthClaims,
    dto::{
        patient::{PatientItem, PatientQuery, PatientRegisterForm, PatientRegisterResponse},
        Envelope,
    },
    errors::AppError,
    handlers::{read_form, AppQuery},
    services::patient_service,
    state::PatientState,
};

pub async fn register(
    State(state): State<PatientState>,
    AuthClaims(_): AuthClaims,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Envelope<PatientRegisterResponse>>), AppError> {
    let mut form = read_form(multipart).await?;
    let input = PatientRegisterForm {
        identity_number: form.take("identityNumber"),
        phone_number: form.take("phoneNumber"),
        name: form.take("name"),
        birth_date: form.take("birthDate"),
        gender: form.take("gender"),
        identity_card_scan_img: form.image.take(),
    };

    let patient = patient_service::register(&state, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(
            "Patient registered successfully",
            PatientRegisterResponse {
                identity_number: patient.identity_number,
                name: patient.name,
            },
        )),
    ))
}

pub async fn list(
    State(state): State<PatientState>,
    AuthClaims(_): AuthClaims,
    AppQuery(query): AppQuery<PatientQuery>,
) -> Result<Json<Envelope<Vec<PatientItem>>>, AppError> {
    let patients = patient_service::list(&state, query).await?;
    Ok(Json(Envelope::success(
        patients.iter().map(PatientItem::from).collect(),
    )))
}
