use chrono::Utc;

use crate::{
    dto::patient::{PatientQuery, PatientRegisterForm},
    errors::AppError,
    models::patient::{Gender, Patient, PatientFilter},
    services::{identity_number_filter, listing, non_blank},
    state::PatientState,
    validation::{
        image_extension, is_valid_identity_number, is_valid_name, is_valid_phone_number,
        parse_birth_date, Checks,
    },
};

pub async fn register(state: &PatientState, form: PatientRegisterForm) -> Result<Patient, AppError> {
    let identity_number = form.identity_number.trim().parse::<i64>().ok();
    let phone_number = form.phone_number.trim().to_string();
    let name = form.name.trim().to_string();
    let birth_date = parse_birth_date(form.birth_date.trim());
    let gender = Gender::parse(form.gender.trim());
    let image = form.identity_card_scan_img;

    Checks::new()
        .check(
            identity_number.is_some_and(is_valid_identity_number),
            "identityNumber",
            "must be 16 digits",
        )
        .check(
            is_valid_phone_number(&phone_number),
            "phoneNumber",
            "must start with +62 and be 10 to 15 characters",
        )
        .check(is_valid_name(&name), "name", "must be 5 to 50 characters")
        .check(birth_date.is_some(), "birthDate", "must be an ISO 8601 date time")
        .check(gender.is_some(), "gender", "must be male or female")
        .check(
            image
                .as_ref()
                .is_some_and(|img| image_extension(&img.file_name).is_some()),
            "identityCardScanImg",
            "must be a jpg, jpeg or png image",
        )
        .finish()?;

    let (Some(identity_number), Some(birth_date), Some(gender), Some(image)) =
        (identity_number, birth_date, gender, image)
    else {
        return Err(AppError::Validation("payload request doesn't meet requirement".into()));
    };

    if state.patients.exists(identity_number).await? {
        return Err(AppError::Conflict(
            "patient with identity number provided is already exists".into(),
        ));
    }

    let identity_card_scan_img = state.images.upload(image).await?;

    let patient = Patient {
        identity_number,
        phone_number,
        name,
        birth_date,
        gender,
        identity_card_scan_img,
        created_at: Utc::now(),
    };
    state.patients.create(&patient).await?;

    tracing::info!(identity_number, "patient registered");
    Ok(patient)
}

pub async fn list(state: &PatientState, query: PatientQuery) -> Result<Vec<Patient>, AppError> {
    let identity_number = identity_number_filter(query.identity_number.as_ref())?;

    let phone_prefix = non_blank(query.phone_number.as_ref())
        .map(|p| p.trim_start_matches('+'))
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let (page, order) = listing(
        query.limit.as_ref(),
        query.offset.as_ref(),
        query.created_at.as_ref(),
    );

    let filter = PatientFilter {
        identity_number,
        name: non_blank(query.name.as_ref()).map(str::to_string),
        phone_prefix,
        page,
        order,
    };

    state.patients.list(&filter).await
}
