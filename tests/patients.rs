mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use hospital_mgt::repositories::PatientRepository;

#[tokio::test]
async fn register_then_duplicate_conflicts() {
    let h = Harness::new();
    let (_, admin) = h.register_admin().await;

    let (status, body) = h.register_patient(&admin, PATIENT_ID).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["identityNumber"], 3201234567890123_i64);
    assert_eq!(body["data"]["name"], "Budi Santoso");
    assert_eq!(h.images.uploads.lock().unwrap().len(), 1);

    let (status, body) = h.register_patient(&admin, PATIENT_ID).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");
    assert_eq!(h.images.uploads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn any_authenticated_role_may_register_but_anonymous_may_not() {
    let h = Harness::new();
    let (_, admin) = h.register_admin().await;
    let (_, nurse) = h.active_nurse(&admin).await;

    let (status, _) = h.register_patient(&nurse, PATIENT_ID).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&h.patient_app(), get("/v1/medical/patient", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn every_invalid_field_is_reported() {
    let h = Harness::new();
    let (_, admin) = h.register_admin().await;

    let (status, body) = send(
        &h.patient_app(),
        multipart_request(
            "/v1/medical/patient",
            Some(&admin),
            &[
                ("identityNumber", "12345"),
                ("phoneNumber", "08123456789"),
                ("name", "Bo"),
                ("birthDate", "01/05/1990"),
                ("gender", "other"),
            ],
            Some(("ktp.bmp", &b"bmp"[..])),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    for field in [
        "identityNumber",
        "phoneNumber",
        "name",
        "birthDate",
        "gender",
        "identityCardScanImg",
    ] {
        assert!(message.contains(field), "{field} missing from {message}");
    }
    assert!(h.images.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_upload_stores_nothing() {
    let h = Harness::new();
    let (_, admin) = h.register_admin().await;
    let app = h.patient_app_with(Arc::new(FailingImageHost));

    let (status, _) = send(
        &app,
        patient_form(&admin, PATIENT_ID, "+628123456789", "Budi Santoso"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!h.store.exists(3201234567890123).await.unwrap());
}

#[tokio::test]
async fn listing_filters_by_identity_name_and_phone() {
    let h = Harness::new();
    let (_, admin) = h.register_admin().await;
    let app = h.patient_app();

    for (id, phone, name) in [
        ("3201234567890001", "+628111111111", "Budi Santoso"),
        ("3201234567890002", "+628222222222", "Siti Aminah"),
        ("3201234567890003", "+628111999999", "Budi Hartono"),
    ] {
        let (status, _) = send(&app, patient_form(&admin, id, phone, name)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, get("/v1/medical/patient", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "success");
    let all = body["data"].as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["identityNumber"], 3201234567890003_i64);
    assert!(all[0].get("identityCardScanImg").is_none());

    let (_, body) = send(
        &app,
        get("/v1/medical/patient?identityNumber=3201234567890002", Some(&admin)),
    )
    .await;
    assert_eq!(body["data"][0]["name"], "Siti Aminah");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, get("/v1/medical/patient?name=budi", Some(&admin))).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, get("/v1/medical/patient?phoneNumber=62811", Some(&admin))).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, get("/v1/medical/patient?name=%25", Some(&admin))).await;
    assert_eq!(body["data"], json!([]));

    let (status, _) = send(
        &app,
        get("/v1/medical/patient?identityNumber=123", Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        get("/v1/medical/patient?identityNumber=abc&limit=1&offset=1&createdAt=asc", Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Siti Aminah");
}
