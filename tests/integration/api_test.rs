//! Role-scoped endpoints over reqwest

use mockito::Matcher;

use medportal_lib::api::models::PrescriptionFill;
use medportal_lib::{PortalError, Route};

use crate::harness::TestHarness;

#[tokio::test]
async fn test_pharmacist_fill_carries_bearer_token() {
    let mut harness = TestHarness::new().await;
    harness.store_token("pharm-token").await;
    let _verify = harness.mock_verify("pharm-token", "PHARMACIST").await;
    let fill = harness
        .server
        .mock("POST", "/pharmacist/prescriptions/5/fill")
        .match_header("authorization", "Bearer pharm-token")
        .match_body(Matcher::PartialJson(
            serde_json::json!({ "quantity_dispensed": "30 tablets" }),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "id": 5, "patient_id": 2, "doctor_id": 3,
                "medication_name": "Amoxicillin", "dosage": "500mg",
                "frequency": "3x daily", "duration": "7 days",
                "is_filled": true, "times_filled": 1, "max_refills": 2
            })
            .to_string(),
        )
        .create_async()
        .await;

    let portal = harness.portal();
    portal.initialize().await.unwrap();

    let prescription = portal
        .api()
        .fill_prescription(
            5,
            &PrescriptionFill {
                quantity_dispensed: "30 tablets".into(),
                notes: None,
            },
        )
        .await
        .unwrap();

    fill.assert_async().await;
    assert!(prescription.is_filled);
    assert_eq!(prescription.times_filled, 1);
}

#[tokio::test]
async fn test_lab_file_download() {
    let mut harness = TestHarness::new().await;
    harness.store_token("lab-token").await;
    let _file = harness
        .server
        .mock("GET", "/bio-analyst/tests/3/file")
        .match_header("authorization", "Bearer lab-token")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_header("content-disposition", "attachment; filename=\"blood-panel.pdf\"")
        .with_body("%PDF-1.7 fake")
        .create_async()
        .await;

    let portal = harness.portal();
    let file = portal.api().lab_test_file(3).await.unwrap();

    assert_eq!(file.filename.as_deref(), Some("blood-panel.pdf"));
    assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(&file.contents[..], b"%PDF-1.7 fake");
}

#[tokio::test]
async fn test_missing_resource_keeps_server_detail() {
    let mut harness = TestHarness::new().await;
    harness.store_token("doc-token").await;
    let _missing = harness
        .server
        .mock("GET", "/doctor/patients/99")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail":"Patient not found"}"#)
        .create_async()
        .await;

    let portal = harness.portal();
    let err = portal.api().doctor_patient(99).await.unwrap_err();
    match err {
        PortalError::Api { status, detail } => {
            assert_eq!(status, 404);
            assert_eq!(detail, "Patient not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_new_patient_is_sent_to_profile_setup() {
    let mut harness = TestHarness::new().await;
    harness.store_token("pat-token").await;
    let _verify = harness.mock_verify("pat-token", "PATIENT").await;
    let _status = harness
        .server
        .mock("GET", "/patient/profile/status")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"has_profile":false,"user_id":8,"email":"p@x.com","full_name":"P X"}"#)
        .create_async()
        .await;

    let portal = harness.portal();
    portal.initialize().await.unwrap();

    let outcome = portal.open("/").await.unwrap();
    assert_eq!(outcome.route(), Some(Route::PatientProfile));
    assert_eq!(outcome.final_path(), Some("/patient/profile"));
}

#[tokio::test]
async fn test_home_renders_when_profile_status_is_missing() {
    let mut harness = TestHarness::new().await;
    harness.store_token("pat-token").await;
    let _verify = harness.mock_verify("pat-token", "PATIENT").await;
    let _status = harness
        .server
        .mock("GET", "/patient/profile/status")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail":"Not Found"}"#)
        .create_async()
        .await;

    let portal = harness.portal();
    portal.initialize().await.unwrap();

    let outcome = portal.open("/dashboard").await.unwrap();
    assert_eq!(outcome.route(), Some(Route::PatientHome));
    assert_eq!(outcome.final_path(), Some("/patient"));
}
