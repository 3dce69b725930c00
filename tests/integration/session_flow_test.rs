//! Session lifecycle against a real HTTP stack

use mockito::Matcher;

use medportal_lib::routing::{can_access, Access};
use medportal_lib::{Credentials, PortalError, Role, Route, SessionSnapshot};

use crate::harness::TestHarness;

#[tokio::test]
async fn test_empty_store_stays_anonymous_without_calls() {
    let mut harness = TestHarness::new().await;
    let untouched = harness
        .server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let portal = harness.portal();
    let snapshot = portal.initialize().await.unwrap();
    assert_eq!(snapshot, SessionSnapshot::anonymous());

    let outcome = portal.navigate("/doctor").unwrap();
    assert_eq!(outcome.redirects, vec!["/login".to_string()]);
    assert_eq!(outcome.route(), Some(Route::Login));

    untouched.assert_async().await;
}

#[tokio::test]
async fn test_stored_doctor_token_routes_by_role() {
    let mut harness = TestHarness::new().await;
    harness.store_token("doc-token").await;
    let verify = harness.mock_verify("doc-token", "DOCTOR").await;

    let portal = harness.portal();
    let snapshot = portal.initialize().await.unwrap();
    assert_eq!(snapshot, SessionSnapshot::authenticated(Role::Doctor));
    verify.assert_async().await;

    let outcome = portal.navigate("/patient").unwrap();
    assert_eq!(outcome.redirects.first().map(String::as_str), Some("/"));
    assert_eq!(outcome.route(), Some(Route::DoctorHome));

    assert_eq!(
        portal.navigate("/doctor").unwrap().route(),
        Some(Route::DoctorHome)
    );
}

#[tokio::test]
async fn test_login_then_reload_keeps_role() {
    let mut harness = TestHarness::new().await;
    let login = harness.mock_login("fresh-token").await;
    let _verify = harness.mock_verify("fresh-token", "patient").await;

    let portal = harness.portal();
    portal.initialize().await.unwrap();
    let role = portal
        .login(&Credentials::new("pat@example.com", "pw"))
        .await
        .unwrap();
    assert_eq!(role, Role::Patient);
    login.assert_async().await;
    assert_eq!(harness.stored_token().await.as_deref(), Some("fresh-token"));
    drop(portal);

    let reloaded = harness.portal();
    let snapshot = reloaded.initialize().await.unwrap();
    assert_eq!(snapshot, SessionSnapshot::authenticated(Role::Patient));
}

#[tokio::test]
async fn test_login_as_pharmacist_grants_access_immediately() {
    let mut harness = TestHarness::new().await;
    let login = harness
        .server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".into(), "a@b.com".into()),
            Matcher::UrlEncoded("password".into(), "pw".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"pharm-token","token_type":"bearer"}"#)
        .create_async()
        .await;
    let _verify = harness.mock_verify("pharm-token", "PHARMACIST").await;

    let portal = harness.portal();
    portal.initialize().await.unwrap();
    portal
        .login(&Credentials::new("a@b.com", "pw"))
        .await
        .unwrap();

    login.assert_async().await;
    assert_eq!(
        can_access(&portal.snapshot(), Some(Role::Pharmacist)),
        Access::Allow
    );
}

#[tokio::test]
async fn test_rejected_token_is_cleared() {
    let mut harness = TestHarness::new().await;
    harness.store_token("expired").await;
    let verify = harness.mock_verify_rejected().await;

    let portal = harness.portal();
    let snapshot = portal.initialize().await.unwrap();
    assert_eq!(snapshot, SessionSnapshot::anonymous());
    verify.assert_async().await;
    assert_eq!(harness.stored_token().await, None);
}

#[tokio::test]
async fn test_wrong_password_is_surfaced() {
    let mut harness = TestHarness::new().await;
    let _login = harness
        .server
        .mock("POST", "/token")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail":"the email or the password are wrong "}"#)
        .create_async()
        .await;

    let portal = harness.portal();
    portal.initialize().await.unwrap();
    let err = portal
        .login(&Credentials::new("a@b.com", "nope"))
        .await
        .unwrap_err();

    assert!(matches!(err, PortalError::Auth { .. }));
    assert_eq!(err.user_message(), "the email or the password are wrong ");
    assert_eq!(portal.snapshot(), SessionSnapshot::anonymous());
    assert_eq!(harness.stored_token().await, None);
}

#[tokio::test]
async fn test_unreachable_service_falls_back_to_anonymous() {
    let harness = TestHarness::new().await;
    harness.store_token("tok").await;

    let mut config = harness.config();
    // Nothing listens on port 9 in the test environment
    config.api.base_url = "http://127.0.0.1:9".to_string();
    let portal = medportal_lib::Portal::new(config).unwrap();

    let snapshot = portal.initialize().await.unwrap();
    assert_eq!(snapshot, SessionSnapshot::anonymous());
    assert_eq!(harness.stored_token().await, None);
}
