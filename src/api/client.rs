use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::http_client::{FilePart, HttpClient, HttpResponse, MultipartForm};
use crate::api::models::*;
use crate::auth::{Credentials, NewUser, Role, TokenStore};
use crate::error::{auth_failed, PortalError, PortalResult};

/// Typed access to the REST service.
///
/// Every call except login, registration and token verification carries the
/// bearer token currently held in the [`TokenStore`]. The client never writes
/// the store.
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn auth_headers(&self) -> PortalResult<HashMap<String, String>> {
        let mut headers = HashMap::new();
        if let Some(token) = self.tokens.get().await? {
            headers.insert(AUTHORIZATION.as_str().to_string(), format!("Bearer {}", token));
        }
        Ok(headers)
    }

    fn json_headers(mut headers: HashMap<String, String>) -> HashMap<String, String> {
        headers.insert(CONTENT_TYPE.as_str().to_string(), "application/json".to_string());
        headers
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> PortalResult<T> {
        debug!(path = %path, "GET");
        let response = self.http.get(&self.url(path), self.auth_headers().await?).await?;
        decode(check(response)?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> PortalResult<T> {
        debug!(path = %path, "POST");
        let body = Bytes::from(serde_json::to_vec(body)?);
        let headers = Self::json_headers(self.auth_headers().await?);
        let response = self.http.post(&self.url(path), headers, body).await?;
        decode(check(response)?)
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> PortalResult<T> {
        debug!(path = %path, "PUT");
        let body = Bytes::from(serde_json::to_vec(body)?);
        let headers = Self::json_headers(self.auth_headers().await?);
        let response = self.http.put(&self.url(path), headers, body).await?;
        decode(check(response)?)
    }

    // -- Identity --

    /// Exchange credentials for an access token via `POST /token`
    pub async fn login(&self, credentials: &Credentials) -> PortalResult<String> {
        credentials.validate()?;

        let mut headers = HashMap::new();
        headers.insert(
            CONTENT_TYPE.as_str().to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        let body = Bytes::from(credentials.to_form_body());

        debug!(username = %credentials.username, "Requesting access token");
        let response = self.http.post(&self.url("/token"), headers, body).await?;
        let token: TokenResponse = decode(check(response)?)?;

        if token.access_token.is_empty() {
            return Err(PortalError::InvalidResponse {
                reason: "login response carried an empty access token".to_string(),
            });
        }
        Ok(token.access_token)
    }

    /// Ask the identity endpoint whether `token` is still good
    pub async fn verify_token(&self, token: &str) -> PortalResult<VerifyTokenResponse> {
        let mut headers = HashMap::new();
        headers.insert(AUTHORIZATION.as_str().to_string(), format!("Bearer {}", token));

        let response = self.http.get(&self.url("/verify-token"), headers).await?;
        decode(check(response)?)
    }

    /// Create an account; does not log in
    pub async fn register(&self, user: &NewUser) -> PortalResult<User> {
        user.validate()?;
        debug!(email = %user.email, role = %user.role, "Registering user");

        let body = Bytes::from(serde_json::to_vec(user)?);
        let headers = Self::json_headers(HashMap::new());
        let response = self.http.post(&self.url("/register"), headers, body).await?;
        decode(check(response)?)
    }

    /// Profile status for roles that own a domain profile
    pub async fn profile_status(&self, role: Role) -> PortalResult<Option<ProfileStatus>> {
        match role {
            Role::Patient => self.patient_profile_status().await.map(Some),
            Role::Doctor => self.doctor_profile_status().await.map(Some),
            Role::Pharmacist | Role::BioAnalyst => Ok(None),
        }
    }

    // -- Patient --

    pub async fn patient_dashboard(&self) -> PortalResult<DashboardGreeting> {
        self.get_json("/patient/dashboard").await
    }

    pub async fn patient_profile_status(&self) -> PortalResult<ProfileStatus> {
        self.get_json("/patient/profile/status").await
    }

    pub async fn patient_profile(&self) -> PortalResult<PatientProfile> {
        self.get_json("/patient/profile").await
    }

    pub async fn create_patient_profile(
        &self,
        profile: &PatientProfileInput,
    ) -> PortalResult<PatientProfile> {
        self.post_json("/patient/profile", profile).await
    }

    pub async fn update_patient_profile(
        &self,
        update: &PatientProfileUpdate,
    ) -> PortalResult<PatientProfile> {
        self.put_json("/patient/profile", update).await
    }

    pub async fn patient_prescriptions(&self) -> PortalResult<Vec<Prescription>> {
        self.get_json("/patient/prescriptions").await
    }

    pub async fn patient_lab_tests(&self) -> PortalResult<Vec<LabTest>> {
        self.get_json("/patient/lab-tests").await
    }

    // -- Doctor --

    pub async fn doctor_profile_status(&self) -> PortalResult<ProfileStatus> {
        self.get_json("/doctor/profile/status").await
    }

    pub async fn doctor_profile(&self) -> PortalResult<DoctorProfile> {
        self.get_json("/doctor/profile").await
    }

    pub async fn create_doctor_profile(
        &self,
        profile: &DoctorProfileInput,
    ) -> PortalResult<DoctorProfile> {
        self.post_json("/doctor/profile", profile).await
    }

    pub async fn update_doctor_profile(
        &self,
        update: &DoctorProfileUpdate,
    ) -> PortalResult<DoctorProfile> {
        self.put_json("/doctor/profile", update).await
    }

    pub async fn doctor_patients(&self) -> PortalResult<Vec<PatientSummary>> {
        self.get_json("/doctor/patients").await
    }

    pub async fn doctor_patient(&self, patient_id: i64) -> PortalResult<PatientSummary> {
        self.get_json(&format!("/doctor/patients/{}", patient_id))
            .await
    }

    pub async fn create_prescription(
        &self,
        prescription: &NewPrescription,
    ) -> PortalResult<Prescription> {
        self.post_json("/doctor/prescriptions", prescription).await
    }

    pub async fn doctor_prescription(&self, prescription_id: i64) -> PortalResult<Prescription> {
        self.get_json(&format!("/doctor/prescriptions/{}", prescription_id))
            .await
    }

    // -- Pharmacist --

    pub async fn pharmacist_prescriptions(&self) -> PortalResult<Vec<Prescription>> {
        self.get_json("/pharmacist/prescriptions").await
    }

    pub async fn pharmacist_prescription(
        &self,
        prescription_id: i64,
    ) -> PortalResult<Prescription> {
        self.get_json(&format!("/pharmacist/prescriptions/{}", prescription_id))
            .await
    }

    pub async fn fill_prescription(
        &self,
        prescription_id: i64,
        fill: &PrescriptionFill,
    ) -> PortalResult<Prescription> {
        self.post_json(
            &format!("/pharmacist/prescriptions/{}/fill", prescription_id),
            fill,
        )
        .await
    }

    // -- Bio-analyst --

    pub async fn lab_tests(&self) -> PortalResult<Vec<LabTest>> {
        self.get_json("/bio-analyst/tests").await
    }

    pub async fn lab_test(&self, test_id: i64) -> PortalResult<LabTest> {
        self.get_json(&format!("/bio-analyst/tests/{}", test_id))
            .await
    }

    pub async fn lab_tests_for_patient(&self, patient_id: i64) -> PortalResult<Vec<LabTest>> {
        self.get_json(&format!("/bio-analyst/patients/{}/tests", patient_id))
            .await
    }

    /// Upload a lab result file with its metadata
    pub async fn upload_lab_test(&self, test: NewLabTest) -> PortalResult<LabTest> {
        if test.test_name.trim().is_empty() {
            return Err(crate::error::validation("test_name", "test name is required"));
        }
        if test.contents.is_empty() {
            return Err(crate::error::validation("file", "file is empty"));
        }

        let form = MultipartForm::new()
            .text("patient_id", test.patient_id.to_string())
            .text("test_name", test.test_name)
            .text("notes", test.notes.unwrap_or_default())
            .file(FilePart {
                field: "file".to_string(),
                filename: test.filename,
                content_type: test.content_type,
                bytes: test.contents,
            });

        debug!(patient_id = test.patient_id, "Uploading lab test");
        let response = self
            .http
            .post_multipart(&self.url("/bio-analyst/test"), self.auth_headers().await?, form)
            .await?;
        decode(check(response)?)
    }

    /// Download the stored file of a lab test
    pub async fn lab_test_file(&self, test_id: i64) -> PortalResult<LabTestFile> {
        let path = format!("/bio-analyst/tests/{}/file", test_id);
        debug!(path = %path, "GET");
        let response = check(
            self.http
                .get(&self.url(&path), self.auth_headers().await?)
                .await?,
        )?;

        let filename = response
            .header(CONTENT_DISPOSITION.as_str())
            .and_then(filename_from_disposition);
        let content_type = response.header(CONTENT_TYPE.as_str()).map(str::to_string);

        Ok(LabTestFile {
            filename,
            content_type,
            contents: response.into_body(),
        })
    }
}

/// Turn a non-success response into the matching error
fn check(response: HttpResponse) -> PortalResult<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let status = response.status();
    let detail = error_detail(&response);
    warn!(status = status.as_u16(), detail = %detail, "Request rejected by service");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(auth_failed(detail)),
        _ => Err(PortalError::Api {
            status: status.as_u16(),
            detail,
        }),
    }
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> PortalResult<T> {
    response.json()
}

/// Pull the `detail` message out of an error body, falling back to the raw text
fn error_detail(response: &HttpResponse) -> String {
    if let Ok(value) = response.json::<serde_json::Value>() {
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            Some(serde_json::Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }

    let text = response.text();
    if text.trim().is_empty() {
        response
            .status()
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        text
    }
}

fn filename_from_disposition(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        if let Some(encoded) = part.strip_prefix("filename*=") {
            let encoded = encoded.splitn(3, '\'').nth(2).unwrap_or(encoded);
            urlencoding::decode(encoded).ok().map(|s| s.into_owned())
        } else {
            part.strip_prefix("filename=")
                .map(|name| name.trim_matches('"').to_string())
        }
    })
}
