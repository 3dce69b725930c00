//! Wire types exchanged with the REST service.
//!
//! Field names follow the service's JSON. Nothing here interprets medical
//! values; they are carried as the service sends them.

use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// Response of `POST /token`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Raw response of `GET /verify-token`, before the role is checked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyTokenResponse {
    pub is_valid: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// A registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

/// Response of the `/{role}/profile/status` endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileStatus {
    pub has_profile: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: i64,
    pub user_id: i64,
    pub date_of_birth: NaiveDateTime,
    pub phone_number: String,
    pub address: String,
    pub blood_type: String,
    #[serde(default)]
    pub allergies: Option<String>,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub medical_history: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Body for creating a patient profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfileInput {
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub address: String,
    pub blood_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub medical_history: String,
}

/// Partial update for a patient profile; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: i64,
    pub user_id: i64,
    pub specialty: String,
    pub license_number: String,
    pub phone_number: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfileInput {
    pub specialty: String,
    pub license_number: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// A patient as listed to doctors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDateTime>,
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub is_filled: bool,
    #[serde(default)]
    pub times_filled: u32,
    #[serde(default)]
    pub max_refills: u32,
    #[serde(default)]
    pub prescribed_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

/// Body for `POST /doctor/prescriptions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrescription {
    pub patient_id: i64,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub max_refills: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

/// Body for `POST /pharmacist/prescriptions/{id}/fill`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionFill {
    pub quantity_dispensed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTest {
    pub id: i64,
    pub patient_id: i64,
    #[serde(default)]
    pub bio_analyst_id: Option<i64>,
    pub test_name: String,
    pub test_date: NaiveDateTime,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Upload request for a lab result file
#[derive(Debug, Clone)]
pub struct NewLabTest {
    pub patient_id: i64,
    pub test_name: String,
    pub notes: Option<String>,
    pub filename: String,
    pub content_type: String,
    pub contents: Bytes,
}

/// A downloaded lab result file
#[derive(Debug, Clone)]
pub struct LabTestFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub contents: Bytes,
}

/// Greeting returned by `GET /patient/dashboard`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardGreeting {
    pub message: String,
    pub email: String,
}
