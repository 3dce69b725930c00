use std::fmt;

use crate::auth::Role;

/// Every screen the portal can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/home`, always public
    Landing,
    /// `/`, landing for guests and a dashboard redirect for everyone else
    Root,
    Login,
    Register,
    /// `/dashboard`, dispatches to the role's home
    Dashboard,

    PatientHome,
    PatientProfile,
    PatientPrescriptions,
    PatientLabTests,

    DoctorHome,
    DoctorProfile,
    DoctorPatients,
    DoctorPatient { patient_id: i64 },
    DoctorPrescribe { patient_id: Option<i64> },

    PharmacistHome,
    PharmacistPrescriptions,
    PharmacistPrescription { prescription_id: i64 },

    BioAnalystHome,
    BioAnalystUpload,
    BioAnalystTests,
}

/// How a route is gated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Public,
    /// Only for visitors without a token
    GuestOnly,
    Dispatcher,
    Protected(Role),
}

impl Route {
    /// Match a URL path. Trailing slashes are ignored and the query string is
    /// only consulted where a screen takes one.
    pub fn parse(path: &str) -> Option<Route> {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Root,
            ["home"] => Route::Landing,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,

            ["patient"] => Route::PatientHome,
            ["patient", "profile"] => Route::PatientProfile,
            ["patient", "prescriptions"] => Route::PatientPrescriptions,
            ["patient", "lab-tests"] => Route::PatientLabTests,

            ["doctor"] => Route::DoctorHome,
            ["doctor", "profile"] => Route::DoctorProfile,
            ["doctor", "patients"] => Route::DoctorPatients,
            ["doctor", "patients", id] => Route::DoctorPatient {
                patient_id: parse_id(id)?,
            },
            ["doctor", "prescribe"] => Route::DoctorPrescribe {
                patient_id: query.and_then(|q| query_id(q, "patientId")),
            },

            ["pharmacist"] => Route::PharmacistHome,
            ["pharmacist", "prescriptions"] => Route::PharmacistPrescriptions,
            ["pharmacist", "prescriptions", id] => Route::PharmacistPrescription {
                prescription_id: parse_id(id)?,
            },

            ["bio-analyst"] => Route::BioAnalystHome,
            ["bio-analyst", "upload"] => Route::BioAnalystUpload,
            ["bio-analyst", "tests"] => Route::BioAnalystTests,

            _ => return None,
        };
        Some(route)
    }

    pub fn kind(&self) -> RouteKind {
        if let Some(role) = self.required_role() {
            return RouteKind::Protected(role);
        }
        match self {
            Route::Login | Route::Register => RouteKind::GuestOnly,
            Route::Dashboard => RouteKind::Dispatcher,
            _ => RouteKind::Public,
        }
    }

    /// Role a session must hold to see this screen
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::PatientHome
            | Route::PatientProfile
            | Route::PatientPrescriptions
            | Route::PatientLabTests => Some(Role::Patient),

            Route::DoctorHome
            | Route::DoctorProfile
            | Route::DoctorPatients
            | Route::DoctorPatient { .. }
            | Route::DoctorPrescribe { .. } => Some(Role::Doctor),

            Route::PharmacistHome
            | Route::PharmacistPrescriptions
            | Route::PharmacistPrescription { .. } => Some(Role::Pharmacist),

            Route::BioAnalystHome | Route::BioAnalystUpload | Route::BioAnalystTests => {
                Some(Role::BioAnalyst)
            }

            Route::Landing | Route::Root | Route::Login | Route::Register | Route::Dashboard => {
                None
            }
        }
    }

    /// Canonical path, including the query where the screen has one
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/home".to_string(),
            Route::Root => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::PatientHome => "/patient".to_string(),
            Route::PatientProfile => "/patient/profile".to_string(),
            Route::PatientPrescriptions => "/patient/prescriptions".to_string(),
            Route::PatientLabTests => "/patient/lab-tests".to_string(),
            Route::DoctorHome => "/doctor".to_string(),
            Route::DoctorProfile => "/doctor/profile".to_string(),
            Route::DoctorPatients => "/doctor/patients".to_string(),
            Route::DoctorPatient { patient_id } => format!("/doctor/patients/{}", patient_id),
            Route::DoctorPrescribe { patient_id: None } => "/doctor/prescribe".to_string(),
            Route::DoctorPrescribe {
                patient_id: Some(id),
            } => format!("/doctor/prescribe?patientId={}", id),
            Route::PharmacistHome => "/pharmacist".to_string(),
            Route::PharmacistPrescriptions => "/pharmacist/prescriptions".to_string(),
            Route::PharmacistPrescription { prescription_id } => {
                format!("/pharmacist/prescriptions/{}", prescription_id)
            }
            Route::BioAnalystHome => "/bio-analyst".to_string(),
            Route::BioAnalystUpload => "/bio-analyst/upload".to_string(),
            Route::BioAnalystTests => "/bio-analyst/tests".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn parse_id(segment: &str) -> Option<i64> {
    segment.parse::<i64>().ok().filter(|id| *id > 0)
}

fn query_id(query: &str, key: &str) -> Option<i64> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| parse_id(v))
}
