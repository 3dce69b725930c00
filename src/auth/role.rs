use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PortalError;

/// The four account categories the service knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Patient,
    Doctor,
    Pharmacist,
    BioAnalyst,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Patient,
        Role::Doctor,
        Role::Pharmacist,
        Role::BioAnalyst,
    ];

    /// Canonical wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "PATIENT",
            Role::Doctor => "DOCTOR",
            Role::Pharmacist => "PHARMACIST",
            Role::BioAnalyst => "BIO_ANALYST",
        }
    }

    /// Root path of the role's screen subtree
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Patient => "/patient",
            Role::Doctor => "/doctor",
            Role::Pharmacist => "/pharmacist",
            Role::BioAnalyst => "/bio-analyst",
        }
    }

    /// Whether the role owns a domain profile that must exist before the dashboard is usable
    pub fn has_domain_profile(&self) -> bool {
        matches!(self, Role::Patient | Role::Doctor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PortalError;

    /// Accepts any casing and `-` in place of `_`; everything else is rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "PATIENT" => Ok(Role::Patient),
            "DOCTOR" => Ok(Role::Doctor),
            "PHARMACIST" => Ok(Role::Pharmacist),
            "BIO_ANALYST" | "BIOANALYST" => Ok(Role::BioAnalyst),
            _ => Err(PortalError::InvalidResponse {
                reason: format!("unknown role '{}'", s),
            }),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
