use std::fmt;

use serde::Serialize;

use crate::auth::Role;
use crate::error::{validation, PortalResult};

/// Username/password pair submitted to the login endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The account email, sent as `username`
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reject obviously empty input before a request is made
    pub fn validate(&self) -> PortalResult<()> {
        if self.username.trim().is_empty() {
            return Err(validation("username", "email is required"));
        }
        if self.password.is_empty() {
            return Err(validation("password", "password is required"));
        }
        Ok(())
    }

    /// `application/x-www-form-urlencoded` body for `POST /token`
    pub fn to_form_body(&self) -> String {
        format!(
            "username={}&password={}",
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password)
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload for `POST /register`
#[derive(Clone, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewUser {
    pub fn validate(&self) -> PortalResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(validation("first_name", "first name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(validation("last_name", "last name is required"));
        }
        if !self.email.contains('@') {
            return Err(validation("email", "email must contain '@'"));
        }
        if self.password.is_empty() {
            return Err(validation("password", "password is required"));
        }
        Ok(())
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}
