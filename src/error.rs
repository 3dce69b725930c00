use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::Role;

/// Error type for every fallible operation in the portal
#[derive(Error, Debug, Clone)]
pub enum PortalError {
    /// The REST service could not be reached
    #[error("Network error: {reason}")]
    Network { reason: String },

    /// A call did not finish in time
    #[error("{operation} timed out{}", describe_limit(.after))]
    Timeout {
        operation: String,
        after: Option<Duration>,
    },

    /// Invalid credentials, or an invalid or expired token
    #[error("Authentication failed: {reason}")]
    Auth { reason: String },

    /// Any other non-success response from the REST service
    #[error("API request failed with status {status}: {detail}")]
    Api { status: u16, detail: String },

    /// The REST service answered with something we cannot interpret
    #[error("Invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// Input rejected before any request was made
    #[error("Invalid value for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// The session holds a different role than the one required
    #[error("Access denied: requires {required}, session has {}", describe_role(.actual))]
    AccessDenied { required: Role, actual: Option<Role> },

    /// Another login or initialization is still running
    #[error("Another authentication transition is already in progress")]
    TransitionInProgress,

    /// The token store could not be read or written
    #[error("Token storage error: {reason}")]
    Storage { reason: String },

    /// Configuration is missing or invalid
    #[error("Invalid configuration value for '{key}': {reason}")]
    Config { key: String, reason: String },

    /// Following redirects from a path never reached a screen
    #[error("Redirect loop while navigating to {path}")]
    RedirectLoop { path: String },
}

fn describe_role(role: &Option<Role>) -> String {
    role.map_or_else(|| "no role".to_string(), |r| r.to_string())
}

fn describe_limit(after: &Option<Duration>) -> String {
    after.map_or_else(String::new, |d| format!(" after {d:?}"))
}

/// Result alias used across the crate
pub type PortalResult<T> = Result<T, PortalError>;

/// Stable codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NetworkUnreachable,
    NetworkTimeout,
    AuthFailed,
    ApiRequestFailed,
    ApiResponseInvalid,
    ValidationFailed,
    AccessDenied,
    TransitionInProgress,
    StorageFailed,
    ConfigInvalid,
    RedirectLoop,
}

/// Error categories, one per failure class the UI distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Collaborator unreachable or slow
    Network,
    /// Credentials or token rejected
    Authentication,
    /// Malformed input
    Validation,
    /// Role mismatch
    AccessDenied,
    /// Everything that is our fault or the server's
    Internal,
}

impl ErrorCode {
    /// Map a code to its category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NetworkUnreachable | Self::NetworkTimeout => ErrorCategory::Network,
            Self::AuthFailed => ErrorCategory::Authentication,
            Self::ValidationFailed => ErrorCategory::Validation,
            Self::AccessDenied => ErrorCategory::AccessDenied,
            Self::ApiRequestFailed
            | Self::ApiResponseInvalid
            | Self::TransitionInProgress
            | Self::StorageFailed
            | Self::ConfigInvalid
            | Self::RedirectLoop => ErrorCategory::Internal,
        }
    }
}

impl PortalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Network { .. } => ErrorCode::NetworkUnreachable,
            Self::Timeout { .. } => ErrorCode::NetworkTimeout,
            Self::Auth { .. } => ErrorCode::AuthFailed,
            Self::Api { .. } => ErrorCode::ApiRequestFailed,
            Self::InvalidResponse { .. } => ErrorCode::ApiResponseInvalid,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::AccessDenied { .. } => ErrorCode::AccessDenied,
            Self::TransitionInProgress => ErrorCode::TransitionInProgress,
            Self::Storage { .. } => ErrorCode::StorageFailed,
            Self::Config { .. } => ErrorCode::ConfigInvalid,
            Self::RedirectLoop { .. } => ErrorCode::RedirectLoop,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Message suitable for showing next to a form
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { detail, .. } => detail.clone(),
            Self::Auth { reason } => reason.clone(),
            Self::Validation { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code_str = match self {
            ErrorCode::NetworkUnreachable => "NETWORK_UNREACHABLE",
            ErrorCode::NetworkTimeout => "NETWORK_TIMEOUT",
            ErrorCode::AuthFailed => "AUTH_FAILED",
            ErrorCode::ApiRequestFailed => "API_REQUEST_FAILED",
            ErrorCode::ApiResponseInvalid => "API_RESPONSE_INVALID",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::AccessDenied => "ACCESS_DENIED",
            ErrorCode::TransitionInProgress => "TRANSITION_IN_PROGRESS",
            ErrorCode::StorageFailed => "STORAGE_FAILED",
            ErrorCode::ConfigInvalid => "CONFIG_INVALID",
            ErrorCode::RedirectLoop => "ROUTING_REDIRECT_LOOP",
        };
        write!(f, "{}", code_str)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Network => write!(f, "Network"),
            ErrorCategory::Authentication => write!(f, "Authentication"),
            ErrorCategory::Validation => write!(f, "Validation"),
            ErrorCategory::AccessDenied => write!(f, "AccessDenied"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PortalError::Timeout {
                operation: err
                    .url()
                    .map_or_else(|| "HTTP request".to_string(), |u| u.path().to_string()),
                after: None,
            }
        } else if err.is_decode() {
            PortalError::InvalidResponse {
                reason: err.to_string(),
            }
        } else {
            PortalError::Network {
                reason: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::InvalidResponse {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::Storage {
            reason: err.to_string(),
        }
    }
}

/// Helper functions for the errors raised most often
pub fn auth_failed(reason: impl Into<String>) -> PortalError {
    PortalError::Auth {
        reason: reason.into(),
    }
}

pub fn validation(field: &str, reason: impl Into<String>) -> PortalError {
    PortalError::Validation {
        field: field.to_string(),
        reason: reason.into(),
    }
}

pub fn config_invalid(key: &str, reason: impl Into<String>) -> PortalError {
    PortalError::Config {
        key: key.to_string(),
        reason: reason.into(),
    }
}
