use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::auth::{Credentials, Role};
use crate::error::{PortalError, PortalResult};

/// Outcome of checking a token against the identity endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub is_valid: bool,
    /// Always `Some` when `is_valid` is true
    pub role: Option<Role>,
}

impl Verification {
    pub fn valid(role: Role) -> Self {
        Self {
            is_valid: true,
            role: Some(role),
        }
    }

    pub fn invalid() -> Self {
        Self {
            is_valid: false,
            role: None,
        }
    }
}

/// Turns a stored token into a confirmed role
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> PortalResult<Verification>;
}

/// Exchanges credentials for a fresh token
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> PortalResult<String>;
}

#[async_trait]
impl SessionVerifier for ApiClient {
    async fn verify(&self, token: &str) -> PortalResult<Verification> {
        let response = self.verify_token(token).await?;

        if !response.is_valid {
            debug!("Identity endpoint reported token as invalid");
            return Ok(Verification::invalid());
        }

        // A valid token must come with a role we know
        let role = match response.role.as_deref() {
            Some(raw) => raw.parse::<Role>().map_err(|e| {
                warn!(role = %raw, "Identity endpoint returned an unknown role");
                e
            })?,
            None => {
                return Err(PortalError::InvalidResponse {
                    reason: "valid token reported without a role".to_string(),
                })
            }
        };

        Ok(Verification::valid(role))
    }
}

#[async_trait]
impl Authenticator for ApiClient {
    async fn login(&self, credentials: &Credentials) -> PortalResult<String> {
        ApiClient::login(self, credentials).await
    }
}
