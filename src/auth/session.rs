use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::auth::{Authenticator, Credentials, Role, SessionVerifier, TokenStore};
use crate::error::{auth_failed, PortalError, PortalResult};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, storage not yet consulted
    Uninitialized,
    /// A token is being checked against the identity endpoint
    Verifying,
    /// Token confirmed for this role
    Authenticated { role: Role },
    /// No usable token
    Anonymous,
}

/// Read-only view of the session handed to the guard and router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub token_present: bool,
}

impl SessionSnapshot {
    pub fn uninitialized() -> Self {
        Self {
            state: SessionState::Uninitialized,
            token_present: false,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            state: SessionState::Anonymous,
            token_present: false,
        }
    }

    pub fn authenticated(role: Role) -> Self {
        Self {
            state: SessionState::Authenticated { role },
            token_present: true,
        }
    }

    /// True until the first verification attempt has resolved
    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Verifying
        )
    }

    /// A token is held; says nothing about whether it was confirmed
    pub fn is_authenticated(&self) -> bool {
        self.token_present
    }

    pub fn role(&self) -> Option<Role> {
        match self.state {
            SessionState::Authenticated { role } => Some(role),
            _ => None,
        }
    }
}

/// The per-process authentication session.
///
/// Sole writer of the [`TokenStore`]. Every transition runs under one
/// mutex, so at most one login or verification is in flight at a time.
/// `login` and `initialize` refuse to queue behind another transition and
/// return [`PortalError::TransitionInProgress`]; `logout` waits its turn.
pub struct AuthSession {
    tokens: Arc<dyn TokenStore>,
    authenticator: Arc<dyn Authenticator>,
    verifier: Arc<dyn SessionVerifier>,
    verify_timeout: Duration,
    token: RwLock<Option<String>>,
    state: watch::Sender<SessionSnapshot>,
    transition: Mutex<()>,
}

impl AuthSession {
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        authenticator: Arc<dyn Authenticator>,
        verifier: Arc<dyn SessionVerifier>,
        verify_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::uninitialized());
        Self {
            tokens,
            authenticator,
            verifier,
            verify_timeout,
            token: RwLock::new(None),
            state,
            transition: Mutex::new(()),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        *self.state.borrow()
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot().is_loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    pub fn role(&self) -> Option<Role> {
        self.snapshot().role()
    }

    /// The bearer token held in memory
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Restore the session from the token store.
    ///
    /// Runs once; later calls return the current snapshot untouched.
    pub async fn initialize(&self) -> PortalResult<SessionSnapshot> {
        let _guard = self
            .transition
            .try_lock()
            .map_err(|_| PortalError::TransitionInProgress)?;

        if self.snapshot().state != SessionState::Uninitialized {
            debug!("Session already initialized");
            return Ok(self.snapshot());
        }

        self.restore_locked().await;
        Ok(self.snapshot())
    }

    /// Initialize body for use while the transition lock is already held
    async fn restore_locked(&self) {
        let stored = match self.tokens.get().await {
            Ok(stored) => stored,
            Err(e) => {
                error!(error = %e, "Could not read token store, starting anonymous");
                None
            }
        };

        let Some(token) = stored else {
            info!("No stored token, session is anonymous");
            self.publish(SessionSnapshot::anonymous());
            return;
        };

        *self.token.write().await = Some(token.clone());
        self.publish(SessionSnapshot {
            state: SessionState::Verifying,
            token_present: true,
        });

        match self.verify_with_timeout(&token).await {
            Ok(role) => {
                info!(role = %role, "Stored token verified");
                self.publish(SessionSnapshot::authenticated(role));
            }
            Err(e) => {
                warn!(error = %e, "Stored token not accepted, clearing session");
                self.clear_locked().await;
            }
        }
    }

    /// Log in and resolve only once the new token's role is known.
    ///
    /// A session that was never initialized is restored first, so a failed
    /// login always leaves it settled.
    pub async fn login(&self, credentials: &Credentials) -> PortalResult<Role> {
        let _guard = self
            .transition
            .try_lock()
            .map_err(|_| PortalError::TransitionInProgress)?;

        if self.snapshot().state == SessionState::Uninitialized {
            self.restore_locked().await;
        }

        let token = match self.authenticator.login(credentials).await {
            Ok(token) => token,
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Login failed");
                return Err(e);
            }
        };

        if let Err(e) = self.tokens.set(&token).await {
            self.clear_locked().await;
            return Err(e);
        }
        *self.token.write().await = Some(token.clone());
        self.publish(SessionSnapshot {
            state: SessionState::Verifying,
            token_present: true,
        });

        match self.verify_with_timeout(&token).await {
            Ok(role) => {
                info!(username = %credentials.username, role = %role, "Logged in");
                self.publish(SessionSnapshot::authenticated(role));
                Ok(role)
            }
            Err(e) => {
                warn!(error = %e, "Fresh token failed verification, logging out");
                self.clear_locked().await;
                Err(e)
            }
        }
    }

    /// Drop the token and role. Safe to call in any state, any number of times.
    pub async fn logout(&self) -> PortalResult<()> {
        let _guard = self.transition.lock().await;

        *self.token.write().await = None;
        self.publish(SessionSnapshot::anonymous());
        self.tokens.clear().await?;

        info!("Logged out");
        Ok(())
    }

    async fn verify_with_timeout(&self, token: &str) -> PortalResult<Role> {
        let verification = tokio::time::timeout(self.verify_timeout, self.verifier.verify(token))
            .await
            .map_err(|_| PortalError::Timeout {
                operation: "token verification".to_string(),
                after: Some(self.verify_timeout),
            })??;

        match (verification.is_valid, verification.role) {
            (true, Some(role)) => Ok(role),
            (true, None) => Err(PortalError::InvalidResponse {
                reason: "valid token reported without a role".to_string(),
            }),
            (false, _) => Err(auth_failed("token is invalid or expired")),
        }
    }

    /// Logout body for use while the transition lock is already held
    async fn clear_locked(&self) {
        *self.token.write().await = None;
        self.publish(SessionSnapshot::anonymous());
        if let Err(e) = self.tokens.clear().await {
            error!(error = %e, "Failed to clear token store");
        }
    }

    fn publish(&self, snapshot: SessionSnapshot) {
        debug!(state = ?snapshot.state, token_present = snapshot.token_present, "Session state changed");
        self.state.send_replace(snapshot);
    }
}
