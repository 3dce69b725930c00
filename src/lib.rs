use std::sync::Arc;

use tracing::{debug, info, warn};

// Export modules
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod routing;
pub mod screens;

#[cfg(test)]
mod tests;

pub use api::{ApiClient, HttpClient, ReqwestHttpClient};
pub use auth::{
    AuthSession, Credentials, FileTokenStore, MemoryTokenStore, NewUser, Role, SessionSnapshot,
    SessionState, TokenStore,
};
pub use config::Config;
pub use error::{ErrorCategory, ErrorCode, PortalError, PortalResult};
pub use routing::{Access, Navigation, NavigationOutcome, Route, Router};

use api::models::User;

/// Everything one running client owns: configuration, the REST client, the
/// session and the router. Build one per process.
pub struct Portal {
    config: Config,
    api: Arc<ApiClient>,
    session: Arc<AuthSession>,
    router: Router,
}

impl Portal {
    /// Build a portal talking to the configured service over HTTP, with the
    /// token kept in the configured file
    pub fn new(config: Config) -> PortalResult<Self> {
        config.validate()?;

        let http = Arc::new(ReqwestHttpClient::new(config.api.request_timeout())?);
        let tokens = Arc::new(FileTokenStore::new(&config.auth.token_store_path));
        Ok(Self::from_parts(config, http, tokens))
    }

    /// Build a portal over the given transport and token store
    pub fn from_parts(
        config: Config,
        http: Arc<dyn HttpClient>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let api = Arc::new(ApiClient::new(
            http,
            config.api.base_url.clone(),
            Arc::clone(&tokens),
        ));
        let session = Arc::new(AuthSession::new(
            tokens,
            api.clone(),
            api.clone(),
            config.auth.verify_timeout(),
        ));

        info!(base_url = %api.base_url(), "Portal created");
        Self {
            config,
            api,
            session,
            router: Router::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Restore the stored session; the equivalent of a page load
    pub async fn initialize(&self) -> PortalResult<SessionSnapshot> {
        self.session.initialize().await
    }

    pub async fn login(&self, credentials: &Credentials) -> PortalResult<Role> {
        self.session.login(credentials).await
    }

    pub async fn logout(&self) -> PortalResult<()> {
        self.session.logout().await
    }

    /// Create an account. The session is left as it was.
    pub async fn register(&self, user: &NewUser) -> PortalResult<User> {
        self.api.register(user).await
    }

    /// Route `path` against the current session
    pub fn navigate(&self, path: &str) -> PortalResult<NavigationOutcome> {
        self.router.navigate(path, &self.session.snapshot())
    }

    /// Route `path`, then apply the profile check of the role's home screen
    pub async fn open(&self, path: &str) -> PortalResult<NavigationOutcome> {
        let mut outcome = self.navigate(path)?;

        let (Some(route), Some(role)) = (outcome.route(), self.session.role()) else {
            return Ok(outcome);
        };
        if !role.has_domain_profile() || Route::parse(role.home_path()) != Some(route) {
            return Ok(outcome);
        }

        // The profile check never blocks the home screen itself
        let target = match screens::profile_redirect(&self.api, role).await {
            Ok(target) => target,
            Err(e) => {
                warn!(role = %role, error = %e, "Profile status check failed, showing home screen");
                None
            }
        };

        if let Some(target) = target {
            debug!(from = %route, to = %target, "Home screen redirecting to profile setup");
            let next = self.navigate(&target)?;
            outcome.redirects.push(target);
            outcome.redirects.extend(next.redirects);
            outcome.navigation = next.navigation;
        }
        Ok(outcome)
    }
}
