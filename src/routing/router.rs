use tracing::{debug, trace, warn};

use crate::auth::SessionSnapshot;
use crate::error::{PortalError, PortalResult};
use crate::routing::guard::{can_access, Access, LOGIN_PATH, ROOT_PATH};
use crate::routing::routes::{Route, RouteKind};

const DASHBOARD_PATH: &str = "/dashboard";
const DEFAULT_MAX_REDIRECTS: usize = 8;

/// What to do with one path, before following redirects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Session still loading; show the global loading screen
    Pending,
    Render(Route),
    Redirect(String),
}

/// Final result of following a path through its redirects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Never `Navigation::Redirect`
    pub navigation: Navigation,
    /// Paths redirected to, in order
    pub redirects: Vec<String>,
}

impl NavigationOutcome {
    pub fn route(&self) -> Option<Route> {
        match self.navigation {
            Navigation::Render(route) => Some(route),
            _ => None,
        }
    }

    /// Path of the screen finally shown
    pub fn final_path(&self) -> Option<&str> {
        self.redirects.last().map(String::as_str)
    }
}

/// Maps paths to screens for a given session
#[derive(Debug, Clone)]
pub struct Router {
    max_redirects: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    pub fn with_max_redirects(max_redirects: usize) -> Self {
        Self { max_redirects }
    }

    /// Decide a single step for `path`
    pub fn resolve(&self, path: &str, session: &SessionSnapshot) -> Navigation {
        if session.is_loading() {
            return Navigation::Pending;
        }

        let Some(route) = Route::parse(path) else {
            trace!(path = %path, "No route matched");
            return Navigation::Redirect(ROOT_PATH.to_string());
        };

        match route.kind() {
            RouteKind::Public => {
                if route == Route::Root && session.is_authenticated() {
                    Navigation::Redirect(DASHBOARD_PATH.to_string())
                } else {
                    Navigation::Render(route)
                }
            }
            RouteKind::GuestOnly => {
                if session.is_authenticated() {
                    Navigation::Redirect(DASHBOARD_PATH.to_string())
                } else {
                    Navigation::Render(route)
                }
            }
            RouteKind::Dispatcher => match (session.is_authenticated(), session.role()) {
                (true, Some(role)) => Navigation::Redirect(role.home_path().to_string()),
                _ => Navigation::Redirect(LOGIN_PATH.to_string()),
            },
            RouteKind::Protected(role) => match can_access(session, Some(role)) {
                Access::Allow => Navigation::Render(route),
                Access::Pending => Navigation::Pending,
                Access::RedirectTo(target) => Navigation::Redirect(target),
            },
        }
    }

    /// Resolve `path` and follow redirects until a screen renders or the
    /// session is found loading.
    pub fn navigate(&self, path: &str, session: &SessionSnapshot) -> PortalResult<NavigationOutcome> {
        let mut current = path.to_string();
        let mut redirects: Vec<String> = Vec::new();

        loop {
            match self.resolve(&current, session) {
                Navigation::Redirect(target) => {
                    if target == path || redirects.contains(&target) {
                        warn!(path = %path, target = %target, "Redirect loop detected");
                        return Err(PortalError::RedirectLoop { path: path.to_string() });
                    }
                    if redirects.len() >= self.max_redirects {
                        warn!(path = %path, hops = redirects.len(), "Too many redirects");
                        return Err(PortalError::RedirectLoop { path: path.to_string() });
                    }
                    trace!(from = %current, to = %target, "Following redirect");
                    redirects.push(target.clone());
                    current = target;
                }
                navigation => {
                    debug!(path = %path, result = ?navigation, hops = redirects.len(), "Navigation resolved");
                    return Ok(NavigationOutcome {
                        navigation,
                        redirects,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, SessionState};

    fn render(path: &str, session: &SessionSnapshot) -> Option<Route> {
        Router::new().navigate(path, session).unwrap().route()
    }

    #[test]
    fn test_everything_pending_while_loading() {
        let verifying = SessionSnapshot {
            state: SessionState::Verifying,
            token_present: true,
        };
        let router = Router::new();
        for path in ["/", "/home", "/login", "/dashboard", "/doctor", "/nope"] {
            assert_eq!(router.resolve(path, &verifying), Navigation::Pending);
        }
    }

    #[test]
    fn test_anonymous_routing() {
        let anon = SessionSnapshot::anonymous();
        assert_eq!(render("/", &anon), Some(Route::Root));
        assert_eq!(render("/home", &anon), Some(Route::Landing));
        assert_eq!(render("/login", &anon), Some(Route::Login));
        assert_eq!(render("/register", &anon), Some(Route::Register));
        assert_eq!(render("/dashboard", &anon), Some(Route::Login));

        let outcome = Router::new().navigate("/doctor", &anon).unwrap();
        assert_eq!(outcome.route(), Some(Route::Login));
        assert_eq!(outcome.redirects, vec!["/login".to_string()]);
    }

    #[test]
    fn test_authenticated_routing() {
        let doctor = SessionSnapshot::authenticated(Role::Doctor);
        assert_eq!(render("/doctor", &doctor), Some(Route::DoctorHome));
        assert_eq!(render("/login", &doctor), Some(Route::DoctorHome));
        assert_eq!(render("/home", &doctor), Some(Route::Landing));

        let outcome = Router::new().navigate("/", &doctor).unwrap();
        assert_eq!(
            outcome.redirects,
            vec!["/dashboard".to_string(), "/doctor".to_string()]
        );
        assert_eq!(outcome.final_path(), Some("/doctor"));
    }

    #[test]
    fn test_wrong_role_lands_on_own_dashboard() {
        let analyst = SessionSnapshot::authenticated(Role::BioAnalyst);
        let outcome = Router::new().navigate("/patient/profile", &analyst).unwrap();
        assert_eq!(outcome.redirects[0], "/");
        assert_eq!(outcome.route(), Some(Route::BioAnalystHome));
    }

    #[test]
    fn test_unknown_path_goes_to_root() {
        let anon = SessionSnapshot::anonymous();
        assert_eq!(
            Router::new().resolve("/doctor/patients/xyz", &anon),
            Navigation::Redirect("/".to_string())
        );
        assert_eq!(render("/missing", &anon), Some(Route::Root));
    }

    #[test]
    fn test_token_without_role_is_a_loop() {
        // Authenticated yet unresolved role: dashboard sends to login, login back to dashboard
        let odd = SessionSnapshot {
            state: SessionState::Anonymous,
            token_present: true,
        };
        let err = Router::new().navigate("/dashboard", &odd).unwrap_err();
        assert!(matches!(err, PortalError::RedirectLoop { .. }));
    }

    #[test]
    fn test_hop_limit() {
        let doctor = SessionSnapshot::authenticated(Role::Doctor);
        let err = Router::with_max_redirects(1)
            .navigate("/", &doctor)
            .unwrap_err();
        assert!(matches!(err, PortalError::RedirectLoop { .. }));
    }
}
