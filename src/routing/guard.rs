use crate::auth::{Role, SessionSnapshot};

pub const LOGIN_PATH: &str = "/login";
pub const ROOT_PATH: &str = "/";

/// Decision for a single navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Session unresolved; render nothing and wait
    Pending,
    RedirectTo(String),
}

/// Decide whether the session may see a route requiring `required`.
///
/// Loading is checked first so nothing is decided against an unresolved
/// session. A missing token sends the user to login; a wrong role sends them
/// to the root, never to login.
pub fn can_access(session: &SessionSnapshot, required: Option<Role>) -> Access {
    if session.is_loading() {
        return Access::Pending;
    }
    if !session.is_authenticated() {
        return Access::RedirectTo(LOGIN_PATH.to_string());
    }
    match required {
        Some(role) if session.role() != Some(role) => Access::RedirectTo(ROOT_PATH.to_string()),
        _ => Access::Allow,
    }
}
