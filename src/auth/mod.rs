pub mod credentials;
pub mod role;
pub mod session;
pub mod storage;
pub mod verifier;

pub use credentials::{Credentials, NewUser};
pub use role::Role;
pub use session::{AuthSession, SessionSnapshot, SessionState};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use verifier::{Authenticator, SessionVerifier, Verification};
