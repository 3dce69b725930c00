pub mod guard;
pub mod router;
pub mod routes;

pub use guard::{can_access, Access};
pub use router::{Navigation, NavigationOutcome, Router};
pub use routes::{Route, RouteKind};
