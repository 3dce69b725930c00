//! Screen-layer checks that sit beside the session state machine.

use tracing::debug;

use crate::api::ApiClient;
use crate::auth::Role;
use crate::error::PortalResult;
use crate::routing::Route;

/// Where a role's home screen should send the user before rendering.
///
/// Patients and doctors must create their domain profile first; this returns
/// the profile screen while none exists. Other roles never redirect.
pub async fn profile_redirect(api: &ApiClient, role: Role) -> PortalResult<Option<String>> {
    let Some(status) = api.profile_status(role).await? else {
        return Ok(None);
    };

    if status.has_profile {
        return Ok(None);
    }

    let target = match role {
        Role::Patient => Route::PatientProfile,
        Role::Doctor => Route::DoctorProfile,
        Role::Pharmacist | Role::BioAnalyst => return Ok(None),
    };
    debug!(role = %role, target = %target, "No domain profile yet");
    Ok(Some(target.path()))
}
