use tracing::warn;
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    repo_types::{Role, User},
};

/// Role policy and ownership policy, each optional.
///
/// The role check runs first. Ownership passes when the caller's id is among
/// `owners`, or unconditionally for `Role::Admin`. Admin is not implied by a
/// role set; callers that want admins in list them.
///
/// Authentication has already happened by the time this runs: the
/// `AuthUser` extractor resolves the session before any handler body.
pub fn authorize(
    caller: &User,
    roles: Option<&[Role]>,
    owners: Option<&[Uuid]>,
) -> Result<(), AuthError> {
    if let Some(roles) = roles {
        if !roles.contains(&caller.role) {
            warn!(user_id = %caller.id, role = %caller.role, "role check failed");
            return Err(AuthError::Forbidden(
                "Insufficient role for this operation".into(),
            ));
        }
    }

    if let Some(owners) = owners {
        if caller.role != Role::Admin && !owners.contains(&caller.id) {
            warn!(user_id = %caller.id, "ownership check failed");
            return Err(AuthError::Forbidden(
                "Not authorized to access this resource".into(),
            ));
        }
    }

    Ok(())
}

pub fn require_role(caller: &User, roles: &[Role]) -> Result<(), AuthError> {
    authorize(caller, Some(roles), None)
}

pub fn require_owner(caller: &User, owner: Uuid) -> Result<(), AuthError> {
    authorize(caller, None, Some(std::slice::from_ref(&owner)))
}
