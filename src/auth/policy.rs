use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::store::users::Role;
use crate::store::Id;

/// The single ownership rule applied by every guarded mutation: admins may
/// touch anything, owners may touch their own resource, everyone else is
/// denied.
///
/// Callers must resolve the resource before evaluating this rule; a missing
/// resource is a not-found error, never a permission error.
pub fn authorize_owner(caller: &AuthUser, owner_id: &Id) -> Result<(), ApiError> {
    if caller.role == Role::Admin || caller.id == *owner_id {
        return Ok(());
    }
    Err(ApiError::permission_denied(
        "You don't have permission to change other users' resources.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Role) -> AuthUser {
        AuthUser {
            id: Id::new(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            role,
        }
    }

    #[test]
    fn owner_is_allowed() {
        let caller = caller(Role::User);
        let owner = caller.id.clone();
        assert!(authorize_owner(&caller, &owner).is_ok());
    }

    #[test]
    fn admin_is_allowed_on_any_resource() {
        let caller = caller(Role::Admin);
        assert!(authorize_owner(&caller, &Id::new()).is_ok());
    }

    #[test]
    fn other_users_are_denied() {
        let caller = caller(Role::User);
        let err = authorize_owner(&caller, &Id::new()).expect_err("denied");
        assert!(matches!(err, ApiError::PermissionDenied(_)));
    }

    #[test]
    fn comparison_is_on_canonical_string_form() {
        let caller = caller(Role::User);
        let owner = Id::from(caller.id.to_string());
        assert!(authorize_owner(&caller, &owner).is_ok());
    }
}
