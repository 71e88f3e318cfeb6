// Authorization policy. Pure decision functions, no I/O, no state.
//
// This is the single source of truth for who may do what; handlers never
// compare roles directly.

use crate::core::error::ApiError;
use crate::models::user::Role;

#[derive(Debug, Clone, PartialEq)]
pub enum Caller {
    Anonymous,
    Authenticated { username: String, role: Role },
}

impl Caller {
    pub fn role(&self) -> Option<Role> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated { role, .. } => Some(*role),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated { username, .. } => Some(username),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Read,
    Mutate,
}

/// Distinguishes "who are you" failures from "you may not" failures:
/// anonymous mutation attempts are `Unauthenticated`, identified callers
/// lacking rights are `Forbidden`.
fn deny(caller: &Caller) -> ApiError {
    match caller {
        Caller::Anonymous => ApiError::Unauthenticated,
        Caller::Authenticated { .. } => ApiError::Forbidden,
    }
}

/// Catalog resources (titles, genres, categories): read for anyone,
/// mutation for admins only.
pub fn check_catalog(caller: &Caller, method: Method) -> Result<(), ApiError> {
    match method {
        Method::Read => Ok(()),
        Method::Mutate => match caller.role() {
            Some(role) if role.is_admin() => Ok(()),
            _ => Err(deny(caller)),
        },
    }
}

/// User collection administration: admins only, reads included.
pub fn check_user_admin(caller: &Caller) -> Result<(), ApiError> {
    match caller.role() {
        Some(role) if role.is_admin() => Ok(()),
        _ => Err(deny(caller)),
    }
}

/// Reviews and comments: read for anyone; create for any authenticated
/// caller; edit/delete for the author, moderators, and admins.
/// `owner` is the target resource's author for object-level checks, or
/// None for creation.
pub fn check_review(
    caller: &Caller,
    method: Method,
    owner: Option<&str>,
) -> Result<(), ApiError> {
    if method == Method::Read {
        return Ok(());
    }

    let (username, role) = match caller {
        Caller::Anonymous => return Err(ApiError::Unauthenticated),
        Caller::Authenticated { username, role } => (username.as_str(), *role),
    };

    match owner {
        None => Ok(()),
        Some(owner) if owner == username => Ok(()),
        Some(_) if role.can_moderate() => Ok(()),
        Some(_) => Err(ApiError::Forbidden),
    }
}

/// Whether the caller may assign roles (self-profile and admin user
/// edits). Non-admin role assignments are ignored by the handlers, never
/// rejected.
pub fn can_assign_role(caller: &Caller) -> bool {
    matches!(caller.role(), Some(role) if role.is_admin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authed(username: &str, role: Role) -> Caller {
        Caller::Authenticated {
            username: username.to_string(),
            role,
        }
    }

    #[test]
    fn test_anonymous_reads_catalog_but_cannot_mutate() {
        assert!(check_catalog(&Caller::Anonymous, Method::Read).is_ok());
        assert!(matches!(
            check_catalog(&Caller::Anonymous, Method::Mutate),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn test_only_admin_mutates_catalog() {
        assert!(check_catalog(&authed("root", Role::Admin), Method::Mutate).is_ok());
        assert!(matches!(
            check_catalog(&authed("mod", Role::Moderator), Method::Mutate),
            Err(ApiError::Forbidden)
        ));
        assert!(matches!(
            check_catalog(&authed("alice", Role::User), Method::Mutate),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn test_user_admin_is_admin_only_even_for_reads() {
        assert!(check_user_admin(&authed("root", Role::Admin)).is_ok());
        assert!(matches!(
            check_user_admin(&authed("mod", Role::Moderator)),
            Err(ApiError::Forbidden)
        ));
        assert!(matches!(
            check_user_admin(&Caller::Anonymous),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn test_anyone_reads_reviews() {
        assert!(check_review(&Caller::Anonymous, Method::Read, Some("alice")).is_ok());
    }

    #[test]
    fn test_any_authenticated_caller_creates_reviews() {
        assert!(check_review(&authed("alice", Role::User), Method::Mutate, None).is_ok());
        assert!(matches!(
            check_review(&Caller::Anonymous, Method::Mutate, None),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn test_author_edits_own_review() {
        assert!(check_review(&authed("alice", Role::User), Method::Mutate, Some("alice")).is_ok());
    }

    #[test]
    fn test_non_author_non_moderator_denied() {
        assert!(matches!(
            check_review(&authed("bob", Role::User), Method::Mutate, Some("alice")),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn test_moderator_and_admin_edit_any_review() {
        assert!(
            check_review(&authed("mod", Role::Moderator), Method::Mutate, Some("alice")).is_ok()
        );
        assert!(check_review(&authed("root", Role::Admin), Method::Mutate, Some("alice")).is_ok());
    }

    #[test]
    fn test_role_assignment_is_admin_only() {
        assert!(can_assign_role(&authed("root", Role::Admin)));
        assert!(!can_assign_role(&authed("mod", Role::Moderator)));
        assert!(!can_assign_role(&authed("alice", Role::User)));
        assert!(!can_assign_role(&Caller::Anonymous));
    }
}
