/// Authorization checks
///
/// TaskDesk has a two-level permission model:
///
/// 1. **Ownership**: a regular user reaches only the tasks it owns
///    (see [`AuthContext::task_scope`]).
/// 2. **Admin role**: a user with [`UserRole::Admin`] may list and delete any
///    user or task. Admin accounts themselves can never be deleted.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::authorization::require_admin;
/// use taskdesk_shared::auth::middleware::AuthContext;
/// use taskdesk_shared::models::user::UserRole;
///
/// let auth = AuthContext { user_id: 1, email: "a@example.com".into(), role: UserRole::User };
/// assert!(require_admin(&auth).is_err());
/// ```

use super::middleware::AuthContext;
use crate::models::user::{User, UserRole};

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller is not an admin
    #[error("Admin access required")]
    NotAdmin,

    /// Target account is protected from deletion
    #[error("Cannot delete admin user")]
    ProtectedAccount,
}

/// Requires the caller to hold the admin role
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if !auth.is_admin() {
        return Err(AuthzError::NotAdmin);
    }

    Ok(())
}

/// Checks that an account may be deleted
///
/// Admin accounts are never deletable, whoever the caller is.
pub fn ensure_deletable(target: &User) -> Result<(), AuthzError> {
    if target.role == UserRole::Admin {
        return Err(AuthzError::ProtectedAccount);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn context(role: UserRole) -> AuthContext {
        AuthContext {
            user_id: 1,
            email: "someone@example.com".to_string(),
            role,
        }
    }

    fn user(role: UserRole) -> User {
        User {
            id: 2,
            name: "Target".to_string(),
            email: "target@example.com".to_string(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_admin() {
        assert_eq!(require_admin(&context(UserRole::User)), Err(AuthzError::NotAdmin));
        assert!(require_admin(&context(UserRole::Admin)).is_ok());
    }

    #[test]
    fn test_admin_check_ignores_email() {
        let mut auth = context(UserRole::User);
        auth.email = "admin@example.com".to_string();
        assert!(require_admin(&auth).is_err());
    }

    #[test]
    fn test_ensure_deletable() {
        assert!(ensure_deletable(&user(UserRole::User)).is_ok());
        assert_eq!(
            ensure_deletable(&user(UserRole::Admin)),
            Err(AuthzError::ProtectedAccount)
        );
    }
}
