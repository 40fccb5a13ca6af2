/// Authentication and authorization utilities
///
/// This module provides the credential and access-control primitives for TaskDesk:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Session token generation and validation
/// - [`credentials`]: Register, authenticate and verify operations
/// - [`middleware`]: Request authentication context and errors
/// - [`authorization`]: Admin role checks
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Session Tokens**: HS256 signing, 7 day validity, not revocable
/// - **Enumeration Resistance**: login pays the same hashing cost for unknown emails
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::auth::password::{hash_password, verify_password};
/// use taskdesk_shared::auth::jwt::{create_token, validate_token, Claims};
/// use taskdesk_shared::models::user::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(42, "user@example.com".to_string(), UserRole::User);
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;
