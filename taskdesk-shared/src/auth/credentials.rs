/// Credential store operations
///
/// The three operations the rest of the system authenticates through:
///
/// - [`register`]: create an account and issue a session token
/// - [`authenticate`]: check email + password and issue a session token
/// - [`verify`]: turn a session token back into an identity
///
/// Argon2 hashing is CPU-bound and runs on the blocking thread pool.
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::auth::credentials::{authenticate, register, CredentialSettings, NewAccount};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let settings = CredentialSettings::new("a-secret-of-at-least-32-characters!!");
///
/// let session = register(&pool, &settings, NewAccount {
///     name: "Jane".to_string(),
///     email: "jane@example.com".to_string(),
///     password: "correct horse".to_string(),
/// }).await?;
///
/// let again = authenticate(&pool, &settings, "jane@example.com", "correct horse").await?;
/// assert_eq!(again.user.id, session.user.id);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use super::{
    jwt::{create_token, validate_token, Claims, JwtError},
    middleware::AuthContext,
    password::{hash_password, verify_dummy, verify_password, PasswordError},
};
use crate::models::user::{CreateUser, User, UserRole};

/// Settings the credential store needs from configuration
#[derive(Debug, Clone)]
pub struct CredentialSettings {
    /// Token signing secret
    pub jwt_secret: String,

    /// Email that is granted the admin role on registration
    pub admin_email: Option<String>,
}

impl CredentialSettings {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            admin_email: None,
        }
    }

    pub fn with_admin_email(mut self, email: impl Into<String>) -> Self {
        self.admin_email = Some(email.into());
        self
    }

    fn role_for(&self, email: &str) -> UserRole {
        match &self.admin_email {
            Some(admin) if admin == email => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

/// Registration input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAccount {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,

    /// Email address
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// An identity plus a freshly issued session token
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Input failed validation
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    /// Email already registered
    #[error("User already exists")]
    DuplicateEmail,

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token malformed, expired or badly signed
    #[error("Invalid token: {0}")]
    InvalidToken(#[source] JwtError),

    /// Password hashing failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token signing failed
    #[error("Token creation failed: {0}")]
    Token(#[source] JwtError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Registers a new account and issues a session token
///
/// # Errors
///
/// - `Validation` for malformed input
/// - `DuplicateEmail` if the email exists; no row is created
pub async fn register(
    pool: &PgPool,
    settings: &CredentialSettings,
    account: NewAccount,
) -> Result<Session, CredentialError> {
    account.validate()?;

    if User::email_exists(pool, &account.email).await? {
        return Err(CredentialError::DuplicateEmail);
    }

    let password_hash = hash_blocking(account.password).await?;
    let role = settings.role_for(&account.email);

    let user = User::create(
        pool,
        CreateUser {
            name: account.name,
            email: account.email,
            password_hash,
            role,
        },
    )
    .await
    .map_err(|e| match e {
        // Lost a race with a concurrent registration
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            CredentialError::DuplicateEmail
        }
        other => CredentialError::Database(other),
    })?;

    tracing::info!(user_id = user.id, role = user.role.as_str(), "User registered");

    issue(settings, user)
}

/// Checks an email + password pair and issues a session token
///
/// Unknown emails pay the same verification cost as wrong passwords.
pub async fn authenticate(
    pool: &PgPool,
    settings: &CredentialSettings,
    email: &str,
    password: &str,
) -> Result<Session, CredentialError> {
    let user = User::find_by_email(pool, email).await?;
    let password = password.to_string();

    let user = match user {
        Some(user) => {
            let hash = user.password_hash.clone();
            let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
                .await
                .map_err(|e| PasswordError::VerifyError(e.to_string()))??;

            if !valid {
                tracing::debug!(user_id = user.id, "Login rejected: wrong password");
                return Err(CredentialError::InvalidCredentials);
            }
            user
        }
        None => {
            tokio::task::spawn_blocking(move || verify_dummy(&password))
                .await
                .map_err(|e| PasswordError::VerifyError(e.to_string()))?;

            tracing::debug!("Login rejected: unknown email");
            return Err(CredentialError::InvalidCredentials);
        }
    };

    issue(settings, user)
}

/// Resolves a session token to the identity it encodes
///
/// Purely cryptographic: no store lookup.
pub fn verify(token: &str, settings: &CredentialSettings) -> Result<AuthContext, CredentialError> {
    let claims = validate_token(token, &settings.jwt_secret).map_err(CredentialError::InvalidToken)?;

    Ok(AuthContext::from_claims(claims))
}

fn issue(settings: &CredentialSettings, user: User) -> Result<Session, CredentialError> {
    let claims = Claims::new(user.id, user.email.clone(), user.role);
    let token = create_token(&claims, &settings.jwt_secret).map_err(CredentialError::Token)?;

    Ok(Session { token, user })
}

async fn hash_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::HashError(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn account(email: &str, password: &str) -> NewAccount {
        NewAccount {
            name: "Jane".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_new_account_validation() {
        assert!(account("jane@example.com", "long-enough").validate().is_ok());
        assert!(account("not-an-email", "long-enough").validate().is_err());
        assert!(account("jane@example.com", "short").validate().is_err());

        let mut nameless = account("jane@example.com", "long-enough");
        nameless.name = String::new();
        let errors = nameless.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_role_for_admin_email() {
        let settings = CredentialSettings::new(SECRET).with_admin_email("boss@example.com");

        assert_eq!(settings.role_for("boss@example.com"), UserRole::Admin);
        assert_eq!(settings.role_for("Boss@example.com"), UserRole::User);
        assert_eq!(CredentialSettings::new(SECRET).role_for("boss@example.com"), UserRole::User);
    }

    #[test]
    fn test_issue_then_verify() {
        let settings = CredentialSettings::new(SECRET);
        let user = User {
            id: 11,
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: String::new(),
            role: UserRole::User,
            created_at: Utc::now(),
        };

        let session = issue(&settings, user).unwrap();
        let identity = verify(&session.token, &settings).unwrap();

        assert_eq!(identity.user_id, 11);
        assert_eq!(identity.email, "jane@example.com");
        assert_eq!(identity.role, UserRole::User);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let settings = CredentialSettings::new(SECRET);
        assert!(matches!(
            verify("garbage", &settings),
            Err(CredentialError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_session_serialization_hides_hash() {
        let session = Session {
            token: "t".to_string(),
            user: User {
                id: 1,
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
                password_hash: "$argon2id$x".to_string(),
                role: UserRole::User,
                created_at: Utc::now(),
            },
        };

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["token"], "t");
        assert!(json["user"].get("password_hash").is_none());
    }
}
