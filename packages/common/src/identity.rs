use async_trait::async_trait;

use crate::models::Identity;

/// Failures reported by an identity service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credential")]
    InvalidCredential,
    #[error("invalid email")]
    InvalidEmail,
    #[error("too many requests")]
    TooManyRequests,
    #[error("user disabled")]
    Disabled,
    #[error("email already in use")]
    EmailInUse,
    #[error("weak password")]
    WeakPassword,
    /// Any code the service reports that has no dedicated variant.
    #[error("authentication failed: {0}")]
    Unknown(String),
}

impl AuthError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidCredential => "auth/invalid-credential",
            Self::InvalidEmail => "auth/invalid-email",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::Disabled => "auth/user-disabled",
            Self::EmailInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::Unknown(code) => code,
        }
    }
}

/// Credential-based identity provider.
///
/// Implementations trim the email before use.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Authenticate an existing account.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Create an account and return its identity.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
}

/// Shallow syntactic check: one `@`, non-empty local part, dotted domain.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
