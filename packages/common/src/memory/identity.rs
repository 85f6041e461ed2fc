use std::time::{Duration, Instant};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand_core::OsRng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::identity::{AuthError, IdentityService, is_plausible_email};
use crate::models::Identity;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Consecutive failed sign-ins after which an email is locked out.
pub const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 5;

/// How long a lockout lasts, counted from the first failure of the streak.
pub const DEFAULT_LOCKOUT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// When repeated wrong passwords block an account's sign-in, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Zero disables the lockout.
    pub max_failed_attempts: u32,
    pub window: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            window: DEFAULT_LOCKOUT_WINDOW,
        }
    }
}

struct Failures {
    count: u32,
    since: Instant,
}

struct Account {
    id: String,
    email: String,
    password_hash: String,
    disabled: bool,
}

/// Identity provider keeping accounts in memory, passwords hashed with Argon2id.
///
/// Failures are only counted for existing accounts, so the lockout table never
/// holds more entries than there are accounts.
pub struct MemoryIdentityService {
    accounts: DashMap<String, Account>,
    failed_attempts: DashMap<String, Failures>,
    lockout: LockoutPolicy,
}

impl MemoryIdentityService {
    pub fn new(lockout: LockoutPolicy) -> Self {
        Self {
            accounts: DashMap::new(),
            failed_attempts: DashMap::new(),
            lockout,
        }
    }

    /// Block sign-in for an account. Returns `false` if no such account exists.
    pub fn disable(&self, email: &str) -> bool {
        match self.accounts.get_mut(&account_key(email)) {
            Some(mut account) => {
                account.disabled = true;
                true
            }
            None => false,
        }
    }

    /// Number of emails with failures on record.
    pub fn tracked_failures(&self) -> usize {
        self.failed_attempts.len()
    }

    fn record_failure(&self, key: &str) {
        let now = Instant::now();
        let mut failures = self
            .failed_attempts
            .entry(key.to_string())
            .or_insert(Failures { count: 0, since: now });
        if now.duration_since(failures.since) >= self.lockout.window {
            *failures = Failures { count: 0, since: now };
        }
        failures.count += 1;
        if failures.count == self.lockout.max_failed_attempts {
            warn!(email = %key, attempts = failures.count, "sign-in locked after repeated failures");
        }
    }

    fn is_locked(&self, key: &str) -> bool {
        if self.lockout.max_failed_attempts == 0 {
            return false;
        }
        let (count, active) = match self.failed_attempts.get(key) {
            Some(failures) => (failures.count, failures.since.elapsed() < self.lockout.window),
            None => return false,
        };
        if active {
            return count >= self.lockout.max_failed_attempts;
        }

        let window = self.lockout.window;
        if self
            .failed_attempts
            .remove_if(key, |_, failures| failures.since.elapsed() >= window)
            .is_some()
        {
            info!(email = %key, "failed sign-ins expired");
        }
        false
    }
}

impl Default for MemoryIdentityService {
    fn default() -> Self {
        Self::new(LockoutPolicy::default())
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Unknown(format!("auth/internal-error: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[async_trait]
impl IdentityService for MemoryIdentityService {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = email.trim();
        if !is_plausible_email(email) {
            return Err(AuthError::InvalidEmail);
        }

        let key = account_key(email);
        if self.is_locked(&key) {
            return Err(AuthError::TooManyRequests);
        }

        let (identity, hash, disabled) = match self.accounts.get(&key) {
            Some(account) => (
                Identity {
                    id: account.id.clone(),
                    email: account.email.clone(),
                },
                account.password_hash.clone(),
                account.disabled,
            ),
            None => return Err(AuthError::InvalidCredential),
        };

        if disabled {
            return Err(AuthError::Disabled);
        }

        if !verify_password(password, &hash) {
            self.record_failure(&key);
            return Err(AuthError::InvalidCredential);
        }

        self.failed_attempts.remove(&key);
        debug!(user_id = %identity.id, "signed in");
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = email.trim();
        if !is_plausible_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }

        let key = account_key(email);
        if self.accounts.contains_key(&key) {
            return Err(AuthError::EmailInUse);
        }

        let password_hash = hash_password(password)?;

        // Re-checked under the entry lock in case of a concurrent sign-up.
        match self.accounts.entry(key) {
            Entry::Occupied(_) => Err(AuthError::EmailInUse),
            Entry::Vacant(slot) => {
                let identity = Identity {
                    id: Uuid::new_v4().to_string(),
                    email: email.to_string(),
                };
                slot.insert(Account {
                    id: identity.id.clone(),
                    email: identity.email.clone(),
                    password_hash,
                    disabled: false,
                });
                debug!(user_id = %identity.id, "account created");
                Ok(identity)
            }
        }
    }
}
