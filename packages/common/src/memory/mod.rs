//! In-process collaborators.
//!
//! Used by the server binary when no external backend is configured and by
//! tests that need a store or identity provider they can inspect.

mod identity;
mod store;

pub use identity::{
    DEFAULT_LOCKOUT_WINDOW, DEFAULT_MAX_FAILED_ATTEMPTS, LockoutPolicy, MIN_PASSWORD_LENGTH,
    MemoryIdentityService,
};
pub use store::MemoryStore;
