use std::sync::Arc;

use htmlive_common::{AuthError, Identity, IdentityService};
use tokio::sync::watch;
use tracing::info;

/// The signed-in identity of one client, observable for changes.
pub struct Session {
    service: Arc<dyn IdentityService>,
    tx: watch::Sender<Option<Identity>>,
}

impl Session {
    pub fn new(service: Arc<dyn IdentityService>) -> Self {
        let (tx, _) = watch::channel(None);
        Self { service, tx }
    }

    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    /// Watch the identity. The receiver reports the current value as its first
    /// change, then every sign-in and sign-out until it is dropped.
    pub fn observe(&self) -> watch::Receiver<Option<Identity>> {
        let mut rx = self.tx.subscribe();
        rx.mark_changed();
        rx
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.service.sign_in(email, password).await?;
        info!(user_id = %identity.id, "session signed in");
        self.tx.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    /// Create an account and sign into it.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.service.sign_up(email, password).await?;
        info!(user_id = %identity.id, "session signed up");
        self.tx.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    pub fn sign_out(&self) {
        if self.tx.send_replace(None).is_some() {
            info!("session signed out");
        }
    }
}
