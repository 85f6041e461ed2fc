use std::sync::Arc;

use htmlive_common::{DocumentStore, IdentityService};

use crate::config::AppConfig;
use crate::submitter::RequestSubmitter;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn submitter(&self) -> RequestSubmitter {
        RequestSubmitter::new(self.store.clone(), self.config.upload.limits())
    }
}
