pub mod filename;
pub mod identity;
pub mod memory;
pub mod models;
pub mod request_status;
pub mod store;
pub mod upload;

pub use identity::{AuthError, IdentityService};
pub use models::{
    Bundle, DeletionRequest, Identity, NewDeletionRequest, NewSiteRequest, ProjectState,
    SiteRequest, UploadedFile,
};
pub use request_status::{EffectiveStatus, RequestStatus};
pub use store::{DocumentStore, StoreError, Subscription};
pub use upload::{RawFile, UploadError, UploadLimits};
