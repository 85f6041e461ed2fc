mod error;
mod subscription;
mod traits;

pub use error::StoreError;
pub use subscription::{Snapshot, Subscription};
pub use traits::DocumentStore;
