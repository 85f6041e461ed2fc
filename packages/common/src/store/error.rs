/// Errors that can occur while talking to the document store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or refused to serve the call.
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    /// The store rejected the document (permissions, schema).
    #[error("write rejected: {0}")]
    Rejected(String),
    /// The live query failed and will deliver no further snapshots.
    #[error("subscription failed: {0}")]
    Subscription(String),
}
