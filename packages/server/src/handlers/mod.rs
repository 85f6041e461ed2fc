pub mod auth;
mod bundle;
pub mod preview;
pub mod request;

pub use bundle::bundle_body_limit;
