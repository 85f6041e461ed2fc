//! In-memory static site preview: pick the document root of a bundle and
//! render it in an isolated frame.

mod render;
mod resolver;

pub use render::{ENTRY_NOT_FOUND, render_preview};
pub use resolver::{EntryPointCache, resolve_entry};
