use std::sync::Arc;

use htmlive_common::{Bundle, UploadedFile};

/// Position of the file rendered as the preview's document root.
///
/// Priority: the first file named `index.html` in any letter case, then the
/// first file whose name ends with `.html`, otherwise none. A position rather
/// than a name, since a bundle may hold two files with the same name.
pub fn resolve_entry(files: &[UploadedFile]) -> Option<usize> {
    files
        .iter()
        .position(|f| f.name.to_lowercase() == "index.html")
        .or_else(|| files.iter().position(|f| f.name.ends_with(".html")))
}

/// Remembers the entry of the last bundle it was asked about.
///
/// Bundles are compared by identity (`Arc` pointer), not by content: a new
/// bundle value is always resolved again.
#[derive(Debug, Default)]
pub struct EntryPointCache {
    cached: Option<(Bundle, Option<usize>)>,
    misses: usize,
}

impl EntryPointCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, files: &Bundle) -> Option<usize> {
        match &self.cached {
            Some((seen, entry)) if Arc::ptr_eq(seen, files) => *entry,
            _ => {
                self.misses += 1;
                let entry = resolve_entry(files);
                self.cached = Some((Arc::clone(files), entry));
                entry
            }
        }
    }

    /// How many times the entry had to be computed.
    pub fn misses(&self) -> usize {
        self.misses
    }
}
