use askama::Template;
use htmlive_common::{ProjectState, UploadedFile};

/// Placeholder shown when a bundle has no HTML document.
pub const ENTRY_NOT_FOUND: &str = "Entry point not found";

const DEFAULT_SUBTITLE: &str = "Your HTMLIVE project";

struct FileRow<'a> {
    name: &'a str,
    active: bool,
}

/// The preview page. Every interpolated value is HTML-escaped, including the
/// entry document placed in the frame's `srcdoc` attribute.
#[derive(Template)]
#[template(path = "preview.html")]
struct PreviewTemplate<'a> {
    project: &'a ProjectState,
    initial: String,
    subtitle: &'a str,
    files: Vec<FileRow<'a>>,
    entry: Option<&'a UploadedFile>,
    entry_not_found: &'static str,
}

/// Render the preview page for a project.
///
/// `entry` is the position of the document root in `project.files`, as picked
/// by the resolver. Its raw content runs inside a sandboxed `srcdoc` frame: its
/// own scripts and styles execute, but it gets an opaque origin and cannot
/// navigate the hosting page. No I/O happens here.
pub fn render_preview(project: &ProjectState, entry: Option<usize>) -> askama::Result<String> {
    let subtitle = if project.description.is_empty() {
        DEFAULT_SUBTITLE
    } else {
        &project.description
    };

    PreviewTemplate {
        project,
        initial: project
            .name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default(),
        subtitle,
        files: project
            .files
            .iter()
            .enumerate()
            .map(|(i, file)| FileRow {
                name: &file.name,
                active: entry == Some(i),
            })
            .collect(),
        entry: entry.and_then(|i| project.files.get(i)),
        entry_not_found: ENTRY_NOT_FOUND,
    }
    .render()
}
