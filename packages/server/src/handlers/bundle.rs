//! Reading a submission or preview form out of a multipart body.

use axum::extract::{DefaultBodyLimit, Multipart};
use htmlive_common::RawFile;

use crate::config::UploadConfig;
use crate::error::AppError;

/// Room for multipart framing and the text fields on top of the file bytes.
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

pub fn bundle_body_limit(config: &UploadConfig) -> DefaultBodyLimit {
    let limit = config.max_total_bytes.saturating_add(FORM_OVERHEAD_BYTES);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

/// Fields of a bundle form. Files keep the order of their parts.
#[derive(Debug, Default)]
pub struct BundleForm {
    pub name: String,
    pub description: String,
    pub files: Vec<RawFile>,
}

pub async fn read_bundle_form(mut multipart: Multipart) -> Result<BundleForm, AppError> {
    let mut form = BundleForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("name") => {
                form.name = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read name: {e}")))?;
            }
            Some("description") => {
                form.description = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read description: {e}"))
                })?;
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let mime_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                // An empty file input still sends one nameless part.
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                form.files.push(RawFile::from_bytes(file_name, mime_type, data.to_vec()));
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(form)
}
