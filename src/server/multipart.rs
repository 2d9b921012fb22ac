//! Collecting named uploads out of a multipart body.

use axum::extract::Multipart;
use bytes::Bytes;

use crate::error::{ApiError, AppResult};

/// A single uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied file name; empty when the part carried none.
    pub file_name: String,
    pub bytes: Bytes,
}

/// Uploads keyed by their multipart field name, in arrival order.
#[derive(Debug, Default)]
pub struct Uploads {
    parts: Vec<(String, Upload)>,
}

impl Uploads {
    /// Drain the multipart stream, keeping only the fields listed in `wanted`.
    pub async fn collect(mut multipart: Multipart, wanted: &[&str]) -> AppResult<Self> {
        let mut uploads = Uploads::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if !wanted.contains(&name.as_str()) {
                continue;
            }

            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;

            tracing::debug!(field = %name, file_name = %file_name, size = bytes.len(), "Received upload");
            uploads.parts.push((name, Upload { file_name, bytes }));
        }

        Ok(uploads)
    }

    /// Take the first upload for `field`, or fail with a 400.
    pub fn take(&mut self, field: &str) -> AppResult<Upload> {
        let index = self
            .parts
            .iter()
            .position(|(name, _)| name == field)
            .ok_or_else(|| ApiError::BadRequest(format!("Missing multipart field '{field}'")))?;
        Ok(self.parts.remove(index).1)
    }
}
