//! File uploads (avatars, CVs, company images) stored in S3.
//!
//! Only the object key is persisted; responses resolve it against the public
//! base URL, or render `""` when no file is attached.

pub mod form;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
pub use form::{FormData, UploadedFile};

#[derive(Clone)]
pub struct Storage {
    client: S3Client,
    bucket: String,
    public_url: String,
}

impl Storage {
    pub fn new(client: S3Client, bucket: impl Into<String>, public_url: &str) -> Self {
        Storage {
            client,
            bucket: bucket.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Uploads a file under `prefix/` and returns its object key.
    pub async fn put(&self, prefix: &str, file: UploadedFile) -> Result<String, AppError> {
        let key = object_key(prefix, Uuid::new_v4(), &file.file_name);
        let content_type = file
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

        info!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(key)
    }

    /// Removes uploads whose database row was never written. Failures are
    /// logged only.
    pub async fn discard(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self
                .client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
            {
                warn!("Failed to remove orphaned upload {key}: {e}");
            }
        }
    }

    pub fn url(&self, key: Option<&str>) -> String {
        resolve_url(&self.public_url, key)
    }
}

fn resolve_url(base: &str, key: Option<&str>) -> String {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() => format!("{base}/{k}"),
        _ => String::new(),
    }
}

fn object_key(prefix: &str, id: Uuid, file_name: &str) -> String {
    format!("{}/{}-{}", prefix.trim_matches('/'), id, sanitize_file_name(file_name))
}

/// Keeps ASCII letters, digits, `.`, `-` and `_`; everything else becomes `_`.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}
