use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A fully buffered `multipart/form-data` body: text fields by name, files in
/// arrival order.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(malformed)?;
                    // Browsers send an empty part for an untouched file input.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.push(UploadedFile {
                        field: name,
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                None => {
                    let text = field.text().await.map_err(malformed)?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed text value; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Untrimmed value for fields where whitespace is significant
    /// (passwords). Only an empty value is rejected.
    pub fn require_raw(&self, name: &str) -> Result<&str, AppError> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::invalid(name, "This field is required."))
    }

    pub fn require(&self, name: &str) -> Result<&str, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::invalid(name, "This field is required."))
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let idx = self.files.iter().position(|f| f.field == name)?;
        Some(self.files.remove(idx))
    }

    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        let (taken, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.field == name);
        self.files = rest;
        taken
    }

    #[cfg(test)]
    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    #[cfg(test)]
    pub fn with_file(mut self, name: &str, file_name: &str, body: &'static [u8]) -> Self {
        self.files.push(UploadedFile {
            field: name.to_string(),
            file_name: file_name.to_string(),
            content_type: None,
            bytes: Bytes::from_static(body),
        });
        self
    }
}

fn malformed(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    #[test]
    fn test_blank_text_is_absent() {
        let form = FormData::default().with_text("phone", "   ");
        assert_eq!(form.text("phone"), None);
        assert!(matches!(
            form.require("phone"),
            Err(AppError::Invalid { ref field, .. }) if field == "phone"
        ));
    }

    #[test]
    fn test_raw_keeps_surrounding_whitespace() {
        let form = FormData::default()
            .with_text("password", "  s3cret  ")
            .with_text("blank", "");
        assert_eq!(form.require_raw("password").unwrap(), "  s3cret  ");
        assert!(form.require_raw("blank").is_err());
        assert!(form.require_raw("missing").is_err());
    }

    #[test]
    fn test_take_files_keeps_others() {
        let mut form = FormData::default()
            .with_file("images", "a.png", b"a")
            .with_file("avatar", "me.png", b"m")
            .with_file("images", "b.png", b"b");

        let images = form.take_files("images");
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].file_name, "b.png");
        assert!(form.take_file("avatar").is_some());
        assert!(form.take_file("avatar").is_none());
    }

    #[tokio::test]
    async fn test_parses_text_and_files() {
        let body = concat!(
            "--XBOUND\r\n",
            "Content-Disposition: form-data; name=\"name\"\r\n\r\n",
            "Backend CV\r\n",
            "--XBOUND\r\n",
            "Content-Disposition: form-data; name=\"cv\"; filename=\"cv.pdf\"\r\n",
            "Content-Type: application/pdf\r\n\r\n",
            "%PDF-1.4\r\n",
            "--XBOUND--\r\n",
        );
        let request = Request::builder()
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUND")
            .body(Body::from(body))
            .unwrap();
        let multipart = Multipart::from_request(request, &()).await.unwrap();

        let mut form = FormData::from_multipart(multipart).await.unwrap();
        assert_eq!(form.text("name"), Some("Backend CV"));
        let cv = form.take_file("cv").unwrap();
        assert_eq!(cv.file_name, "cv.pdf");
        assert_eq!(cv.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(&cv.bytes[..], b"%PDF-1.4");
    }
}
