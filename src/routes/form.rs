//! Form extractor for the solve routes.
//!
//! Accepts `multipart/form-data` and `application/x-www-form-urlencoded`
//! bodies. Text fields are collected by name; a part carrying a filename
//! is kept as the upload. Malformed bodies are reported as 422, oversized
//! ones as 413.

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form,
};
use bytes::Bytes;
use std::collections::HashMap;

use crate::types::AppError;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Bytes,
}

#[derive(Debug, Default)]
pub struct SolveForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl SolveForm {
    /// A text field that must be present.
    pub fn require_text(&self, name: &str) -> Result<&str, AppError> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| AppError::Validation(format!("Field required: {}", name)))
    }

    /// Take ownership of an upload that must be present.
    pub fn take_file(&mut self, name: &str) -> Result<UploadedFile, AppError> {
        self.files
            .remove(name)
            .ok_or_else(|| AppError::Validation(format!("Field required: {}", name)))
    }
}

impl<S> FromRequest<S> for SolveForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with(mime::MULTIPART_FORM_DATA.as_ref()));

        if !is_multipart {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| form_error(e.status(), e.body_text()))?;
            return Ok(Self {
                fields,
                files: HashMap::new(),
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| form_error(e.status(), e.body_text()))?;

        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| form_error(e.status(), e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);

            match filename {
                Some(filename) => {
                    let content = field
                        .bytes()
                        .await
                        .map_err(|e| form_error(e.status(), e.body_text()))?;
                    form.files.insert(name, UploadedFile { filename, content });
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| form_error(e.status(), e.body_text()))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }
}

/// Oversized bodies keep their 413; everything else is a malformed form.
fn form_error(status: StatusCode, detail: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(detail)
    } else {
        AppError::Validation(detail)
    }
}
