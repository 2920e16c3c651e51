//! Input validation for workshop submissions and file uploads.
//!
//! Failures are field-scoped and collected rather than raised on the first
//! problem, so a caller can surface every issue in one response.

use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::{
    error::{Error, Result, ValidationErrors},
    models::requests::{FileUpload, WorkshopForm},
    models::workshops::Mode,
};

pub const MAX_UPLOAD_MB: usize = 10;
pub const MAX_UPLOAD_BYTES: usize = MAX_UPLOAD_MB * 1024 * 1024;

/// Accumulator for field-scoped validation errors.
///
/// The first message recorded for a field wins; later ones for the same
/// field are dropped, matching one-inline-message-per-field rendering.
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if !self.fields.iter().any(|(f, _)| *f == field) {
            self.fields.push((field, message.into()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(f, _)| f == field)
    }

    /// Ok when nothing was recorded, otherwise the collected validation error.
    pub fn into_result(self) -> Result<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(ValidationErrors::Multiple {
                fields: HashMap::from_iter(self.fields),
            }))
        }
    }
}

/// Decodes an uploaded file and enforces the size cap.
///
/// Records a field error (and returns `None`) for undecodable content or a
/// payload over 10 MB, regardless of file type.
pub fn decode_upload(field: &str, upload: &FileUpload, errors: &mut FieldErrors) -> Option<Vec<u8>> {
    let bytes = match BASE64.decode(upload.content.as_bytes()) {
        Ok(bytes) => bytes,
        Err(_) => {
            errors.add(field, "File content is not valid base64");
            return None;
        }
    };

    if bytes.len() > MAX_UPLOAD_BYTES {
        errors.add(field, format!("File too large (>{MAX_UPLOAD_MB} MB)"));
        return None;
    }

    Some(bytes)
}

/// Records an error unless the filename ends in ".pdf" (case-insensitive).
pub fn require_pdf(field: &str, filename: &str, errors: &mut FieldErrors) {
    if !filename.to_lowercase().ends_with(".pdf") {
        errors.add(field, "Only PDF files are allowed");
    }
}

/// Loose structural check for contact email addresses.
pub fn email_looks_valid(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.len() > 254 || email.contains(' ') {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Validates a workshop create/edit payload.
///
/// Covers the required fields, the mode cross-field constraints, and the
/// agenda file constraints. The decoded agenda bytes are returned so the
/// caller does not decode twice; `None` when no agenda was uploaded or the
/// upload failed validation.
pub fn validate_workshop_form(
    form: &WorkshopForm,
    require_email: bool,
    errors: &mut FieldErrors,
) -> Option<Vec<u8>> {
    if form.title.trim().is_empty() {
        errors.add("title", "Title is required");
    }

    match form.mode {
        Mode::Online => {
            if form.online_link.trim().is_empty() {
                errors.add("online_link", "Online link is required for online mode");
            }
        }
        Mode::Physical => {
            if form.city.trim().is_empty() && form.institute.trim().is_empty() {
                errors.add("city", "City or Institute is required for physical mode");
            }
        }
    }

    let email = form.coordinator_email.trim();
    if email.is_empty() {
        if require_email {
            errors.add("coordinator_email", "Coordinator email is required");
        }
    } else if !email_looks_valid(email) {
        errors.add("coordinator_email", "Enter a valid email address");
    }

    if form.coordinator_phone.trim().is_empty() {
        errors.add("coordinator_phone", "Coordinator phone is required");
    }

    if form.participants_count.is_some_and(|count| count < 0) {
        errors.add("participants_count", "Participants count cannot be negative");
    }

    let upload = form.agenda_pdf.as_ref()?;
    require_pdf("agenda_pdf", &upload.filename, errors);
    let bytes = decode_upload("agenda_pdf", upload, errors)?;
    if errors.contains("agenda_pdf") {
        return None;
    }
    Some(bytes)
}
