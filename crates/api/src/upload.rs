//! Body extraction for preset submissions.
//!
//! Multipart forms are read whole into memory before anything touches disk.
//! File parts are checked against the upload rules as soon as their headers
//! arrive and are size-limited while streaming; text parts are collected
//! into [`PresetFields`]. JSON bodies carry text fields only.

use axum::body::Bytes;
use axum::extract::multipart::Field;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use mograph_core::error::CoreError;
use mograph_core::preset::{
    self, FIELD_AUTHOR_URL, FIELD_FORMAT, FIELD_KATEGORI, FIELD_SIZE, FIELD_SUBTITLE,
    FIELD_TITLE, FIELD_TYPE,
};
use mograph_core::upload::{self, UploadKind};
use mograph_db::models::preset::PresetChanges;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Message for a create request with a missing business field.
pub const MISSING_FIELDS_MESSAGE: &str = "All fields, an image, and a preset file are required";

/// Message for a create request without both attachments.
pub const MISSING_FILES_MESSAGE: &str = "Image and preset file are required";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An accepted attachment, still in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub kind: UploadKind,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Business text fields as submitted. Blank values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresetFields {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub kategori: Option<String>,
    pub size: Option<String>,
    pub format: Option<String>,
    #[serde(rename = "type")]
    pub preset_type: Option<String>,
    pub author_url: Option<String>,
}

/// Every business field of a create request, validated.
#[derive(Debug, Clone)]
pub struct ValidatedFields {
    pub title: String,
    pub subtitle: String,
    pub kategori: String,
    pub size: String,
    pub format: String,
    pub preset_type: String,
    /// Normalized to an absolute URL.
    pub author_url: String,
}

/// A parsed preset submission.
#[derive(Debug, Default)]
pub struct PresetForm {
    pub fields: PresetFields,
    pub image: Option<UploadedFile>,
    pub preset_file: Option<UploadedFile>,
}

// ---------------------------------------------------------------------------
// Field handling
// ---------------------------------------------------------------------------

impl PresetFields {
    /// Record a text part. Unknown names are ignored; repeats keep the last value.
    fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            FIELD_TITLE => &mut self.title,
            FIELD_SUBTITLE => &mut self.subtitle,
            FIELD_KATEGORI => &mut self.kategori,
            FIELD_SIZE => &mut self.size,
            FIELD_FORMAT => &mut self.format,
            FIELD_TYPE => &mut self.preset_type,
            FIELD_AUTHOR_URL => &mut self.author_url,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Require all seven fields, then check size and author URL.
    pub fn validate_all(self) -> Result<ValidatedFields, CoreError> {
        fn take(value: Option<String>) -> Result<String, CoreError> {
            value
                .filter(|v| preset::is_present(Some(v)))
                .ok_or_else(|| CoreError::Validation(MISSING_FIELDS_MESSAGE.to_string()))
        }

        let fields = ValidatedFields {
            title: take(self.title)?,
            subtitle: take(self.subtitle)?,
            kategori: take(self.kategori)?,
            size: take(self.size)?,
            format: take(self.format)?,
            preset_type: take(self.preset_type)?,
            author_url: take(self.author_url)?,
        };

        preset::validate_size(&fields.size)?;
        let author_url = preset::normalize_author_url(&fields.author_url)?;

        Ok(ValidatedFields {
            author_url,
            ..fields
        })
    }

    /// Turn the supplied fields into a partial update, validating a new
    /// size or author URL exactly as create does.
    pub fn into_changes(self) -> Result<PresetChanges, CoreError> {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| preset::is_present(Some(v)))
        }

        let size = keep(self.size);
        if let Some(size) = &size {
            preset::validate_size(size)?;
        }

        let author_url = keep(self.author_url)
            .map(|url| preset::normalize_author_url(&url))
            .transpose()?;

        Ok(PresetChanges {
            title: keep(self.title),
            subtitle: keep(self.subtitle),
            kategori: keep(self.kategori),
            size,
            format: keep(self.format),
            preset_type: keep(self.preset_type),
            author_url,
            img_url: None,
            file_url: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Body reading
// ---------------------------------------------------------------------------

/// How a submission body is encoded, judged from its `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Multipart,
    Json,
    /// Anything else, including no body at all. Carries no fields.
    Other,
}

impl BodyKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase())
            .unwrap_or_default();
        match mime.as_str() {
            "multipart/form-data" => Self::Multipart,
            "application/json" => Self::Json,
            _ => Self::Other,
        }
    }
}

/// Read a preset submission in whichever encoding it arrived.
///
/// Multipart goes through [`read_preset_form`]. A JSON object fills the
/// text fields; an empty JSON body counts as `{}`. Other bodies are
/// ignored and yield an empty form.
pub async fn read_preset_body<S>(request: Request, state: &S) -> AppResult<PresetForm>
where
    S: Send + Sync,
{
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match BodyKind::from_content_type(content_type) {
        BodyKind::Multipart => {
            let multipart = Multipart::from_request(request, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            read_preset_form(multipart).await
        }
        BodyKind::Json => {
            let bytes = Bytes::from_request(request, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(PresetForm {
                fields: parse_json_fields(&bytes)?,
                ..PresetForm::default()
            })
        }
        BodyKind::Other => Ok(PresetForm::default()),
    }
}

/// Parse a JSON object of text fields. Unknown keys are ignored.
pub fn parse_json_fields(bytes: &[u8]) -> AppResult<PresetFields> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(PresetFields::default());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}

/// Read a preset submission.
///
/// Fails with 400 on malformed multipart, a file under an unexpected field
/// name, a repeated file field, a disallowed type or extension, or a file
/// over the size limit.
pub async fn read_preset_form(mut multipart: Multipart) -> AppResult<PresetForm> {
    let mut form = PresetForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.fields.set(&name, value);
            continue;
        };

        let kind = UploadKind::from_field_name(&name)
            .ok_or_else(|| AppError::BadRequest(format!("Unexpected file field '{name}'")))?;

        let content_type = field.content_type().map(str::to_string);
        let bytes = read_file_part(kind, &file_name, content_type.as_deref(), field).await?;

        // An untouched file input submits an empty, unnamed part.
        let Some(bytes) = bytes else {
            continue;
        };

        let slot = match kind {
            UploadKind::Image => &mut form.image,
            UploadKind::PresetFile => &mut form.preset_file,
        };
        if slot.is_some() {
            return Err(AppError::BadRequest(format!(
                "Only one '{}' file is allowed",
                kind.field_name()
            )));
        }
        *slot = Some(UploadedFile {
            kind,
            file_name,
            content_type,
            bytes,
        });
    }

    Ok(form)
}

/// Validate and buffer one file part. `Ok(None)` for an empty unnamed part.
async fn read_file_part(
    kind: UploadKind,
    file_name: &str,
    content_type: Option<&str>,
    mut field: Field<'_>,
) -> AppResult<Option<Vec<u8>>> {
    let mut bytes = Vec::new();

    if file_name.is_empty() {
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            bytes.extend_from_slice(&chunk);
            upload::validate_upload_size(kind, bytes.len())?;
        }
        if bytes.is_empty() {
            return Ok(None);
        }
    }

    upload::validate_upload(kind, content_type, file_name)?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        upload::validate_upload_size(kind, bytes.len() + chunk.len())?;
        bytes.extend_from_slice(&chunk);
    }

    Ok(Some(bytes))
}
