//! Upload acceptance rules for preset attachments.
//!
//! A preset submission carries at most one `image` and one `presetFile`.
//! This module decides whether a declared content type and filename are
//! acceptable for a field, and how stored files are named.

use std::path::Path;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum size of a single uploaded file (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Prefix of every generated attachment filename.
pub const GENERATED_NAME_PREFIX: &str = "preset-";

// ---------------------------------------------------------------------------
// Allow-lists
// ---------------------------------------------------------------------------

/// Content types accepted for the `image` field.
pub const IMAGE_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Content types accepted for the `presetFile` field.
///
/// Browsers report `.xml` as either `text/xml` or `application/xml`.
pub const PRESET_FILE_CONTENT_TYPES: &[&str] = &[
    "text/xml",
    "application/xml",
    "application/zip",
    "image/png",
    "image/jpeg",
];

/// Extensions accepted for the `presetFile` field (lower-case, with dot).
pub const PRESET_FILE_EXTENSIONS: &[&str] = &[".xml", ".zip", ".png", ".jpeg", ".jpg"];

pub const IMAGE_TYPE_MESSAGE: &str = "Only PNG or JPEG images are allowed";
pub const PRESET_FILE_TYPE_MESSAGE: &str =
    "Only XML, ZIP, PNG, or JPEG files are allowed for preset";

// ---------------------------------------------------------------------------
// UploadKind
// ---------------------------------------------------------------------------

/// Which attachment slot a multipart file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadKind {
    Image,
    PresetFile,
}

impl UploadKind {
    /// Resolve a multipart field name. Unknown names yield `None`.
    pub fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "image" => Some(Self::Image),
            "presetFile" => Some(Self::PresetFile),
            _ => None,
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::PresetFile => "presetFile",
        }
    }

    /// Subdirectory of the public root the file is stored under.
    pub fn subdirectory(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::PresetFile => "file",
        }
    }

    /// Public URL for a stored file of this kind.
    pub fn public_url(self, file_name: &str) -> String {
        format!("/{}/{file_name}", self.subdirectory())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Strip MIME parameters and lower-case (`"Image/PNG; q=1"` -> `"image/png"`).
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

/// Extension of `file_name` including the dot, original case preserved.
/// Dotfiles such as `.bashrc` have no extension.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

/// Check a declared content type and filename against the rules for `kind`.
///
/// `image` is judged by content type alone; `presetFile` must pass both
/// the content-type and the extension check.
pub fn validate_upload(
    kind: UploadKind,
    content_type: Option<&str>,
    file_name: &str,
) -> Result<(), CoreError> {
    let content_type = normalize_content_type(content_type.unwrap_or_default());

    match kind {
        UploadKind::Image => {
            if !IMAGE_CONTENT_TYPES.contains(&content_type.as_str()) {
                return Err(CoreError::Validation(IMAGE_TYPE_MESSAGE.to_string()));
            }
        }
        UploadKind::PresetFile => {
            let ext = file_extension(file_name).to_ascii_lowercase();
            if !PRESET_FILE_CONTENT_TYPES.contains(&content_type.as_str())
                || !PRESET_FILE_EXTENSIONS.contains(&ext.as_str())
            {
                return Err(CoreError::Validation(PRESET_FILE_TYPE_MESSAGE.to_string()));
            }
        }
    }
    Ok(())
}

/// Reject files over [`MAX_UPLOAD_BYTES`].
pub fn validate_upload_size(kind: UploadKind, size: usize) -> Result<(), CoreError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "File '{}' exceeds the maximum size of {} MB",
            kind.field_name(),
            MAX_UPLOAD_BYTES / 1024 / 1024
        )));
    }
    Ok(())
}

/// Name a stored attachment `preset-<unix millis><original extension>`.
pub fn generated_file_name(now_millis: i64, original_name: &str) -> String {
    format!(
        "{GENERATED_NAME_PREFIX}{now_millis}{}",
        file_extension(original_name)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
