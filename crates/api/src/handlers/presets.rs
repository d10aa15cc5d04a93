//! Handlers for the preset catalog.
//!
//! Create and update validate every field and attachment before writing
//! anything to disk; files are written only once the request is known to
//! be acceptable, and removed again if the catalog write fails.
//!
//! Ids that do not parse as integers match no preset and answer 404.

use axum::extract::{Path, Query, Request, State};
use axum::Json;
use mograph_core::filter::{self, FilterSpec};
use mograph_core::types::DbId;
use mograph_core::upload::UploadKind;
use mograph_db::models::preset::{NewPreset, Preset};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::{MessageResponse, PresetCreatedResponse};
use crate::state::AppState;
use crate::upload::{read_preset_body, UploadedFile, MISSING_FILES_MESSAGE};

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Optional catalog filter (`?search=&type=&kategori=&format=png,mp4&size=`).
///
/// With no parameters the catalog is returned unfiltered. An absent `size`
/// means no size limit.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub preset_type: Option<String>,
    pub kategori: Option<String>,
    /// Comma-separated format list.
    pub format: Option<String>,
    /// Slider position, 0 to 100.
    pub size: Option<u8>,
}

impl CatalogQuery {
    /// The filter this query describes, or `None` when it sets nothing.
    pub fn to_filter(&self) -> Option<FilterSpec> {
        if self.search.is_none()
            && self.preset_type.is_none()
            && self.kategori.is_none()
            && self.format.is_none()
            && self.size.is_none()
        {
            return None;
        }

        let format = self
            .format
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase)
            .collect();

        Some(FilterSpec {
            search: self.search.clone().unwrap_or_default(),
            preset_type: self.preset_type.clone().unwrap_or_default(),
            kategori: self.kategori.clone().unwrap_or_default(),
            format,
            size: self.size.unwrap_or(100),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a path id. Anything that is not an integer matches no preset.
pub fn parse_preset_id(raw: &str) -> AppResult<DbId> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(format!("Preset with id {raw} not found")))
}

/// Write an accepted attachment and return its public URL.
async fn store_upload(state: &AppState, file: &UploadedFile) -> AppResult<String> {
    Ok(state
        .media
        .store(file.kind, &file.file_name, &file.bytes)
        .await?)
}

/// Undo attachment writes after a later step failed.
async fn discard_uploads(state: &AppState, urls: &[&str]) {
    for url in urls {
        if state.media.remove(url).await {
            tracing::debug!(url, "Discarded upload after failed request");
        }
    }
}

// ---------------------------------------------------------------------------
// GET /presets
// ---------------------------------------------------------------------------

/// List the catalog, optionally filtered.
pub async fn list_presets(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<Vec<Preset>>> {
    let presets = state.catalog.list().await?;

    let presets = match query.to_filter() {
        Some(criteria) => presets
            .into_iter()
            .filter(|p| criteria.matches(&p.to_card()))
            .collect(),
        None => presets,
    };

    tracing::debug!(count = presets.len(), "Listed presets");
    Ok(Json(presets))
}

// ---------------------------------------------------------------------------
// GET /presets/categories
// ---------------------------------------------------------------------------

/// Distinct categories in catalog order.
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let presets = state.catalog.list().await?;
    Ok(Json(filter::categories(
        presets.iter().map(|p| p.kategori.as_str()),
    )))
}

// ---------------------------------------------------------------------------
// POST /preset
// ---------------------------------------------------------------------------

/// Create a preset from a multipart form carrying both attachments.
pub async fn create_preset(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<PresetCreatedResponse>> {
    let form = read_preset_body(request, &state).await?;

    let (Some(image), Some(preset_file)) = (form.image, form.preset_file) else {
        return Err(AppError::BadRequest(MISSING_FILES_MESSAGE.to_string()));
    };
    let fields = form.fields.validate_all()?;

    let img_url = store_upload(&state, &image).await?;
    let file_url = match store_upload(&state, &preset_file).await {
        Ok(url) => url,
        Err(e) => {
            discard_uploads(&state, &[&img_url]).await;
            return Err(e);
        }
    };

    let new = NewPreset {
        title: fields.title,
        subtitle: fields.subtitle,
        kategori: fields.kategori,
        size: fields.size,
        format: fields.format,
        preset_type: fields.preset_type,
        author_url: fields.author_url,
        img_url: img_url.clone(),
        file_url: file_url.clone(),
    };

    let created = match state.catalog.create(new).await {
        Ok(preset) => preset,
        Err(e) => {
            discard_uploads(&state, &[&img_url, &file_url]).await;
            return Err(e.into());
        }
    };

    tracing::info!(id = created.id, title = %created.title, "Preset created");
    Ok(Json(PresetCreatedResponse {
        message: "Preset created successfully",
        preset: created,
    }))
}

// ---------------------------------------------------------------------------
// PUT /preset/{id}
// ---------------------------------------------------------------------------

/// Partially update a preset from a multipart form or a JSON object.
/// Omitted fields keep their stored values; new attachments replace the
/// URL fields. An empty body changes nothing.
pub async fn update_preset(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    request: Request,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_preset_id(&raw_id)?;
    if state.catalog.find_by_id(id).await?.is_none() {
        return Err(AppError::preset_not_found(id));
    }

    let form = read_preset_body(request, &state).await?;
    let mut changes = form.fields.into_changes()?;

    let mut written: Vec<String> = Vec::new();
    for file in [&form.image, &form.preset_file].into_iter().flatten() {
        let url = match store_upload(&state, file).await {
            Ok(url) => url,
            Err(e) => {
                let urls: Vec<&str> = written.iter().map(String::as_str).collect();
                discard_uploads(&state, &urls).await;
                return Err(e);
            }
        };
        match file.kind {
            UploadKind::Image => changes.img_url = Some(url.clone()),
            UploadKind::PresetFile => changes.file_url = Some(url.clone()),
        }
        written.push(url);
    }

    let outcome = match state.catalog.update(id, changes).await {
        Ok(Some(preset)) => Ok(preset),
        // Deleted between the lookup and the write.
        Ok(None) => Err(AppError::preset_not_found(id)),
        Err(e) => Err(AppError::from(e)),
    };
    let updated = match outcome {
        Ok(preset) => preset,
        Err(e) => {
            let urls: Vec<&str> = written.iter().map(String::as_str).collect();
            discard_uploads(&state, &urls).await;
            return Err(e);
        }
    };

    tracing::info!(id = updated.id, files = written.len(), "Preset updated");
    Ok(Json(MessageResponse {
        message: "Preset updated successfully",
    }))
}

// ---------------------------------------------------------------------------
// DELETE /preset/{id}
// ---------------------------------------------------------------------------

/// Delete a preset and, best-effort, its two attachments.
pub async fn delete_preset(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_preset_id(&raw_id)?;
    let removed = state
        .catalog
        .delete(id)
        .await?
        .ok_or_else(|| AppError::preset_not_found(id))?;

    for url in [&removed.img_url, &removed.file_url] {
        if !url.is_empty() {
            state.media.remove(url).await;
        }
    }

    tracing::info!(id, title = %removed.title, "Preset deleted");
    Ok(Json(MessageResponse {
        message: "Preset deleted successfully",
    }))
}
