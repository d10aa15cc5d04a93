//! Response bodies shared by the preset handlers.

use mograph_db::models::preset::Preset;
use serde::Serialize;

/// `{ "message": ... }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `{ "message": ..., "preset": ... }` returned by create.
#[derive(Debug, Serialize)]
pub struct PresetCreatedResponse {
    pub message: &'static str,
    pub preset: Preset,
}
