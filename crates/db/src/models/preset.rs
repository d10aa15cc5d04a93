//! Preset record model and DTOs.

use mograph_core::filter::CatalogCard;
use mograph_core::types::DbId;
use serde::{Deserialize, Serialize};

/// One entry of the catalog document.
///
/// Field order matches the stored JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: DbId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub kategori: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub format: String,
    #[serde(rename = "type", default)]
    pub preset_type: String,
    #[serde(default)]
    pub img_url: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub author_url: String,
}

/// A validated preset ready for insertion. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPreset {
    pub title: String,
    pub subtitle: String,
    pub kategori: String,
    pub size: String,
    pub format: String,
    pub preset_type: String,
    pub author_url: String,
    pub img_url: String,
    pub file_url: String,
}

/// Partial update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetChanges {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub kategori: Option<String>,
    pub size: Option<String>,
    pub format: Option<String>,
    pub preset_type: Option<String>,
    pub author_url: Option<String>,
    pub img_url: Option<String>,
    pub file_url: Option<String>,
}

impl NewPreset {
    pub fn into_preset(self, id: DbId) -> Preset {
        Preset {
            id,
            title: self.title,
            subtitle: self.subtitle,
            kategori: self.kategori,
            size: self.size,
            format: self.format,
            preset_type: self.preset_type,
            img_url: self.img_url,
            file_url: self.file_url,
            author_url: self.author_url,
        }
    }
}

impl PresetChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Preset {
    /// Overwrite every field present in `changes`.
    pub fn apply(&mut self, changes: PresetChanges) {
        fn set(slot: &mut String, value: Option<String>) {
            if let Some(v) = value {
                *slot = v;
            }
        }

        set(&mut self.title, changes.title);
        set(&mut self.subtitle, changes.subtitle);
        set(&mut self.kategori, changes.kategori);
        set(&mut self.size, changes.size);
        set(&mut self.format, changes.format);
        set(&mut self.preset_type, changes.preset_type);
        set(&mut self.author_url, changes.author_url);
        set(&mut self.img_url, changes.img_url);
        set(&mut self.file_url, changes.file_url);
    }

    /// Display projection used by the catalog filter engine.
    pub fn to_card(&self) -> CatalogCard {
        CatalogCard::new(
            self.id,
            &self.title,
            &self.subtitle,
            &self.kategori,
            &self.size,
            &self.format,
            &self.preset_type,
            &self.img_url,
            &self.file_url,
            &self.author_url,
        )
    }
}
