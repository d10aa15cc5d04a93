//! Catalog filter engine.
//!
//! The catalog is fetched once into a snapshot of [`CatalogCard`]s; every
//! filter change re-derives the displayed set from that snapshot, never
//! from the server. Filtering is a pure function of the snapshot and the
//! current [`FilterSpec`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::preset::size_in_mb;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Size slider upper bound in MB (slider value 100).
pub const SIZE_SLIDER_MAX_MB: f64 = 5.0;

/// Slider value a fresh or reset filter starts at (2.5 MB).
pub const DEFAULT_SIZE_SLIDER: u8 = 50;

/// Slider values within this distance of a whole-MB checkpoint snap to it.
pub const SIZE_SNAP_THRESHOLD: i32 = 5;

/// Author label shown on every card; records carry no author name.
pub const DEFAULT_AUTHOR: &str = "User";

/// Link used when a record has no author URL.
pub const NO_AUTHOR_URL: &str = "#";

/// Tag appended to every card.
pub const FREE_TAG: &str = "Free";

// ---------------------------------------------------------------------------
// CatalogCard
// ---------------------------------------------------------------------------

/// Display projection of a preset record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCard {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub author: String,
    pub size: String,
    pub size_mb: f64,
    pub img_url: String,
    #[serde(rename = "type")]
    pub preset_type: String,
    pub kategori: String,
    /// Lower-cased.
    pub format: String,
    pub file_url: String,
    pub author_url: String,
}

impl CatalogCard {
    /// Build a card from the stored fields of a preset record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DbId,
        title: &str,
        subtitle: &str,
        kategori: &str,
        size: &str,
        format: &str,
        preset_type: &str,
        img_url: &str,
        file_url: &str,
        author_url: &str,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: subtitle.to_string(),
            tags: vec![
                kategori.to_string(),
                preset_type.to_string(),
                FREE_TAG.to_string(),
            ],
            author: DEFAULT_AUTHOR.to_string(),
            size: size.to_string(),
            size_mb: size_in_mb(size),
            img_url: img_url.to_string(),
            preset_type: preset_type.to_string(),
            kategori: kategori.to_string(),
            format: format.to_lowercase(),
            file_url: file_url.to_string(),
            author_url: author_link(author_url),
        }
    }
}

/// The stored author URL, or [`NO_AUTHOR_URL`] when it is blank.
pub fn author_link(author_url: &str) -> String {
    if author_url.trim().is_empty() {
        NO_AUTHOR_URL.to_string()
    } else {
        author_url.to_string()
    }
}

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// The five independent filter criteria. Empty criteria are inactive,
/// except `size`, which always applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub search: String,
    #[serde(rename = "type")]
    pub preset_type: String,
    pub kategori: String,
    pub format: BTreeSet<String>,
    /// Slider position, 0 to 100.
    pub size: u8,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            search: String::new(),
            preset_type: String::new(),
            kategori: String::new(),
            format: BTreeSet::new(),
            size: DEFAULT_SIZE_SLIDER,
        }
    }
}

impl FilterSpec {
    /// A filter that hides nothing (slider at its maximum).
    pub fn show_all() -> Self {
        Self {
            size: 100,
            ..Self::default()
        }
    }

    /// Clear every criterion and return the slider to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Maximum card size in MB selected by the slider.
    pub fn max_size_mb(&self) -> f64 {
        max_size_mb(self.size)
    }

    /// AND of every active criterion, checked in order: search, type,
    /// kategori, format, size.
    pub fn matches(&self, card: &CatalogCard) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty()
            && !card.title.to_lowercase().contains(&needle)
            && !card.author.to_lowercase().contains(&needle)
        {
            return false;
        }

        if !self.preset_type.is_empty() && card.preset_type != self.preset_type {
            return false;
        }

        if !self.kategori.is_empty() && card.kategori != self.kategori {
            return false;
        }

        if !self.format.is_empty() {
            let format = card.format.to_lowercase();
            if !self.format.iter().any(|f| f.to_lowercase() == format) {
                return false;
            }
        }

        card.size_mb <= self.max_size_mb()
    }
}

/// Map a 0-100 slider value linearly onto 0-5 MB.
pub fn max_size_mb(slider: u8) -> f64 {
    f64::from(slider.min(100)) / 100.0 * SIZE_SLIDER_MAX_MB
}

/// Clamp a raw slider value to 0-100 and snap it to the nearest whole-MB
/// checkpoint (0, 20, ... 100) when within [`SIZE_SNAP_THRESHOLD`].
pub fn snap_size(value: i32) -> u8 {
    let value = value.clamp(0, 100);
    let step = (100.0 / SIZE_SLIDER_MAX_MB) as i32;

    let nearest = (0..=100)
        .step_by(step as usize)
        .min_by_key(|checkpoint: &i32| (value - checkpoint).abs())
        .unwrap_or(value);

    let snapped = if (value - nearest).abs() <= SIZE_SNAP_THRESHOLD {
        nearest
    } else {
        value
    };
    // Clamped above, always fits.
    snapped as u8
}

/// Filter a snapshot, preserving its order.
pub fn apply<'a>(cards: &'a [CatalogCard], criteria: &FilterSpec) -> Vec<&'a CatalogCard> {
    cards.iter().filter(|card| criteria.matches(card)).collect()
}

/// Distinct `kategori` values in first-seen order.
pub fn categories<'a, I>(kategoris: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = BTreeSet::new();
    kategoris
        .into_iter()
        .filter(|k| seen.insert(*k))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// CatalogView
// ---------------------------------------------------------------------------

/// A fetched-once snapshot plus the currently displayed projection.
#[derive(Debug, Clone)]
pub struct CatalogView {
    original: Vec<CatalogCard>,
    displayed: Vec<CatalogCard>,
    filter: Option<FilterSpec>,
}

impl CatalogView {
    /// Wrap a snapshot; everything is displayed until a filter is set.
    pub fn new(cards: Vec<CatalogCard>) -> Self {
        Self {
            displayed: cards.clone(),
            original: cards,
            filter: None,
        }
    }

    pub fn original(&self) -> &[CatalogCard] {
        &self.original
    }

    pub fn displayed(&self) -> &[CatalogCard] {
        &self.displayed
    }

    /// The last filter applied, if any.
    pub fn filter(&self) -> Option<&FilterSpec> {
        self.filter.as_ref()
    }

    /// Re-derive the displayed set from the snapshot.
    pub fn set_filter(&mut self, criteria: FilterSpec) {
        self.displayed = apply(&self.original, &criteria)
            .into_iter()
            .cloned()
            .collect();
        self.filter = Some(criteria);
    }

    /// Apply the default filter.
    pub fn reset(&mut self) {
        let mut criteria = self.filter.take().unwrap_or_default();
        criteria.reset();
        self.set_filter(criteria);
    }

    /// Distinct categories in the snapshot, first-seen order.
    pub fn categories(&self) -> Vec<String> {
        categories(self.original.iter().map(|c| c.kategori.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: DbId, title: &str, kategori: &str, size: &str, format: &str, ty: &str) -> CatalogCard {
        CatalogCard::new(
            id,
            title,
            "subtitle",
            kategori,
            size,
            format,
            ty,
            "/image/x.png",
            "/file/x.xml",
            "https://tiktok.com/@maker",
        )
    }

    fn snapshot() -> Vec<CatalogCard> {
        vec![
            card(1, "Logo Reveal", "Animation", "100 KB", "PNG", "xml"),
            card(2, "Glitch Pack", "Transition", "2 MB", "MP4", "align"),
            card(3, "Text Bounce", "Animation", "4 MB", "Image", "xml"),
        ]
    }

    fn ids(cards: &[&CatalogCard]) -> Vec<DbId> {
        cards.iter().map(|c| c.id).collect()
    }

    // --- Card projection ---

    #[test]
    fn card_projection_derives_display_fields() {
        let c = card(7, "A", "Animation", "512 KB", "PNG", "xml");
        assert_eq!(c.format, "png");
        assert_eq!(c.size_mb, 0.5);
        assert_eq!(c.author, DEFAULT_AUTHOR);
        assert_eq!(c.author_url, "https://tiktok.com/@maker");
        assert_eq!(c.tags, vec!["Animation", "xml", "Free"]);
        assert_eq!(c.description, "subtitle");
    }

    #[test]
    fn blank_author_url_links_to_placeholder() {
        assert_eq!(author_link(""), NO_AUTHOR_URL);
        assert_eq!(author_link("  "), NO_AUTHOR_URL);
        assert_eq!(author_link("https://site.io"), "https://site.io");
    }

    #[test]
    fn card_serializes_type_field() {
        let json = serde_json::to_value(card(1, "A", "K", "1 MB", "PNG", "align")).unwrap();
        assert_eq!(json["type"], "align");
    }

    // --- Size slider ---

    #[test]
    fn slider_maps_linearly_to_megabytes() {
        assert_eq!(max_size_mb(0), 0.0);
        assert_eq!(max_size_mb(40), 2.0);
        assert_eq!(max_size_mb(50), 2.5);
        assert_eq!(max_size_mb(100), 5.0);
    }

    #[test]
    fn slider_at_forty_keeps_records_up_to_two_megabytes() {
        let cards = snapshot();
        let criteria = FilterSpec {
            size: 40,
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&cards, &criteria)), vec![1, 2]);
    }

    #[test]
    fn snap_size_pulls_to_nearby_checkpoints() {
        assert_eq!(snap_size(37), 40);
        assert_eq!(snap_size(23), 20);
        assert_eq!(snap_size(98), 100);
        assert_eq!(snap_size(3), 0);
    }

    #[test]
    fn snap_size_leaves_distant_values_and_clamps() {
        assert_eq!(snap_size(30), 30);
        assert_eq!(snap_size(50), 50);
        assert_eq!(snap_size(-20), 0);
        assert_eq!(snap_size(250), 100);
    }

    // --- Criteria ---

    #[test]
    fn search_matches_title_or_author_case_insensitively() {
        let cards = snapshot();
        let criteria = FilterSpec {
            search: "  glitch ".into(),
            ..FilterSpec::show_all()
        };
        assert_eq!(ids(&apply(&cards, &criteria)), vec![2]);

        // Every card's author is the default label, so it matches all.
        let by_author = FilterSpec {
            search: "USER".into(),
            ..FilterSpec::show_all()
        };
        assert_eq!(apply(&cards, &by_author).len(), 3);

        let by_url = FilterSpec {
            search: "maker".into(),
            ..FilterSpec::show_all()
        };
        assert!(apply(&cards, &by_url).is_empty());
    }

    #[test]
    fn type_and_kategori_require_exact_match() {
        let cards = snapshot();
        let criteria = FilterSpec {
            preset_type: "xml".into(),
            kategori: "Animation".into(),
            ..FilterSpec::show_all()
        };
        assert_eq!(ids(&apply(&cards, &criteria)), vec![1, 3]);

        let wrong_case = FilterSpec {
            kategori: "animation".into(),
            ..FilterSpec::show_all()
        };
        assert!(apply(&cards, &wrong_case).is_empty());
    }

    #[test]
    fn format_set_matches_lower_cased_membership() {
        let cards = snapshot();
        let criteria = FilterSpec {
            format: ["png".to_string(), "MP4".to_string()].into_iter().collect(),
            ..FilterSpec::show_all()
        };
        assert_eq!(ids(&apply(&cards, &criteria)), vec![1, 2]);
    }

    #[test]
    fn criteria_combine_with_and() {
        let cards = snapshot();
        let criteria = FilterSpec {
            kategori: "Animation".into(),
            size: 40,
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&cards, &criteria)), vec![1]);
    }

    // --- CatalogView ---

    #[test]
    fn view_starts_unfiltered_and_recomputes_from_snapshot() {
        let mut view = CatalogView::new(snapshot());
        assert_eq!(view.displayed().len(), 3);
        assert!(view.filter().is_none());

        view.set_filter(FilterSpec {
            search: "logo".into(),
            ..FilterSpec::show_all()
        });
        assert_eq!(view.displayed().len(), 1);

        // A broader filter widens again; the snapshot is untouched.
        view.set_filter(FilterSpec::show_all());
        assert_eq!(view.displayed().len(), 3);
        assert_eq!(view.original().len(), 3);
    }

    #[test]
    fn filter_reset_clears_criteria() {
        let mut criteria = FilterSpec {
            search: "glow".into(),
            kategori: "JJ".into(),
            format: ["png".to_string()].into(),
            size: 90,
            ..FilterSpec::default()
        };
        criteria.reset();
        assert_eq!(criteria, FilterSpec::default());
        assert_eq!(criteria.size, 50);
    }

    #[test]
    fn view_reset_applies_default_slider() {
        let mut view = CatalogView::new(snapshot());
        view.reset();
        // 2.5 MB default hides the 4 MB record.
        let shown: Vec<DbId> = view.displayed().iter().map(|c| c.id).collect();
        assert_eq!(shown, vec![1, 2]);
        assert_eq!(view.filter().map(|f| f.size), Some(DEFAULT_SIZE_SLIDER));
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        let view = CatalogView::new(snapshot());
        assert_eq!(view.categories(), vec!["Animation", "Transition"]);
    }
}
