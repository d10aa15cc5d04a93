//! Route definitions for the preset catalog.
//!
//! Mounted at the root.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::presets;
use crate::state::AppState;

/// Preset catalog routes.
///
/// ```text
/// GET    /presets              -> list_presets      (optional filter query)
/// GET    /presets/categories   -> list_categories
/// POST   /preset               -> create_preset     (multipart)
/// PUT    /preset/{id}          -> update_preset     (multipart)
/// DELETE /preset/{id}          -> delete_preset
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/presets", get(presets::list_presets))
        .route("/presets/categories", get(presets::list_categories))
        .route("/preset", post(presets::create_preset))
        .route(
            "/preset/{id}",
            put(presets::update_preset).delete(presets::delete_preset),
        )
}
