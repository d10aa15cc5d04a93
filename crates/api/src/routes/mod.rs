pub mod health;
pub mod presets;

use axum::Router;
use mograph_core::upload::UploadKind;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the full route tree.
///
/// ```text
/// /health                      liveness
/// /presets, /preset/{id} ...   catalog (see [`presets::router`])
/// /image/*                     uploaded preview images
/// /file/*                      uploaded preset files
/// ```
pub fn app_routes(config: &ServerConfig) -> Router<AppState> {
    let mut router = Router::new()
        .merge(health::router())
        .merge(presets::router());

    // Uploads are served back from the directories they are stored in.
    for kind in [UploadKind::Image, UploadKind::PresetFile] {
        let dir = config.public_root.join(kind.subdirectory());
        router = router.nest_service(&format!("/{}", kind.subdirectory()), ServeDir::new(dir));
    }
    router
}
