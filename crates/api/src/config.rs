use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;
use axum::http::HeaderValue;
use mograph_core::upload::MAX_UPLOAD_BYTES;

/// Which origins CORS lets through.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigins {
    /// `*`: the public site and the admin page may be served from anywhere.
    Any,
    List(Vec<HeaderValue>),
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from `CORS_ORIGINS` (`*` or comma-separated).
    pub cors_origins: CorsOrigins,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Root of the served public tree; uploads go to `image/` and `file/` below it.
    pub public_root: PathBuf,
    /// The catalog JSON document.
    pub catalog_file: PathBuf,
    /// Whole-request body limit; covers both attachments plus form fields.
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                          |
    /// |------------------------|----------------------------------|
    /// | `HOST`                 | `0.0.0.0`                        |
    /// | `PORT`                 | `4000`                           |
    /// | `CORS_ORIGINS`         | `*`                              |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                             |
    /// | `PUBLIC_ROOT`          | `public`                         |
    /// | `CATALOG_FILE`         | `<PUBLIC_ROOT>/data/preset.json` |
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "4000")
            .parse()
            .context("PORT must be a valid u16")?;

        let cors_origins = parse_cors_origins(&env_or("CORS_ORIGINS", "*"))?;

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .context("REQUEST_TIMEOUT_SECS must be a valid u64")?;

        let public_root = PathBuf::from(env_or("PUBLIC_ROOT", "public"));

        let catalog_file = std::env::var("CATALOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_catalog_file(&public_root));

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            catalog_file,
            public_root,
            max_body_bytes: default_max_body_bytes(),
        })
    }

    /// Development defaults rooted at `public_root`.
    pub fn local(public_root: impl Into<PathBuf>) -> Self {
        let public_root = public_root.into();
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            cors_origins: CorsOrigins::Any,
            request_timeout_secs: 30,
            catalog_file: default_catalog_file(&public_root),
            public_root,
            max_body_bytes: default_max_body_bytes(),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid HOST address '{}'", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn default_catalog_file(public_root: &std::path::Path) -> PathBuf {
    public_root.join("data").join("preset.json")
}

/// Two attachments at the per-file limit plus 1 MiB of form overhead.
fn default_max_body_bytes() -> usize {
    2 * MAX_UPLOAD_BYTES + 1024 * 1024
}

/// Parse `*` or a comma-separated origin list.
pub fn parse_cors_origins(raw: &str) -> anyhow::Result<CorsOrigins> {
    let entries: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if entries.is_empty() || entries.contains(&"*") {
        return Ok(CorsOrigins::Any);
    }

    entries
        .into_iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{o}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()
        .map(CorsOrigins::List)
}
