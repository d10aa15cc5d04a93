//! Uploaded attachments on disk.
//!
//! Files live under `<public_root>/image` and `<public_root>/file` and are
//! referenced from preset records by their public URL (`/image/<name>`).

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use mograph_core::upload::{generated_file_name, UploadKind};
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

/// How many later millisecond stamps to try when a generated name is taken.
const MAX_NAME_ATTEMPTS: i64 = 1000;

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding files of `kind`.
    pub fn directory(&self, kind: UploadKind) -> PathBuf {
        self.root.join(kind.subdirectory())
    }

    /// Write `bytes` under a generated `preset-<millis><ext>` name and
    /// return the public URL.
    ///
    /// Files are opened create-new, so an existing file is never
    /// overwritten; a taken name moves on to the next millisecond.
    pub async fn store(
        &self,
        kind: UploadKind,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        let dir = self.directory(kind);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;

        let stamp = chrono::Utc::now().timestamp_millis();
        for offset in 0..MAX_NAME_ATTEMPTS {
            let name = generated_file_name(stamp + offset, original_name);
            let path = dir.join(&name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StoreError::io(&path, e)),
            };

            let written = async {
                file.write_all(bytes).await?;
                file.sync_all().await
            }
            .await;

            if let Err(e) = written {
                drop(file);
                let _ = tokio::fs::remove_file(&path).await;
                return Err(StoreError::io(&path, e));
            }

            tracing::debug!(path = %path.display(), bytes = bytes.len(), "Stored upload");
            return Ok(kind.public_url(&name));
        }

        Err(StoreError::io(
            &dir,
            std::io::Error::new(ErrorKind::AlreadyExists, "no free upload filename"),
        ))
    }

    /// Map a public URL such as `/image/preset-1.png` to its on-disk path.
    ///
    /// Returns `None` for URLs that would leave the public root.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.trim_start_matches('/'));
        let mut components = relative.components().peekable();
        components.peek()?;
        if components.all(|c| matches!(c, Component::Normal(_))) {
            Some(self.root.join(relative))
        } else {
            None
        }
    }

    /// Best-effort delete of the file behind `url`.
    ///
    /// Returns `true` when a file was removed. A missing file is not an
    /// error; other failures are logged and swallowed.
    pub async fn remove(&self, url: &str) -> bool {
        let Some(path) = self.resolve(url) else {
            tracing::warn!(url, "Refusing to delete file outside the public root");
            return false;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed upload");
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove upload");
                false
            }
        }
    }
}
