//! The JSON catalog document and its single-writer store.
//!
//! [`CatalogFile`] knows how to read and atomically rewrite the document.
//! [`CatalogStore`] owns the file from one background task; every request
//! is queued on a channel and answered through a oneshot, so two
//! concurrent creates can never read the same max id and no rewrite can
//! clobber another.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use mograph_core::types::DbId;
use tokio::sync::{mpsc, oneshot};

use crate::error::StoreError;
use crate::models::preset::{NewPreset, Preset, PresetChanges};

/// Pending requests the store task buffers before callers wait to send.
const COMMAND_BUFFER: usize = 64;

// ---------------------------------------------------------------------------
// CatalogFile
// ---------------------------------------------------------------------------

/// The catalog document: a JSON array of [`Preset`] records.
#[derive(Debug, Clone)]
pub struct CatalogFile {
    path: PathBuf,
}

impl CatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the document as `[]` (and its parent directories) if absent.
    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?
        {
            return Ok(());
        }
        self.save(&[]).await?;
        tracing::info!(path = %self.path.display(), "Initialized empty catalog file");
        Ok(())
    }

    /// Read and parse the whole document.
    pub async fn load(&self) -> Result<Vec<Preset>, StoreError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrite the whole document.
    ///
    /// Writes a sibling temp file and renames it over the target, so
    /// readers see either the old or the new array, never a torn write.
    pub async fn save(&self, presets: &[Preset]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let json = serde_json::to_vec_pretty(presets).map_err(StoreError::Serialize)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

// ---------------------------------------------------------------------------
// CatalogStore
// ---------------------------------------------------------------------------

type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

enum Command {
    List {
        reply: Reply<Vec<Preset>>,
    },
    Get {
        id: DbId,
        reply: Reply<Option<Preset>>,
    },
    Create {
        preset: NewPreset,
        reply: Reply<Preset>,
    },
    Update {
        id: DbId,
        changes: PresetChanges,
        reply: Reply<Option<Preset>>,
    },
    Delete {
        id: DbId,
        reply: Reply<Option<Preset>>,
    },
}

/// Cloneable handle to the catalog task.
///
/// Each command re-reads the document, so edits made to the file outside
/// the server are picked up; mutations rewrite it only on success.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    sender: mpsc::Sender<Command>,
}

impl CatalogStore {
    /// Bootstrap the document if needed and start the store task.
    ///
    /// Must be called from within a tokio runtime. The task exits once
    /// every handle has been dropped.
    pub async fn open(file: CatalogFile) -> Result<Self, StoreError> {
        file.ensure_exists().await?;

        let (sender, mut receiver) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(async move {
            while let Some(command) = receiver.recv().await {
                handle_command(&file, command).await;
            }
            tracing::debug!(path = %file.path().display(), "Catalog store stopped");
        });

        Ok(Self { sender })
    }

    /// All presets, in stored order.
    pub async fn list(&self) -> Result<Vec<Preset>, StoreError> {
        self.request(|reply| Command::List { reply }).await
    }

    pub async fn find_by_id(&self, id: DbId) -> Result<Option<Preset>, StoreError> {
        self.request(|reply| Command::Get { id, reply }).await
    }

    /// Append a preset with id `max + 1` (or 1 in an empty catalog).
    pub async fn create(&self, preset: NewPreset) -> Result<Preset, StoreError> {
        self.request(|reply| Command::Create { preset, reply }).await
    }

    /// Apply a partial update. `Ok(None)` when the id is absent.
    pub async fn update(
        &self,
        id: DbId,
        changes: PresetChanges,
    ) -> Result<Option<Preset>, StoreError> {
        self.request(|reply| Command::Update { id, changes, reply })
            .await
    }

    /// Remove a preset and return it. `Ok(None)` when the id is absent.
    pub async fn delete(&self, id: DbId) -> Result<Option<Preset>, StoreError> {
        self.request(|reply| Command::Delete { id, reply }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, StoreError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(make(reply))
            .await
            .map_err(|_| StoreError::Unavailable)?;
        response.await.map_err(|_| StoreError::Unavailable)?
    }
}

/// Next id after the current maximum, starting at 1.
pub fn next_id(presets: &[Preset]) -> DbId {
    presets.iter().map(|p| p.id).max().map_or(1, |max| max + 1)
}

async fn handle_command(file: &CatalogFile, command: Command) {
    // A dropped receiver only means the caller went away; nothing to undo.
    match command {
        Command::List { reply } => {
            let _ = reply.send(file.load().await);
        }
        Command::Get { id, reply } => {
            let result = file
                .load()
                .await
                .map(|presets| presets.into_iter().find(|p| p.id == id));
            let _ = reply.send(result);
        }
        Command::Create { preset, reply } => {
            let _ = reply.send(create(file, preset).await);
        }
        Command::Update { id, changes, reply } => {
            let _ = reply.send(update(file, id, changes).await);
        }
        Command::Delete { id, reply } => {
            let _ = reply.send(delete(file, id).await);
        }
    }
}

async fn create(file: &CatalogFile, preset: NewPreset) -> Result<Preset, StoreError> {
    let mut presets = file.load().await?;
    let created = preset.into_preset(next_id(&presets));
    presets.push(created.clone());
    file.save(&presets).await?;
    Ok(created)
}

async fn update(
    file: &CatalogFile,
    id: DbId,
    changes: PresetChanges,
) -> Result<Option<Preset>, StoreError> {
    let mut presets = file.load().await?;
    let Some(preset) = presets.iter_mut().find(|p| p.id == id) else {
        return Ok(None);
    };
    preset.apply(changes);
    let updated = preset.clone();
    file.save(&presets).await?;
    Ok(Some(updated))
}

async fn delete(file: &CatalogFile, id: DbId) -> Result<Option<Preset>, StoreError> {
    let mut presets = file.load().await?;
    let Some(index) = presets.iter().position(|p| p.id == id) else {
        return Ok(None);
    };
    let removed = presets.remove(index);
    file.save(&presets).await?;
    Ok(Some(removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(id: DbId) -> Preset {
        Preset {
            id,
            title: format!("Preset {id}"),
            subtitle: String::new(),
            kategori: String::new(),
            size: "1 MB".into(),
            format: "PNG".into(),
            preset_type: "xml".into(),
            img_url: String::new(),
            file_url: String::new(),
            author_url: String::new(),
        }
    }

    #[test]
    fn next_id_starts_at_one() {
        assert_eq!(next_id(&[]), 1);
    }

    #[test]
    fn next_id_follows_maximum_not_length() {
        assert_eq!(next_id(&[preset(3), preset(9), preset(4)]), 10);
    }

    #[test]
    fn temp_path_is_a_sibling() {
        let file = CatalogFile::new("/srv/public/data/preset.json");
        assert_eq!(
            file.temp_path(),
            PathBuf::from("/srv/public/data/preset.json.tmp")
        );
    }
}
