use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} does not contain a valid document: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A single JSON document on disk.
///
/// Every mutation goes through [`JsonDocumentStore::update`], which holds one
/// async mutex for the whole read-modify-write cycle and commits by writing a
/// sibling temp file and renaming it over the target. Readers therefore see
/// either the previous document or the new one, never a mix.
pub struct JsonDocumentStore<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _document: PhantomData<fn() -> T>,
}

impl<T> JsonDocumentStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _document: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current document. A missing file is an empty document.
    pub async fn load(&self) -> Result<T, StoreError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                return Ok(T::default());
            }
            Err(source) => {
                error!("Error reading file {}: {}", self.path.display(), source);
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&raw).map_err(|source| {
            error!("Error parsing file {}: {}", self.path.display(), source);
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Apply `mutate` to the current document and persist the result.
    ///
    /// Nothing is written when `mutate` returns an error.
    pub async fn update<F, R, E>(&self, mutate: F) -> Result<R, E>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load().await?;
        let outcome = mutate(&mut document)?;
        self.persist(&document).await?;

        Ok(outcome)
    }

    async fn persist(&self, document: &T) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(document)?;
        let tmp_path = self.tmp_path();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|source| self.write_error(source))?;
        }

        commit(&tmp_path, &self.path, &body)
            .await
            .map_err(|source| self.write_error(source))?;

        info!("Wrote {} bytes to {}", body.len(), self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }

    fn write_error(&self, source: io::Error) -> StoreError {
        error!("Error writing file {}: {}", self.path.display(), source);
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// Write `body` to `tmp_path` and rename it over `target`. The temp file is
/// removed whenever any step fails.
async fn commit(tmp_path: &Path, target: &Path, body: &[u8]) -> io::Result<()> {
    let written = async {
        let mut file = fs::File::create(tmp_path).await?;
        file.write_all(body).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(tmp_path, target).await
    }
    .await;

    if written.is_err() {
        let _ = fs::remove_file(tmp_path).await;
    }
    written
}
