//! Client-local slot holding the fallback copy of the request list.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::errors::StoreError;
use crate::http_request::SavedRequest;

pub const STORAGE_KEY: &str = "api-tester-requests";
pub const MAX_ENTRIES: usize = 50;

/// A JSON file mapping [`STORAGE_KEY`] to the list. Every write replaces the whole list.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> LocalStore {
        LocalStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable slots load as an empty list.
    pub fn load(&self) -> Vec<SavedRequest> {
        match self.read() {
            Ok(requests) => requests,
            Err(e) => {
                log::warn!("Ignoring local requests in {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    fn read(&self) -> Result<Vec<SavedRequest>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Parse(e.to_string())),
        };
        let mut slots: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(&text).map_err(|e| StoreError::Parse(e.to_string()))?;
        match slots.remove(STORAGE_KEY) {
            None => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value).map_err(|e| StoreError::Parse(e.to_string())),
        }
    }

    /// Writes a sibling temp file and renames it over the slot, so a crash mid-write
    /// leaves the previous list intact.
    pub fn save(&self, requests: &[SavedRequest]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).with_context(|| format!("couldn't create {}", dir.display()))?;

        let mut slots = BTreeMap::new();
        slots.insert(STORAGE_KEY, requests);
        let text = serde_json::to_string(&slots)?;

        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("couldn't create a temp file in {}", dir.display()))?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .with_context(|| format!("couldn't write {}", file.path().display()))?;
        file.persist(&self.path)
            .with_context(|| format!("couldn't write {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                Err(e).with_context(|| format!("couldn't remove {}", self.path.display()))
            }
            _ => Ok(()),
        }
    }
}

/// Insert at the front, keeping at most [`MAX_ENTRIES`].
pub fn prepend(requests: &mut Vec<SavedRequest>, request: SavedRequest) {
    requests.insert(0, request);
    requests.truncate(MAX_ENTRIES);
}

pub fn remove(requests: &mut Vec<SavedRequest>, id: &str) {
    requests.retain(|r| r.id != id);
}
