use std::path::PathBuf;

use crate::database::DatabaseManager;
use crate::errors::{StoreError, StoreResult};
use crate::http_request::{NewSavedRequest, SavedRequest, Settings};

/// The persistent store for saved requests and the settings record.
pub trait RemoteStore {
    /// Newest first.
    fn list_requests(&self) -> StoreResult<Vec<SavedRequest>>;
    fn create_request(&self, request: &NewSavedRequest) -> StoreResult<SavedRequest>;
    /// Deleting an id that doesn't exist is an error.
    fn delete_request(&self, id: &str) -> StoreResult<()>;
    /// Creates the default record on first read.
    fn get_settings(&self) -> StoreResult<Settings>;
    fn update_settings(&self, use_database: bool) -> StoreResult<Settings>;
}

/// [`RemoteStore`] backed by SQLite. Without a database every call answers
/// [`StoreError::Unavailable`].
pub struct SqliteStore {
    db: Option<DatabaseManager>,
}

impl SqliteStore {
    pub fn new(db: DatabaseManager) -> SqliteStore {
        SqliteStore { db: Some(db) }
    }

    pub fn unconfigured() -> SqliteStore {
        SqliteStore { db: None }
    }

    /// Opens the database when a path is configured. A database that fails to open
    /// is treated like a missing one.
    pub fn open(path: Option<PathBuf>) -> SqliteStore {
        match path {
            None => SqliteStore::unconfigured(),
            Some(path) => match DatabaseManager::new(path) {
                Ok(db) => SqliteStore::new(db),
                Err(e) => {
                    log::warn!("Database unavailable: {:#}", e);
                    SqliteStore::unconfigured()
                }
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.db.is_some()
    }

    fn db(&self) -> StoreResult<&DatabaseManager> {
        self.db.as_ref().ok_or(StoreError::Unavailable)
    }
}

fn store_error(e: anyhow::Error) -> StoreError {
    log::debug!("store operation failed: {:?}", e);
    StoreError::Store(format!("{:#}", e))
}

impl RemoteStore for SqliteStore {
    fn list_requests(&self) -> StoreResult<Vec<SavedRequest>> {
        self.db()?.list_saved_requests().map_err(store_error)
    }

    fn create_request(&self, request: &NewSavedRequest) -> StoreResult<SavedRequest> {
        self.db()?.create_saved_request(request).map_err(store_error)
    }

    fn delete_request(&self, id: &str) -> StoreResult<()> {
        let db = self.db()?;
        if id.is_empty() {
            return Err(StoreError::validation("ID required"));
        }
        match db.delete_saved_request(id).map_err(store_error)? {
            true => Ok(()),
            false => Err(StoreError::Store(format!("Failed to delete request: no saved request with id {}", id))),
        }
    }

    fn get_settings(&self) -> StoreResult<Settings> {
        self.db()?.get_or_create_settings().map_err(store_error)
    }

    fn update_settings(&self, use_database: bool) -> StoreResult<Settings> {
        self.db()?.set_use_database(use_database).map_err(store_error)
    }
}
