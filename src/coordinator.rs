//! Decides per operation whether presets go to the database or the local slot.
//!
//! The coordinator owns the working set (the list shown to the user) and the
//! persistence mode. Remote failures never reach the caller: they turn into a
//! local fallback or are logged and dropped, and every mutation reports a
//! [`StorageOutcome`].

use std::fmt::{Display, Formatter};

use chrono::Utc;

use crate::errors::{StoreError, StoreResult};
use crate::http_request::{NewSavedRequest, SavedRequest};
use crate::local_store::{self, LocalStore};
use crate::remote_store::RemoteStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOutcome {
    SucceededRemote,
    SucceededLocal,
    /// The database was preferred but refused, so the local slot took the write.
    SucceededLocalFallback,
    Failed(String),
}

impl StorageOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, StorageOutcome::Failed(_))
    }
}

impl Display for StorageOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageOutcome::SucceededRemote => write!(f, "saved to database"),
            StorageOutcome::SucceededLocal => write!(f, "saved locally"),
            StorageOutcome::SucceededLocalFallback => write!(f, "database unavailable, saved locally"),
            StorageOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub synced: usize,
    pub failed: usize,
}

/// Where the working set came from on [`Coordinator::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Local,
}

pub struct Coordinator<R: RemoteStore> {
    remote: R,
    local: LocalStore,
    use_database: bool,
    working_set: Vec<SavedRequest>,
}

impl<R: RemoteStore> Coordinator<R> {
    /// Starts in database mode until [`load`](Self::load) says otherwise.
    pub fn new(remote: R, local: LocalStore) -> Coordinator<R> {
        Coordinator {
            remote,
            local,
            use_database: true,
            working_set: Vec::new(),
        }
    }

    pub fn use_database(&self) -> bool {
        self.use_database
    }

    pub fn working_set(&self) -> &[SavedRequest] {
        &self.working_set
    }

    pub fn find(&self, id: &str) -> Option<&SavedRequest> {
        self.working_set.iter().find(|r| r.id == id)
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Reads the mode and the request list from the database, falling back to the
    /// local slot when the database has nothing or fails. An unreachable database
    /// also switches the session to local mode.
    pub fn load(&mut self) -> LoadSource {
        let settings = self.remote.get_settings();
        let requests = self.remote.list_requests();

        let mut hard_failure = false;
        match settings {
            Ok(settings) => self.use_database = settings.use_database,
            Err(e) => {
                log::log!(e.log_level(), "Failed to fetch settings: {}", e);
                hard_failure |= e.is_hard();
            }
        }

        let source = match requests {
            Ok(requests) if !requests.is_empty() => {
                self.working_set = requests;
                LoadSource::Remote
            }
            other => {
                if let Err(e) = other {
                    log::log!(e.log_level(), "Failed to fetch requests: {}", e);
                    hard_failure |= e.is_hard();
                }
                self.working_set = self.local.load();
                LoadSource::Local
            }
        };

        if hard_failure {
            self.use_database = false;
        }
        log::info!(
            "Loaded {} saved requests from {:?}, using {}",
            self.working_set.len(),
            source,
            self.mode_name()
        );
        source
    }

    /// Flips the mode right away; persisting it is best effort.
    pub fn toggle_mode(&mut self) -> bool {
        self.use_database = !self.use_database;
        log::info!("Switched to {}", self.mode_name());
        if let Err(e) = self.remote.update_settings(self.use_database) {
            log::log!(e.log_level(), "Failed to persist storage mode: {}", e);
        }
        self.use_database
    }

    pub fn set_mode(&mut self, use_database: bool) -> bool {
        if self.use_database != use_database {
            self.toggle_mode();
        }
        self.use_database
    }

    pub fn save(&mut self, request: NewSavedRequest) -> StorageOutcome {
        let request = match request.validated() {
            Ok(request) => request,
            Err(e) => return StorageOutcome::Failed(e.to_string()),
        };

        if !self.use_database {
            return self.save_local(request, StorageOutcome::SucceededLocal);
        }

        match self.remote.create_request(&request) {
            Ok(saved) => {
                log::info!("Saved {} to database as {}", saved.name, saved.id);
                local_store::prepend(&mut self.working_set, saved);
                StorageOutcome::SucceededRemote
            }
            Err(e) => {
                log::log!(e.log_level(), "Failed to save to database, saving locally: {}", e);
                self.save_local(request, StorageOutcome::SucceededLocalFallback)
            }
        }
    }

    fn save_local(&mut self, request: NewSavedRequest, outcome: StorageOutcome) -> StorageOutcome {
        let saved = request.into_saved(self.next_local_id(), None);
        log::info!("Saved {} locally as {}", saved.name, saved.id);
        local_store::prepend(&mut self.working_set, saved);
        match self.local.save(&self.working_set) {
            Ok(()) => outcome,
            Err(e) => {
                log::warn!("Failed to write local requests: {:#}", e);
                StorageOutcome::Failed(format!("{:#}", e))
            }
        }
    }

    /// Millisecond timestamp, bumped past any id already in the working set.
    fn next_local_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        while self.working_set.iter().any(|r| r.id == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    /// Removes the entry from view first; a failed database delete is not reported.
    /// The local slot is rewritten in either mode so it stays a current backup.
    pub fn delete(&mut self, id: &str) -> StorageOutcome {
        local_store::remove(&mut self.working_set, id);

        let outcome = if self.use_database {
            if let Err(e) = self.remote.delete_request(id) {
                log::log!(e.log_level(), "Failed to delete {} from database: {}", id, e);
            }
            StorageOutcome::SucceededRemote
        } else {
            StorageOutcome::SucceededLocal
        };

        match self.local.save(&self.working_set) {
            Ok(()) => outcome,
            Err(e) => {
                log::warn!("Failed to write local requests: {:#}", e);
                StorageOutcome::Failed(format!("{:#}", e))
            }
        }
    }

    /// Empties the working set and removes the local slot. The database is untouched.
    pub fn clear_all(&mut self) -> StorageOutcome {
        self.working_set.clear();
        match self.local.clear() {
            Ok(()) => StorageOutcome::SucceededLocal,
            Err(e) => StorageOutcome::Failed(format!("{:#}", e)),
        }
    }

    /// Copies the presets that only exist in the local slot into the database, one at
    /// a time and oldest first, so the reloaded list keeps their newest-first order.
    /// Rows the slot mirrors from the database are skipped. With at least one success
    /// the session switches to database mode and the working set is replaced by the
    /// database's list. The local slot is left as it is.
    pub fn sync_local_to_remote(&mut self) -> StoreResult<SyncReport> {
        if self.use_database {
            return Err(StoreError::validation("Already using the database"));
        }
        let pending: Vec<SavedRequest> = self
            .local
            .load()
            .into_iter()
            .filter(|r| r.created_at.is_none())
            .collect();
        if pending.is_empty() {
            return Err(StoreError::validation("No local requests to sync"));
        }

        let mut report = SyncReport::default();
        for request in pending.iter().rev() {
            match self.remote.create_request(&request.to_new()) {
                Ok(_) => report.synced += 1,
                Err(e) => {
                    log::warn!("Failed to sync {}: {}", request.name, e);
                    report.failed += 1;
                }
            }
        }
        log::info!("Synced {} requests, {} failed", report.synced, report.failed);

        if report.synced > 0 {
            self.use_database = true;
            if let Err(e) = self.remote.update_settings(true) {
                log::log!(e.log_level(), "Failed to persist storage mode: {}", e);
            }
            match self.remote.list_requests() {
                Ok(requests) => self.working_set = requests,
                Err(e) => log::warn!("Failed to reload requests after sync: {}", e),
            }
        }
        Ok(report)
    }

    pub fn mode_name(&self) -> &'static str {
        if self.use_database {
            "database"
        } else {
            "local storage"
        }
    }
}
