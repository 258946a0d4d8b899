#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use anyhow::{anyhow, Result};
use apitester::coordinator::Coordinator;
use apitester::errors::{StoreError, StoreResult};
use apitester::http_request::{NewSavedRequest, SavedRequest, Settings};
use apitester::http_request_executor::{HttpResponse, HttpSend};
use apitester::local_store::LocalStore;
use apitester::remote_store::RemoteStore;
use chrono::Utc;
use tempfile::TempDir;

/// In-memory database that can be told to fail.
#[derive(Default)]
pub struct FakeRemote {
    pub requests: RefCell<Vec<SavedRequest>>,
    pub settings: RefCell<Option<Settings>>,
    pub unavailable: bool,
    pub fail_list: bool,
    pub fail_settings: bool,
    pub fail_delete: bool,
    pub fail_update_settings: bool,
    /// Accept this many creates, refuse the rest.
    pub accept_creates: Option<usize>,
    pub create_calls: RefCell<Vec<String>>,
    pub delete_calls: RefCell<Vec<String>>,
    pub update_calls: RefCell<Vec<bool>>,
    pub next_id: Cell<u32>,
}

impl FakeRemote {
    pub fn unavailable() -> FakeRemote {
        FakeRemote {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn with_requests(names: &[&str]) -> FakeRemote {
        let remote = FakeRemote::default();
        for name in names.iter().rev() {
            remote.create_request(&new_request(name)).unwrap();
        }
        remote.create_calls.borrow_mut().clear();
        remote
    }

    fn check(&self, fail: bool, what: &str) -> StoreResult<()> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        if fail {
            return Err(StoreError::store(format!("Failed to {}", what)));
        }
        Ok(())
    }
}

impl RemoteStore for FakeRemote {
    fn list_requests(&self) -> StoreResult<Vec<SavedRequest>> {
        self.check(self.fail_list, "fetch requests")?;
        Ok(self.requests.borrow().clone())
    }

    fn create_request(&self, request: &NewSavedRequest) -> StoreResult<SavedRequest> {
        self.check(false, "create request")?;
        let attempt = self.create_calls.borrow().len();
        self.create_calls.borrow_mut().push(request.name.clone());
        if let Some(accepted) = self.accept_creates {
            if attempt >= accepted {
                return Err(StoreError::store("Failed to create request"));
            }
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let saved = request.clone().into_saved(format!("remote-{}", id), Some(Utc::now()));
        self.requests.borrow_mut().insert(0, saved.clone());
        Ok(saved)
    }

    fn delete_request(&self, id: &str) -> StoreResult<()> {
        self.check(self.fail_delete, "delete request")?;
        self.delete_calls.borrow_mut().push(id.to_string());
        let mut requests = self.requests.borrow_mut();
        let before = requests.len();
        requests.retain(|r| r.id != id);
        if requests.len() == before {
            return Err(StoreError::store("Failed to delete request"));
        }
        Ok(())
    }

    fn get_settings(&self) -> StoreResult<Settings> {
        self.check(self.fail_settings, "fetch settings")?;
        Ok(self.settings.borrow_mut().get_or_insert_with(Settings::default).clone())
    }

    fn update_settings(&self, use_database: bool) -> StoreResult<Settings> {
        self.update_calls.borrow_mut().push(use_database);
        self.check(self.fail_update_settings, "update settings")?;
        let settings = Settings {
            use_database,
            ..Settings::default()
        };
        *self.settings.borrow_mut() = Some(settings.clone());
        Ok(settings)
    }
}

pub fn new_request(name: &str) -> NewSavedRequest {
    NewSavedRequest {
        name: name.to_string(),
        url: format!("https://sandbox.array.io/api/{}", name.replace(' ', "-")),
        method: "POST".to_string(),
        headers: "Content-Type: application/json; charset=utf-8".to_string(),
        body: "{}".to_string(),
    }
}

pub fn coordinator(remote: FakeRemote) -> (TempDir, Coordinator<FakeRemote>) {
    let dir = tempfile::tempdir().unwrap();
    let local = LocalStore::new(dir.path().join("local-requests.json"));
    (dir, Coordinator::new(remote, local))
}

pub fn names(requests: &[SavedRequest]) -> Vec<String> {
    requests.iter().map(|r| r.name.clone()).collect()
}

/// Answers every request with the same canned response and records what it was asked.
pub struct FakeSender {
    pub response: Option<HttpResponse>,
    pub calls: RefCell<Vec<(String, String, Vec<(String, String)>, Option<String>)>>,
}

impl FakeSender {
    pub fn replying(status: u16, text: &str) -> FakeSender {
        FakeSender {
            response: Some(HttpResponse {
                status,
                headers: vec![("content-type".to_string(), "application/json".to_string())],
                text: text.to_string(),
            }),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn offline() -> FakeSender {
        FakeSender {
            response: None,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl HttpSend for FakeSender {
    fn send(&self, method: &str, url: &str, headers: &[(String, String)], body: Option<&str>) -> Result<HttpResponse> {
        self.calls.borrow_mut().push((
            method.to_string(),
            url.to_string(),
            headers.to_vec(),
            body.map(str::to_string),
        ));
        self.response.clone().ok_or_else(|| anyhow!("error sending request for url ({})", url))
    }
}
