//! The in-progress request draft and the last response it produced.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde_json::json;

use crate::coordinator::{Coordinator, StorageOutcome};
use crate::http_request::{parse_headers, NewSavedRequest, SavedRequest};
use crate::http_request_executor::{HttpResponse, HttpSend};
use crate::remote_store::RemoteStore;
use crate::response_classifier::{classify, QuestionSet, ResponseKind};

pub const DEFAULT_METHOD: &str = "POST";
pub const DEFAULT_HEADERS: &str = "Content-Type: application/json; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub name: String,
    pub method: String,
    pub url: String,
    pub headers: String,
    pub body: String,
}

impl Default for RequestDraft {
    fn default() -> Self {
        RequestDraft {
            name: String::new(),
            method: DEFAULT_METHOD.to_string(),
            url: String::new(),
            headers: DEFAULT_HEADERS.to_string(),
            body: String::new(),
        }
    }
}

impl RequestDraft {
    pub fn to_new(&self) -> NewSavedRequest {
        NewSavedRequest {
            name: self.name.clone(),
            url: self.url.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }

    /// GET never carries a body, and neither does an empty one.
    pub fn outgoing_body(&self) -> Option<&str> {
        if self.body.is_empty() || self.method.eq_ignore_ascii_case("GET") {
            None
        } else {
            Some(&self.body)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseView {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub kind: ResponseKind,
}

#[derive(Debug, Default)]
pub struct Composer {
    pub draft: RequestDraft,
    response: Option<ResponseView>,
    error: Option<String>,
    selected_answers: BTreeMap<String, String>,
}

impl Composer {
    pub fn new(draft: RequestDraft) -> Composer {
        Composer {
            draft,
            ..Default::default()
        }
    }

    pub fn response(&self) -> Option<&ResponseView> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn send(&mut self, sender: &impl HttpSend) -> Result<&ResponseView> {
        if self.draft.url.trim().is_empty() {
            return Err(anyhow!("URL required"));
        }
        self.response = None;
        self.error = None;
        self.selected_answers.clear();

        let headers = parse_headers(&self.draft.headers);
        let sent = sender.send(&self.draft.method, self.draft.url.trim(), &headers, self.draft.outgoing_body());
        match sent {
            Ok(HttpResponse { status, headers, text }) => {
                let kind = classify(status, &text);
                let view: &ResponseView = self.response.insert(ResponseView { status, headers, kind });
                Ok(view)
            }
            Err(e) => {
                self.error = Some(format!("{:#}", e));
                Err(e)
            }
        }
    }

    pub fn load_preset(&mut self, preset: &SavedRequest) {
        self.draft.url = preset.url.clone();
        self.draft.method = preset.method.clone();
        self.draft.headers = preset.headers.clone();
        self.draft.body = preset.body.clone();
    }

    pub fn save<R: RemoteStore>(&mut self, coordinator: &mut Coordinator<R>) -> StorageOutcome {
        let outcome = coordinator.save(self.draft.to_new());
        self.draft.name.clear();
        outcome
    }

    pub fn question_set(&self) -> Option<&QuestionSet> {
        match &self.response.as_ref()?.kind {
            ResponseKind::Structured { questions, .. } => questions.as_ref(),
            _ => None,
        }
    }

    pub fn select_answer(&mut self, question_id: &str, answer_id: &str) {
        self.selected_answers.insert(question_id.to_string(), answer_id.to_string());
    }

    /// Body for the follow-up call that submits the selected answers.
    pub fn answers_payload(&self) -> Option<serde_json::Value> {
        let set = self.question_set()?;
        if self.selected_answers.is_empty() {
            return None;
        }
        let answers: Vec<serde_json::Value> = self.selected_answers
            .iter()
            .map(|(question_id, answer_id)| json!({ "questionId": question_id, "answerId": answer_id }))
            .collect();
        Some(json!({ "authToken": set.auth_token, "answers": answers }))
    }
}
