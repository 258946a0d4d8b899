use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// A knowledge-based verification payload: questions plus the token needed to answer them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    NoContent,
    RawText(String),
    Structured {
        pretty: String,
        questions: Option<QuestionSet>,
    },
}

impl ResponseKind {
    pub fn is_question_set(&self) -> bool {
        matches!(self, ResponseKind::Structured { questions: Some(_), .. })
    }

    /// What to print for the body.
    pub fn display_text(&self) -> &str {
        match self {
            ResponseKind::NoContent => "(No content - 204 response)",
            ResponseKind::RawText(text) => text,
            ResponseKind::Structured { pretty, .. } => pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    ClientOrServerError,
    Other,
}

pub fn status_class(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        400.. => StatusClass::ClientOrServerError,
        _ => StatusClass::Other,
    }
}

pub fn classify(status: u16, text: &str) -> ResponseKind {
    if status == 204 || text.is_empty() {
        return ResponseKind::NoContent;
    }
    let parsed: Value = match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(_) => return ResponseKind::RawText(text.to_string()),
    };
    let pretty = serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| text.to_string());
    ResponseKind::Structured {
        questions: question_set(&parsed),
        pretty,
    }
}

fn question_set(parsed: &Value) -> Option<QuestionSet> {
    let questions = parsed.get("questions")?.as_array()?;
    Some(QuestionSet {
        auth_token: string_field(parsed, "authToken"),
        provider: string_field(parsed, "provider"),
        questions: questions
            .iter()
            .map(|q| serde_json::from_value(q.clone()).unwrap_or_default())
            .collect(),
    })
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
