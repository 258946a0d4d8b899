use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

pub const METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "PATCH"];

pub const DEFAULT_SETTINGS_ID: &str = "default";

/// A named, replayable request template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRequest {
    pub id: String,
    pub name: String,
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub headers: String,
    #[serde(default)]
    pub body: String,
    // only records that came from the database carry a creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for creating a [`SavedRequest`]; the store assigns `id` and `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewSavedRequest {
    pub name: String,
    pub url: String,
    pub method: String,
    pub headers: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: String,
    pub use_database: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            id: DEFAULT_SETTINGS_ID.to_string(),
            use_database: true,
        }
    }
}

impl SavedRequest {
    pub fn to_new(&self) -> NewSavedRequest {
        return NewSavedRequest {
            name: self.name.clone(),
            url: self.url.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        };
    }

    pub fn label(&self) -> String {
        return format!("{:<6} {}", self.method, self.name);
    }
}

impl NewSavedRequest {
    /// Checks the url and method and fills in a derived name when none was given.
    pub fn validated(self) -> Result<NewSavedRequest, StoreError> {
        let url = self.url.trim().to_string();
        if url.is_empty() {
            return Err(StoreError::validation("URL required"));
        }
        let method = normalize_method(&self.method)?;
        let name = match self.name.trim() {
            "" => derive_name(&method, &url),
            name => name.to_string(),
        };
        Ok(NewSavedRequest {
            name,
            url,
            method,
            headers: self.headers,
            body: self.body,
        })
    }

    pub fn into_saved(self, id: String, created_at: Option<DateTime<Utc>>) -> SavedRequest {
        SavedRequest {
            id,
            name: self.name,
            url: self.url,
            method: self.method,
            headers: self.headers,
            body: self.body,
            created_at,
        }
    }
}

pub fn normalize_method(method: &str) -> Result<String, StoreError> {
    let upper = method.trim().to_uppercase();
    if METHODS.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(StoreError::validation(format!("{} is a unknown http method", method.trim())))
    }
}

/// `"<METHOD> <path>"`, or the raw url when it can't be parsed.
pub fn derive_name(method: &str, url: &str) -> String {
    match url.parse::<reqwest::Url>() {
        Ok(parsed) => format!("{} {}", method, parsed.path()),
        Err(_) => format!("{} {}", method, url),
    }
}

/// Parses newline separated `Key: Value` pairs. A repeated key keeps its first
/// position and its last value.
pub fn parse_headers(text: &str) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim().to_string();
        match headers.iter_mut().find(|(existing, _)| existing == key) {
            Some(entry) => entry.1 = value,
            None => headers.push((key.to_string(), value)),
        }
    }
    return headers;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("get", "GET" ; "lower case")]
    #[test_case(" Patch ", "PATCH" ; "padded mixed case")]
    #[test_case("DELETE", "DELETE" ; "already upper")]
    fn normalizes_known_methods(input: &str, expected: &str) {
        assert_eq!(normalize_method(input).unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_method() {
        assert!(matches!(normalize_method("TRACE"), Err(StoreError::Validation(_))));
    }

    #[test_case("https://sandbox.array.io/api/user/v2?x=1", "POST /api/user/v2" ; "path without query")]
    #[test_case("https://example.com", "POST /" ; "root")]
    #[test_case("not a url", "POST not a url" ; "unparsable")]
    fn derives_name_from_path(url: &str, expected: &str) {
        assert_eq!(derive_name("POST", url), expected);
    }

    #[test]
    fn validated_fills_in_name_and_method() {
        let draft = NewSavedRequest {
            url: " https://example.com/users ".to_string(),
            method: "get".to_string(),
            ..Default::default()
        };
        let valid = draft.validated().unwrap();
        assert_eq!(valid.name, "GET /users");
        assert_eq!(valid.method, "GET");
        assert_eq!(valid.url, "https://example.com/users");
    }

    #[test]
    fn validated_requires_url() {
        let draft = NewSavedRequest {
            method: "GET".to_string(),
            ..Default::default()
        };
        assert_eq!(draft.validated(), Err(StoreError::validation("URL required")));
    }

    #[test]
    fn parses_header_lines() {
        let headers = parse_headers(
            "Content-Type: application/json; charset=utf-8\nbroken line\n: no key\nX-Token: a:b:c\nContent-Type: text/plain",
        );
        assert_eq!(
            headers,
            vec![
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("X-Token".to_string(), "a:b:c".to_string()),
            ]
        );
    }

    #[test]
    fn created_at_is_omitted_for_local_records() {
        let local = NewSavedRequest {
            name: "n".to_string(),
            url: "https://example.com".to_string(),
            method: "GET".to_string(),
            ..Default::default()
        }
        .into_saved("1700000000000".to_string(), None);
        let json = serde_json::to_string(&local).unwrap();
        assert!(!json.contains("createdAt"));
        assert!(json.contains("\"id\":\"1700000000000\""));
    }
}
