use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub text: String,
}

/// Sends one request. Transport failures are errors, any status is a response.
pub trait HttpSend {
    fn send(&self, method: &str, url: &str, headers: &[(String, String)], body: Option<&str>) -> Result<HttpResponse>;
}

pub struct HttpExecutor {
    client: reqwest::blocking::Client,
}

impl HttpExecutor {
    pub fn new(timeout: Duration) -> Result<HttpExecutor> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("while building the http client")?;
        return Ok(HttpExecutor { client });
    }
}

pub fn method(method: &str) -> Result<reqwest::Method> {
    return match method.to_lowercase().as_str() {
        "get" => Ok(reqwest::Method::GET),
        "post" => Ok(reqwest::Method::POST),
        "put" => Ok(reqwest::Method::PUT),
        "delete" => Ok(reqwest::Method::DELETE),
        "patch" => Ok(reqwest::Method::PATCH),
        _ => Err(anyhow!("{} is a unknown http method", method)),
    };
}

pub fn uri(url: &str) -> Result<reqwest::Url> {
    return url.trim().parse::<reqwest::Url>().map_err(|e| anyhow!("{} @ '{}'", e, url));
}

pub fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::try_from(key.as_str()).with_context(|| format!("invalid header name '{}'", key))?;
        let value = HeaderValue::try_from(value.as_str()).with_context(|| format!("invalid value for header '{}'", key))?;
        map.append(name, value);
    }
    return Ok(map);
}

impl HttpSend for HttpExecutor {
    fn send(&self, method_name: &str, url: &str, headers: &[(String, String)], body: Option<&str>) -> Result<HttpResponse> {
        let mut req = self.client
            .request(method(method_name)?, uri(url)?)
            .headers(header_map(headers)?);
        if let Some(body) = body {
            req = req.body(body.to_string());
        }

        log::debug!("{} {}", method_name, url);
        let res = req.send().with_context(|| format!("Request to {} failed", url))?;

        let status = res.status().as_u16();
        let headers = res.headers().iter()
            .map(|(key, value)| (key.to_string(), String::from_utf8_lossy(value.as_bytes()).to_string()))
            .collect();
        let text = res.text().context("while reading the response body")?;
        log::debug!("{} {} -> {}", method_name, url, status);

        Ok(HttpResponse { status, headers, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("GET", reqwest::Method::GET)]
    #[test_case("patch", reqwest::Method::PATCH)]
    #[test_case("Delete", reqwest::Method::DELETE)]
    fn maps_methods(name: &str, expected: reqwest::Method) {
        assert_eq!(method(name).unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_method() {
        assert!(method("BREW").is_err());
    }

    #[test]
    fn rejects_relative_url() {
        assert!(uri("/api/user/v2").is_err());
        assert_eq!(uri(" https://example.com/a ").unwrap().path(), "/a");
    }

    #[test]
    fn builds_header_map() {
        let map = header_map(&[
            ("Content-Type".to_string(), "application/json".to_string()),
            ("x-array-user-token".to_string(), "{{USER_TOKEN}}".to_string()),
        ])
        .unwrap();
        assert_eq!(map.get("content-type").unwrap(), "application/json");
        assert_eq!(map.get("x-array-user-token").unwrap(), "{{USER_TOKEN}}");
    }

    #[test]
    fn rejects_invalid_header_name() {
        assert!(header_map(&[("bad header".to_string(), "v".to_string())]).is_err());
    }
}
