use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use crate::http_request::NewSavedRequest;

// Represents state as determined by the latest parsed line
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ParseState {
    Unknown,
    NewRequest,
    Uri,
    Header,
    Body,
}

// Determined type of line based of latest parse state
#[derive(Debug, Eq, PartialEq)]
enum LineType {
    NewRequest,
    ConfigOption,
    Comment,
    Empty,
    Unknown,
}

#[derive(Debug, Default)]
struct PendingRequest {
    name: String,
    request_line: String,
    headers: Vec<String>,
    body: Vec<String>,
}

impl PendingRequest {
    fn is_empty(&self) -> bool {
        self.request_line.is_empty()
    }

    fn finish(self, request_line: &Regex) -> NewSavedRequest {
        let (method, url) = match request_line.captures(&self.request_line) {
            Some(caps) => (
                caps.name("method").map_or("GET", |m| m.as_str()).to_uppercase(),
                caps["url"].to_string(),
            ),
            None => ("GET".to_string(), self.request_line.trim().to_string()),
        };
        let mut body = self.body;
        while body.last().map_or(false, |line| line.trim().is_empty()) {
            body.pop();
        }
        NewSavedRequest {
            name: self.name,
            url,
            method,
            headers: self.headers.join("\n"),
            body: body.join("\n"),
        }
    }
}

fn parse_name(line: &str) -> String {
    return line.trim_start_matches('#').trim().to_string();
}

fn get_line_type(line: &str) -> LineType {
    return if line.starts_with("###") {
        LineType::NewRequest
    } else if line.starts_with("# @") {
        LineType::ConfigOption
    } else if line.starts_with('#') || line.starts_with("//") {
        LineType::Comment
    } else if line.trim().is_empty() {
        LineType::Empty
    } else {
        LineType::Unknown
    };
}

fn request_line_regex() -> Result<Regex> {
    // optional method, the url, optional protocol version
    Regex::new(r"^\s*(?:(?P<method>[A-Za-z]+)\s+)?(?P<url>\S+)(?:\s+HTTP/[0-9.]+)?\s*$")
        .context("while compiling the request line pattern")
}

pub fn parse_http_file(http_file_path: &Path) -> Result<Vec<NewSavedRequest>> {
    let file = File::open(http_file_path)
        .with_context(|| format!("couldn't open {}", http_file_path.display()))?;
    parse_http(file)
}

/// Reads `###`-separated requests. Body text is kept verbatim, including any
/// `{{PLACEHOLDER}}` markers.
pub fn parse_http(reader: impl Read) -> Result<Vec<NewSavedRequest>> {
    let request_line = request_line_regex()?;
    let mut http_requests = Vec::new();

    let mut parse_state = ParseState::Unknown;
    let mut pending = PendingRequest::default();

    for (line_no, result_line) in BufReader::new(reader).lines().enumerate() {
        let line = result_line.with_context(|| format!("while reading line {}", line_no + 1))?;
        let line_type = get_line_type(&line);

        // everything after the headers belongs to the body
        if parse_state == ParseState::Body && line_type != LineType::NewRequest {
            pending.body.push(line);
            continue;
        }

        match line_type {
            LineType::NewRequest => {
                let previous = std::mem::take(&mut pending);
                if !previous.is_empty() {
                    http_requests.push(previous.finish(&request_line));
                }
                pending.name = parse_name(&line);
                parse_state = ParseState::NewRequest;
            }
            LineType::Unknown => match parse_state {
                ParseState::Unknown | ParseState::NewRequest => {
                    pending.request_line = line;
                    parse_state = ParseState::Uri;
                }
                ParseState::Uri | ParseState::Header => {
                    pending.headers.push(line.trim().to_string());
                    parse_state = ParseState::Header;
                }
                ParseState::Body => unreachable!("body lines are consumed above"),
            },
            LineType::Empty => {
                if parse_state == ParseState::Uri || parse_state == ParseState::Header {
                    parse_state = ParseState::Body;
                }
            }
            LineType::ConfigOption | LineType::Comment => {}
        }
    }

    if !pending.is_empty() {
        http_requests.push(pending.finish(&request_line));
    }
    log::debug!("parsed {} requests", http_requests.len());
    return Ok(http_requests);
}
