// fetch/mod.rs
// Replays a captured search request with ranking diagnostics switched on.

use crate::errors::{ExportError, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use url::form_urlencoded;

/// A search request as captured from the page: target, headers and body.
#[derive(Debug, Clone, Deserialize)]
pub struct CapturedRequest {
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
}

pub fn load_captured_request<P: AsRef<Path>>(path: P) -> Result<CapturedRequest> {
    let file = File::open(path)?;
    let request: CapturedRequest = serde_json::from_reader(BufReader::new(file))?;
    if request.url.trim().is_empty() {
        return Err(ExportError::InvalidRequest {
            reason: "empty url".to_string(),
        });
    }
    Ok(request)
}

/// Rewrites a form-encoded search body to ask for `count` results with debug
/// ranking information. Other parameters keep their order.
pub fn debug_body(body: Option<&str>, count: u32) -> String {
    let mut params: Vec<(String, String)> =
        form_urlencoded::parse(body.unwrap_or_default().as_bytes())
            .into_owned()
            .collect();

    set_param(&mut params, "numberOfResults", &count.to_string());
    set_param(&mut params, "debug", "true");
    set_param(&mut params, "debugRankingInformation", "true");

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

/// Replaces the first `key` in place, drops later duplicates, or appends.
fn set_param(params: &mut Vec<(String, String)>, key: &str, value: &str) {
    let mut seen = false;
    params.retain_mut(|(k, v)| {
        if k != key {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        *v = value.to_string();
        true
    });
    if !seen {
        params.push((key.to_string(), value.to_string()));
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ExportError::InvalidRequest {
                reason: format!("header name '{name}': {e}"),
            })?;
        if header == CONTENT_LENGTH {
            continue;
        }
        let value = HeaderValue::from_str(value).map_err(|e| ExportError::InvalidRequest {
            reason: format!("header '{name}': {e}"),
        })?;
        map.insert(header, value);
    }
    if !map.contains_key(CONTENT_TYPE) {
        map.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
    }
    Ok(map)
}

/// POSTs the rewritten request and returns the decoded JSON payload.
pub fn fetch_results(request: &CapturedRequest, count: u32, timeout: Duration) -> Result<Value> {
    let headers = header_map(&request.headers)?;
    let client = Client::builder().timeout(timeout).build()?;

    tracing::info!(url = %request.url, count, "fetching results with debug info");
    let response = client
        .post(&request.url)
        .headers(headers)
        .body(debug_body(request.body.as_deref(), count))
        .send()?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        return Err(ExportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes()?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_gains_debug_params_and_keeps_the_rest() {
        let body = debug_body(Some("q=red%20shoes&numberOfResults=10&aq=%40source"), 500);
        assert_eq!(
            body,
            "q=red+shoes&numberOfResults=500&aq=%40source&debug=true&debugRankingInformation=true"
        );
    }

    #[test]
    fn duplicate_params_collapse_to_one() {
        let body = debug_body(Some("debug=false&x=1&debug=0"), 5);
        assert_eq!(
            body,
            "debug=true&x=1&numberOfResults=5&debugRankingInformation=true"
        );
    }

    #[test]
    fn empty_body_still_requests_debug_info() {
        assert_eq!(
            debug_body(None, 20),
            "numberOfResults=20&debug=true&debugRankingInformation=true"
        );
    }

    #[test]
    fn headers_drop_content_length_and_default_content_type() {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "Bearer abc".to_string());
        headers.insert("Content-Length".to_string(), "12".to_string());
        let map = header_map(&headers).expect("headers");

        assert!(!map.contains_key(CONTENT_LENGTH));
        assert_eq!(
            map.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            map.get("authorization").and_then(|v| v.to_str().ok()),
            Some("Bearer abc")
        );
    }

    #[test]
    fn bad_header_name_is_rejected() {
        let mut headers = BTreeMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        assert!(matches!(
            header_map(&headers),
            Err(ExportError::InvalidRequest { .. })
        ));
    }
}
