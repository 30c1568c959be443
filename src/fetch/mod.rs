//! HTTP plumbing for the tracking backend.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, anyhow};
use reqwest::Url;

/// Sends a GET to `url` and decodes the body as JSON.
///
/// # Errors
///
/// Fails on transport errors, non-success status codes and invalid JSON.
pub async fn fetch_json<C: HttpClient>(client: &C, url: Url) -> Result<serde_json::Value> {
    let resp = client.get(url).await.context("Request failed")?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("Backend returned status {}: {}", status, body));
    }

    resp.json().await.context("Failed to parse response JSON")
}

/// Builds a remote-API call URL: `{base}/wialon/ajax.html?svc=..&params=..`.
pub fn service_url(base_url: &str, service: &str, params: &serde_json::Value) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .and_then(|u| u.join("wialon/ajax.html"))
        .with_context(|| format!("Invalid backend URL '{base_url}'"))?;
    url.query_pairs_mut()
        .append_pair("svc", service)
        .append_pair("params", &params.to_string());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_url_encodes_params() {
        let url = service_url(
            "https://hst-api.wialon.com",
            "token/login",
            &json!({"token": "abc"}),
        )
        .unwrap();

        assert_eq!(url.path(), "/wialon/ajax.html");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("svc".to_string(), "token/login".to_string()));
        assert_eq!(pairs[1], ("params".to_string(), r#"{"token":"abc"}"#.to_string()));
    }

    #[test]
    fn test_service_url_rejects_garbage() {
        assert!(service_url("not a url", "core/search_items", &json!({})).is_err());
    }
}
