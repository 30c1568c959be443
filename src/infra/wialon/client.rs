use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use fleet_report::fetch::auth::SessionParam;
use fleet_report::fetch::{BasicClient, HttpClient, fetch_json, service_url};
use fleet_report::snapshot::{RawMessage, RawUnit, parse_units};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::services::fleet_api::FleetApi;

pub const DEFAULT_BASE_URL: &str = "https://hst-api.wialon.com";

/// base | custom props | billing | position | last message | sensors | counters
const UNIT_FLAGS: u64 = 0x0001 | 0x0002 | 0x0008 | 0x0020 | 0x0040 | 0x0200 | 0x0400;

const ERROR_INVALID_SESSION: i64 = 1;

/// Window searched for a recent message when `messages/load_last` is empty.
const FALLBACK_WINDOW_SECS: i64 = 24 * 3600;

pub struct WialonClient<C = BasicClient> {
    base_url: String,
    http: SessionParam<C>,
}

impl WialonClient<BasicClient> {
    /// Logs in with an API token and keeps the returned session id.
    pub async fn login(base_url: &str, token: &str) -> Result<Self> {
        let http = BasicClient::new()?;
        let url = service_url(base_url, "token/login", &json!({ "token": token }))?;

        let result = fetch_json(&http, url).await.context("Login request failed")?;
        check_error(&result).context("Login rejected")?;

        let session_id = result["eid"]
            .as_str()
            .ok_or_else(|| anyhow!("Login response carries no session id"))?
            .to_string();
        info!(user = result["user"]["nm"].as_str().unwrap_or(""), "Logged in to tracking backend");

        Ok(Self {
            base_url: base_url.to_string(),
            http: SessionParam::sid(http, session_id),
        })
    }
}

impl<C: HttpClient> WialonClient<C> {
    async fn call(&self, service: &str, params: Value) -> Result<Value> {
        let url = service_url(&self.base_url, service, &params)?;
        let result = fetch_json(&self.http, url).await?;
        check_error(&result).with_context(|| format!("{service} failed"))?;
        Ok(result)
    }

    async fn search_units(&self) -> Result<Vec<Value>> {
        let params = json!({
            "spec": {
                "itemsType": "avl_unit",
                "propName": "sys_name",
                "propValueMask": "*",
                "sortType": "sys_name"
            },
            "force": 1,
            "flags": UNIT_FLAGS,
            "from": 0,
            "to": 0
        });

        let mut result = self.call("core/search_items", params).await?;
        match result.get_mut("items").map(Value::take) {
            Some(Value::Array(items)) => Ok(items),
            _ => Ok(Vec::new()),
        }
    }

    /// Newest message of a unit: `messages/load_last` first, then the newest
    /// message of the last 24 hours.
    async fn last_message(&self, unit_id: i64) -> Result<Option<Value>> {
        let now = Utc::now().timestamp();

        let result = self
            .call(
                "messages/load_last",
                json!({
                    "itemId": unit_id,
                    "lastTime": now,
                    "lastCount": 1,
                    "flags": 0,
                    "flagsMask": 0,
                    "loadCount": 1
                }),
            )
            .await?;
        if let Some(msg) = messages(result).into_iter().next() {
            return Ok(Some(msg));
        }

        let result = self
            .call(
                "messages/load_interval",
                json!({
                    "itemId": unit_id,
                    "timeFrom": now - FALLBACK_WINDOW_SECS,
                    "timeTo": now,
                    "flags": 0,
                    "flagsMask": 65535,
                    "loadCount": 10
                }),
            )
            .await?;
        Ok(messages(result).pop())
    }
}

fn messages(mut result: Value) -> Vec<Value> {
    match result.get_mut("messages").map(Value::take) {
        Some(Value::Array(msgs)) => msgs,
        _ => Vec::new(),
    }
}

fn check_error(result: &Value) -> Result<()> {
    match result.get("error").and_then(Value::as_i64) {
        None | Some(0) => Ok(()),
        Some(ERROR_INVALID_SESSION) => Err(anyhow!("Session expired, log in again")),
        Some(code) => Err(anyhow!("Backend error code {code}")),
    }
}

#[async_trait]
impl<C: HttpClient> FleetApi for WialonClient<C> {
    #[tracing::instrument(skip(self))]
    async fn list_units(&self) -> Result<Vec<RawUnit>> {
        let mut units = parse_units(self.search_units().await?);
        info!(units = units.len(), "Units fetched");

        for unit in units.iter_mut().filter(|u| u.last_message.is_none()) {
            match self.last_message(unit.id).await {
                Ok(Some(msg)) => unit.last_message = Some(RawMessage::from(msg)),
                Ok(None) => debug!(unit_id = unit.id, "No recent message for unit"),
                Err(e) => warn!(unit_id = unit.id, error = %e, "Last message lookup failed"),
            }
        }

        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_flags() {
        assert_eq!(UNIT_FLAGS, 0x66b);
    }

    #[test]
    fn test_check_error_codes() {
        assert!(check_error(&json!({"eid": "x"})).is_ok());
        assert!(check_error(&json!({"error": 0})).is_ok());
        assert!(check_error(&json!([])).is_ok());

        let expired = check_error(&json!({"error": 1})).unwrap_err();
        assert!(expired.to_string().contains("Session expired"));
        assert!(check_error(&json!({"error": 4})).is_err());
    }

    #[test]
    fn test_fetched_message_survives_bad_fields() {
        let msg = messages(json!({"messages": [{"t": 1_760_000_000, "pos": {"s": "40"}, "p": []}]}))
            .pop()
            .map(RawMessage::from)
            .unwrap();

        assert_eq!(msg.position.and_then(|p| p.speed), Some(40.0));
        assert!(msg.params.is_none());
    }

    #[test]
    fn test_messages_extraction() {
        let msgs = messages(json!({"messages": [{"t": 1}, {"t": 2}]}));
        assert_eq!(msgs.len(), 2);
        assert!(messages(json!({"count": 0})).is_empty());
    }
}
