use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use fleet_report::snapshot::{RawUnit, parse_units};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

use crate::services::fleet_api::FleetApi;

/// Fleet source backed by a JSON file: either a bare array of unit records
/// or a saved `core/search_items` response with an `items` array.
pub struct DumpFile {
    path: PathBuf,
}

impl DumpFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn unit_items(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(anyhow!("Expected an 'items' array in the fleet dump")),
        },
        _ => Err(anyhow!("Fleet dump must be a JSON array or object")),
    }
}

#[async_trait]
impl FleetApi for DumpFile {
    async fn list_units(&self) -> Result<Vec<RawUnit>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read fleet dump {}", self.path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Fleet dump {} is not valid JSON", self.path.display()))?;

        let units = parse_units(unit_items(value)?);
        info!(path = %self.path.display(), units = units.len(), "Fleet dump loaded");
        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_items_shapes() {
        assert_eq!(unit_items(json!([{"id": 1}])).unwrap().len(), 1);
        assert_eq!(unit_items(json!({"items": [{"id": 1}, {"id": 2}]})).unwrap().len(), 2);
        assert!(unit_items(json!({"units": []})).is_err());
        assert!(unit_items(json!(3)).is_err());
    }

    #[tokio::test]
    async fn test_dump_file_round_trip() {
        let path = std::env::temp_dir().join("fleet_report_test_dump.json");
        std::fs::write(&path, r#"{"items": [{"id": 5, "nm": "TRK-005"}]}"#).unwrap();

        let units = DumpFile::new(path.clone()).list_units().await.unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name.as_deref(), Some("TRK-005"));
        std::fs::remove_file(&path).unwrap();
    }
}
