//! Trait for the telemetry collaborator that supplies raw unit records.

use anyhow::Result;
use fleet_report::snapshot::RawUnit;

/// Abstraction over a fleet source (live tracking backend or a saved dump).
#[async_trait::async_trait]
pub trait FleetApi: Send + Sync {
    /// Returns every unit visible to the session, each with its most recent
    /// message when one could be found.
    async fn list_units(&self) -> Result<Vec<RawUnit>>;
}
