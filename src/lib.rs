//! Fleet performance reporting.
//!
//! Raw tracking-backend unit records are normalized into snapshots,
//! classified by recency, turned into period-scaled performance metrics and
//! laid out into the Driver and Vehicle Performance templates.

pub mod activity;
pub mod error;
pub mod fetch;
pub mod fleet;
pub mod metrics;
pub mod output;
pub mod report;
pub mod snapshot;

pub use error::ReportError;
