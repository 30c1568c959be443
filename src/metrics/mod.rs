//! Period-scaled performance metrics.
//!
//! Historical trip data is not available, so figures are synthesized from the
//! vehicle identity, its activity tier and the report length. The result is a
//! pure function of those inputs.

pub mod seed;
pub mod synthesize;

pub use seed::{fnv1a_32, stable_seed};
pub use synthesize::{Location, PerformanceMetrics, synthesize};
