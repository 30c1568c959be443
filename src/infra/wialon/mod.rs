//! Wialon remote-API fleet source.

mod client;

pub use client::{DEFAULT_BASE_URL, WialonClient};
