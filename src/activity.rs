//! Activity classification by recency of the last reported message.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Days-inactive value used when a vehicle has never reported.
pub const NO_TELEMETRY_DAYS: i64 = 999;

/// Coarse recency bucket.
///
/// | Days inactive | Tier           |
/// |---------------|----------------|
/// | <= 1          | VeryActive     |
/// | <= 7          | Active         |
/// | <= 30         | SomewhatActive |
/// | > 30          | Inactive       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActivityTier {
    VeryActive,
    Active,
    SomewhatActive,
    Inactive,
}

impl ActivityTier {
    pub fn from_days(days_inactive: i64) -> Self {
        match days_inactive {
            d if d <= 1 => ActivityTier::VeryActive,
            d if d <= 7 => ActivityTier::Active,
            d if d <= 30 => ActivityTier::SomewhatActive,
            _ => ActivityTier::Inactive,
        }
    }

    /// Scales period distance and engine-on share.
    pub fn activity_factor(self) -> f64 {
        match self {
            ActivityTier::VeryActive => 1.0,
            ActivityTier::Active => 0.8,
            ActivityTier::SomewhatActive => 0.5,
            ActivityTier::Inactive => 0.2,
        }
    }

    pub fn utilization_factor(self) -> f64 {
        match self {
            ActivityTier::VeryActive => 1.0,
            ActivityTier::Active => 0.7,
            ActivityTier::SomewhatActive => 0.4,
            ActivityTier::Inactive => 0.1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityTier::VeryActive => "Very Active",
            ActivityTier::Active => "Active",
            ActivityTier::SomewhatActive => "Somewhat Active",
            ActivityTier::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for ActivityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recency classification of one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub days_inactive: i64,
    pub tier: ActivityTier,
}

/// Classifies a vehicle from its last message time.
///
/// Whole days are truncated; a timestamp in the future counts as 0 days.
pub fn classify(last_message_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Activity {
    let days_inactive = match last_message_time {
        Some(t) => (now - t).num_days().max(0),
        None => NO_TELEMETRY_DAYS,
    };

    Activity {
        days_inactive,
        tier: ActivityTier::from_days(days_inactive),
    }
}

/// Vehicle selection by recency. The tiers are cumulative: `Active` keeps
/// everything seen within a week, very active vehicles included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ActivityFilter {
    #[default]
    All,
    VeryActive,
    Active,
    SomewhatActive,
    Inactive,
}

impl ActivityFilter {
    pub fn matches(self, activity: &Activity) -> bool {
        let d = activity.days_inactive;
        match self {
            ActivityFilter::All => true,
            ActivityFilter::VeryActive => d <= 1,
            ActivityFilter::Active => d <= 7,
            ActivityFilter::SomewhatActive => d <= 30,
            ActivityFilter::Inactive => d > 30,
        }
    }
}

/// Disjoint per-tier counts for a fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityBreakdown {
    pub total: usize,
    pub with_telemetry: usize,
    pub active_within_week: usize,
    pub very_active: usize,
    pub active: usize,
    pub somewhat_active: usize,
    pub inactive: usize,
}

impl ActivityBreakdown {
    pub fn record(&mut self, activity: &Activity, has_telemetry: bool) {
        self.total += 1;
        if has_telemetry {
            self.with_telemetry += 1;
        }
        if activity.days_inactive <= 7 {
            self.active_within_week += 1;
        }
        match activity.tier {
            ActivityTier::VeryActive => self.very_active += 1,
            ActivityTier::Active => self.active += 1,
            ActivityTier::SomewhatActive => self.somewhat_active += 1,
            ActivityTier::Inactive => self.inactive += 1,
        }
    }
}
