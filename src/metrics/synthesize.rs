use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::activity::Activity;
use crate::error::ReportError;
use crate::metrics::seed::stable_seed;
use crate::snapshot::VehicleSnapshot;

/// kg of CO2 per litre of diesel burnt.
pub const CO2_KG_PER_LITRE: f64 = 2.31;
pub const ENGINE_TO_DRIVING_RATIO: f64 = 1.3;
pub const IDLING_SHARE_OF_ENGINE: f64 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Figures for one vehicle scaled to a reporting period.
///
/// `total_harsh_events` is always the sum of the three harsh counters and
/// `co2_emission` is always `fuel_consumption * 2.31`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_distance: f64,
    pub avg_speed: f64,
    pub max_speed: f64,
    pub driving_hours: f64,
    pub engine_hours: f64,
    pub idling_hours: f64,
    pub engine_on_percentage: f64,
    pub fuel_consumption: f64,
    pub co2_emission: f64,
    pub harsh_acceleration: u32,
    pub harsh_braking: u32,
    pub harsh_cornering: u32,
    pub total_harsh_events: u32,
    pub speeding_violations: u32,
    pub fuel_level: f64,
    pub power_voltage: f64,
    pub current_location: Location,
    pub last_update: Option<DateTime<Utc>>,
    pub days_since_update: i64,
    pub period_days: u32,
    pub activity_factor: f64,
    pub utilization_factor: f64,
}

/// Derives a complete [`PerformanceMetrics`] record for one vehicle.
///
/// # Errors
///
/// Returns [`ReportError::InvalidPeriod`] when `period_days` is zero.
pub fn synthesize(
    snapshot: &VehicleSnapshot,
    activity: Activity,
    period_days: u32,
) -> Result<PerformanceMetrics, ReportError> {
    if period_days == 0 {
        return Err(ReportError::InvalidPeriod { days: 0 });
    }

    let activity_factor = activity.tier.activity_factor();
    let utilization_factor = activity.tier.utilization_factor();

    let seed = stable_seed(&snapshot.name);
    let seed_f = |m: u32| f64::from(seed % m);

    let daily_distance_base = 50.0 + seed_f(100);
    let period_distance = daily_distance_base * f64::from(period_days) * activity_factor;

    let avg_speed = 35.0 + seed_f(25);
    let driving_hours = if avg_speed > 0.0 {
        period_distance / avg_speed
    } else {
        0.0
    };
    let engine_hours = driving_hours * ENGINE_TO_DRIVING_RATIO;
    let idling_hours = engine_hours * IDLING_SHARE_OF_ENGINE;

    let max_speed = snapshot.position.speed.max(60.0 + seed_f(40));

    let fuel_consumption = round2(period_distance * (0.25 + seed_f(10) / 100.0));

    let harsh_acceleration = floor_count((period_distance / 100.0) * seed_f(3));
    let harsh_braking = floor_count((period_distance / 100.0) * seed_f(3));
    let harsh_cornering = floor_count((period_distance / 150.0) * seed_f(2));

    let speeding_violations = floor_count((driving_hours / 5.0) * seed_f(2));

    let telemetry = &snapshot.telemetry;
    let fuel_level = reported_or(telemetry.fuel_level, 50.0 + seed_f(40));
    let power_voltage = reported_or(telemetry.power_voltage, 12000.0 + seed_f(1000));

    Ok(PerformanceMetrics {
        total_distance: round2(period_distance),
        avg_speed: round1(avg_speed),
        max_speed: round1(max_speed),
        driving_hours: round2(driving_hours),
        engine_hours: round2(engine_hours),
        idling_hours: round2(idling_hours),
        engine_on_percentage: round1(60.0 + activity_factor * 30.0),
        fuel_consumption,
        co2_emission: fuel_consumption * CO2_KG_PER_LITRE,
        harsh_acceleration,
        harsh_braking,
        harsh_cornering,
        total_harsh_events: harsh_acceleration + harsh_braking + harsh_cornering,
        speeding_violations,
        fuel_level,
        power_voltage,
        current_location: Location {
            latitude: snapshot.position.latitude,
            longitude: snapshot.position.longitude,
        },
        last_update: snapshot.last_message_time,
        days_since_update: activity.days_inactive,
        period_days,
        activity_factor,
        utilization_factor,
    })
}

fn reported_or(reported: Option<f64>, fallback: f64) -> f64 {
    reported.filter(|v| *v != 0.0).unwrap_or(fallback)
}

fn floor_count(value: f64) -> u32 {
    value.floor().max(0.0) as u32
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
