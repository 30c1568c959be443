//! Per-run pipeline: classify and synthesize every vehicle of a fleet.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::activity::{Activity, ActivityBreakdown, ActivityFilter, classify};
use crate::error::ReportError;
use crate::metrics::{PerformanceMetrics, synthesize};
use crate::snapshot::{Position, TelemetryParams, VehicleSnapshot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Daily => "daily",
            ReportType::Weekly => "weekly",
            ReportType::Monthly => "monthly",
        }
    }

    /// Default date range ending `today`: yesterday, the last 7 days or the
    /// last 30 days.
    pub fn default_range(self, today: NaiveDate) -> DateRange {
        let back = match self {
            ReportType::Daily => 1,
            ReportType::Weekly => 7,
            ReportType::Monthly => 30,
        };
        DateRange {
            from: today - Duration::days(back),
            to: today,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Inclusive number of days covered by the range.
    ///
    /// # Errors
    ///
    /// [`ReportError::InvalidPeriod`] when `to` is before `from`.
    pub fn period_days(&self) -> Result<u32, ReportError> {
        let days = (self.to - self.from).num_days() + 1;
        u32::try_from(days)
            .ok()
            .filter(|d| *d > 0)
            .ok_or(ReportError::InvalidPeriod { days })
    }

    pub fn from_label(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    pub fn to_label(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from_label(), self.to_label())
    }
}

/// Everything one report run depends on besides the fleet itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    pub now: DateTime<Utc>,
    pub date_range: DateRange,
    pub report_type: ReportType,
    pub period_days: u32,
}

impl ReportContext {
    pub fn new(
        now: DateTime<Utc>,
        date_range: DateRange,
        report_type: ReportType,
    ) -> Result<Self, ReportError> {
        let period_days = date_range.period_days()?;
        Ok(Self {
            now,
            date_range,
            report_type,
            period_days,
        })
    }
}

/// A classified snapshot, before metrics are attached.
#[derive(Debug, Clone)]
pub struct ClassifiedVehicle {
    pub snapshot: VehicleSnapshot,
    pub activity: Activity,
}

/// The unit of work consumed by the report layouts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedVehicle {
    pub id: i64,
    pub name: String,
    pub activity: Activity,
    pub position: Position,
    pub telemetry: TelemetryParams,
    pub metrics: PerformanceMetrics,
    pub last_update: Option<DateTime<Utc>>,
    pub report_period: String,
    pub report_type: ReportType,
}

pub fn classify_fleet(
    snapshots: Vec<VehicleSnapshot>,
    now: DateTime<Utc>,
) -> Vec<ClassifiedVehicle> {
    snapshots
        .into_iter()
        .map(|snapshot| {
            let activity = classify(snapshot.last_message_time, now);
            ClassifiedVehicle { snapshot, activity }
        })
        .collect()
}

pub fn breakdown(fleet: &[ClassifiedVehicle]) -> ActivityBreakdown {
    fleet.iter().fold(ActivityBreakdown::default(), |mut b, v| {
        b.record(&v.activity, v.snapshot.has_telemetry());
        b
    })
}

/// Keeps the vehicles matching `filter`, in their original order.
pub fn select(fleet: Vec<ClassifiedVehicle>, filter: ActivityFilter) -> Vec<ClassifiedVehicle> {
    fleet
        .into_iter()
        .filter(|v| filter.matches(&v.activity))
        .collect()
}

pub fn process_vehicle(
    vehicle: &ClassifiedVehicle,
    ctx: &ReportContext,
) -> Result<ProcessedVehicle, ReportError> {
    let snapshot = &vehicle.snapshot;
    let metrics = synthesize(snapshot, vehicle.activity, ctx.period_days)?;
    debug!(
        vehicle = %snapshot.name,
        tier = %vehicle.activity.tier,
        distance = metrics.total_distance,
        "Synthesized metrics"
    );

    Ok(ProcessedVehicle {
        id: snapshot.id,
        name: snapshot.name.clone(),
        activity: vehicle.activity,
        position: snapshot.position.clone(),
        telemetry: snapshot.telemetry.clone(),
        metrics,
        last_update: snapshot.last_message_time,
        report_period: ctx.date_range.to_string(),
        report_type: ctx.report_type,
    })
}

/// Processes vehicles in order. Output order matches input order.
#[tracing::instrument(skip_all, fields(vehicles = fleet.len(), period_days = ctx.period_days))]
pub fn process_fleet(
    fleet: &[ClassifiedVehicle],
    ctx: &ReportContext,
) -> Result<Vec<ProcessedVehicle>, ReportError> {
    let processed = fleet
        .iter()
        .map(|v| process_vehicle(v, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    info!(count = processed.len(), report_type = %ctx.report_type, "Fleet processed");
    Ok(processed)
}

/// Fleet-wide KPIs over processed vehicles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetSummary {
    pub vehicles: usize,
    pub total_distance: f64,
    pub total_driving_hours: f64,
    pub total_fuel: f64,
    pub total_harsh_events: u64,
}

impl FleetSummary {
    pub fn from_processed(vehicles: &[ProcessedVehicle]) -> Self {
        vehicles.iter().fold(
            FleetSummary {
                vehicles: vehicles.len(),
                ..Default::default()
            },
            |mut s, v| {
                s.total_distance += v.metrics.total_distance;
                s.total_driving_hours += v.metrics.driving_hours;
                s.total_fuel += v.metrics.fuel_consumption;
                s.total_harsh_events += u64::from(v.metrics.total_harsh_events);
                s
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityTier;
    use crate::snapshot::{RawMessage, RawUnit, normalize};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn vehicle(name: &str, hours_ago: Option<i64>) -> VehicleSnapshot {
        normalize(RawUnit {
            id: 1,
            name: Some(name.to_string()),
            last_message: hours_ago.map(|h| RawMessage {
                time: Some(json!((now() - Duration::hours(h)).timestamp())),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    #[test]
    fn test_default_ranges() {
        let today = date(2026, 10, 18);
        assert_eq!(ReportType::Daily.default_range(today).from, date(2026, 10, 17));
        assert_eq!(ReportType::Weekly.default_range(today).from, date(2026, 10, 11));
        assert_eq!(ReportType::Monthly.default_range(today).from, date(2026, 9, 18));
        assert_eq!(ReportType::Weekly.default_range(today).period_days().unwrap(), 8);
    }

    #[test]
    fn test_period_days_inclusive() {
        let same_day = DateRange {
            from: date(2026, 10, 18),
            to: date(2026, 10, 18),
        };
        assert_eq!(same_day.period_days().unwrap(), 1);
    }

    #[test]
    fn test_reversed_range_is_invalid() {
        let range = DateRange {
            from: date(2026, 10, 18),
            to: date(2026, 10, 10),
        };
        assert!(matches!(
            range.period_days(),
            Err(ReportError::InvalidPeriod { days: -7 })
        ));
        assert!(ReportContext::new(now(), range, ReportType::Daily).is_err());
    }

    #[test]
    fn test_process_fleet_preserves_order() {
        let fleet = classify_fleet(
            vec![
                vehicle("TRK-003", Some(2)),
                vehicle("TRK-001", None),
                vehicle("TRK-002", Some(24 * 10)),
            ],
            now(),
        );
        let ctx = ReportContext::new(
            now(),
            ReportType::Weekly.default_range(now().date_naive()),
            ReportType::Weekly,
        )
        .unwrap();

        let processed = process_fleet(&fleet, &ctx).unwrap();

        let names: Vec<_> = processed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["TRK-003", "TRK-001", "TRK-002"]);
        assert_eq!(processed[0].activity.tier, ActivityTier::VeryActive);
        assert_eq!(processed[1].activity.days_inactive, 999);
        assert_eq!(processed[2].activity.tier, ActivityTier::SomewhatActive);
        assert_eq!(processed[0].metrics.period_days, 8);
        assert_eq!(processed[0].report_period, "2026-10-11 to 2026-10-18");
        assert_eq!(processed[0].report_type, ReportType::Weekly);
    }

    #[test]
    fn test_select_and_breakdown() {
        let fleet = classify_fleet(
            vec![
                vehicle("A", Some(1)),
                vehicle("B", Some(24 * 3)),
                vehicle("C", None),
            ],
            now(),
        );

        let b = breakdown(&fleet);
        assert_eq!(b.total, 3);
        assert_eq!(b.with_telemetry, 2);
        assert_eq!(b.active_within_week, 2);

        let inactive = select(fleet, ActivityFilter::Inactive);
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].snapshot.name, "C");
    }

    #[test]
    fn test_summary_totals() {
        let fleet = classify_fleet(
            vec![vehicle("TRK-001", Some(1)), vehicle("TRK-003", Some(1))],
            now(),
        );
        let range = DateRange {
            from: date(2026, 10, 12),
            to: date(2026, 10, 18),
        };
        let ctx = ReportContext::new(now(), range, ReportType::Weekly).unwrap();
        let processed = process_fleet(&fleet, &ctx).unwrap();

        let s = FleetSummary::from_processed(&processed);

        assert_eq!(s.vehicles, 2);
        assert!((s.total_distance - (532.0 + 966.0)).abs() < 1e-9);
        assert_eq!(s.total_harsh_events, 38);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(FleetSummary::from_processed(&[]), FleetSummary::default());
    }
}
