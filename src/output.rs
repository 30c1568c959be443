//! Output formatting and persistence for processed fleets.
//!
//! Supports pretty-printing, JSON serialization, the CSV performance table
//! and report file naming.

use chrono::{DateTime, TimeZone};
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ReportError;
use crate::fleet::{FleetSummary, ProcessedVehicle, ReportType};
use crate::report::TemplateKind;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(summary: &FleetSummary) {
    debug!("{:#?}", summary);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<(), ReportError> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One row of the per-vehicle performance table.
#[derive(Debug, Serialize)]
pub struct PerformanceRow<'a> {
    #[serde(rename = "Vehicle")]
    pub vehicle: &'a str,
    #[serde(rename = "Activity Status")]
    pub activity_status: &'static str,
    #[serde(rename = "Distance (km)")]
    pub distance: String,
    #[serde(rename = "Driving Hours")]
    pub driving_hours: String,
    #[serde(rename = "Engine Hours")]
    pub engine_hours: String,
    #[serde(rename = "Fuel (L)")]
    pub fuel: String,
    #[serde(rename = "Harsh Events")]
    pub harsh_events: u32,
    #[serde(rename = "Days Since Update")]
    pub days_since_update: i64,
}

impl<'a> From<&'a ProcessedVehicle> for PerformanceRow<'a> {
    fn from(v: &'a ProcessedVehicle) -> Self {
        let m = &v.metrics;
        Self {
            vehicle: &v.name,
            activity_status: v.activity.tier.label(),
            distance: format!("{:.2}", m.total_distance),
            driving_hours: format!("{:.2}", m.driving_hours),
            engine_hours: format!("{:.2}", m.engine_hours),
            fuel: format!("{:.2}", m.fuel_consumption),
            harsh_events: m.total_harsh_events,
            days_since_update: v.activity.days_inactive,
        }
    }
}

/// Writes the performance table for `vehicles` to a CSV file, replacing it.
pub fn write_performance_table(
    path: impl AsRef<Path>,
    vehicles: &[ProcessedVehicle],
) -> Result<(), ReportError> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = vehicles.len(), "Writing performance table");

    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for v in vehicles {
        writer.serialize(PerformanceRow::from(v))?;
    }
    writer.flush()?;

    Ok(())
}

/// `PTT_{Driver|Vehicle}_Performance_{type}_{YYYYmmdd_HHMMSS}.xlsx`
pub fn report_file_name<Tz>(
    kind: TemplateKind,
    report_type: ReportType,
    at: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "PTT_{}_Performance_{}_{}.xlsx",
        kind.subject(),
        report_type,
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Writes a rendered report under `dir`, creating it if needed.
pub fn write_report(
    dir: impl AsRef<Path>,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, ReportError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{DateRange, ReportContext, classify_fleet, process_fleet};
    use crate::snapshot::{RawUnit, normalize};
    use chrono::{NaiveDate, Utc};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn vehicles() -> Vec<ProcessedVehicle> {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let range = DateRange {
            from: NaiveDate::from_ymd_opt(2026, 10, 12).unwrap(),
            to: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        };
        let snaps = ["TRK-001", "TRK-003"]
            .iter()
            .map(|n| {
                normalize(RawUnit {
                    name: Some(n.to_string()),
                    ..Default::default()
                })
            })
            .collect();
        let ctx = ReportContext::new(now, range, ReportType::Weekly).unwrap();
        process_fleet(&classify_fleet(snaps, now), &ctx).unwrap()
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&FleetSummary::default());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&FleetSummary::from_processed(&vehicles())).unwrap();
    }

    #[test]
    fn test_performance_table_rows() {
        let path = temp_path("fleet_report_test_table.csv");
        let _ = fs::remove_file(&path);

        write_performance_table(&path, &vehicles()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Vehicle,Activity Status,Distance (km)"));
        // inactive, 7 days at factor 0.2
        assert_eq!(lines[1], "TRK-001,Inactive,106.40,2.96,3.84,32.98,0,999");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_performance_table_overwrites() {
        let path = temp_path("fleet_report_test_overwrite.csv");
        let _ = fs::remove_file(&path);

        write_performance_table(&path, &vehicles()).unwrap();
        write_performance_table(&path, &vehicles()[..1]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_report_file_name() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 5, 3).unwrap();
        assert_eq!(
            report_file_name(TemplateKind::DriverPerformance, ReportType::Weekly, &at),
            "PTT_Driver_Performance_weekly_20261018_090503.xlsx"
        );
        assert_eq!(
            report_file_name(TemplateKind::VehiclePerformance, ReportType::Monthly, &at),
            "PTT_Vehicle_Performance_monthly_20261018_090503.xlsx"
        );
    }

    #[test]
    fn test_write_report_creates_dir() {
        let dir = temp_path("fleet_report_test_reports");
        let _ = fs::remove_dir_all(&dir);

        let path = write_report(&dir, "x.xlsx", b"PK").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"PK");
        fs::remove_dir_all(&dir).unwrap();
    }
}
