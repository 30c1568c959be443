//! CLI entry point for the fleet performance reporter.
//!
//! Provides subcommands for inspecting fleet activity, saving a raw fleet
//! dump and generating the Driver and Vehicle Performance reports.

mod infra;
mod services;

use crate::infra::dump::DumpFile;
use crate::infra::wialon::{DEFAULT_BASE_URL, WialonClient};
use crate::services::fleet_api::FleetApi;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use fleet_report::activity::ActivityFilter;
use fleet_report::fleet::{
    DateRange, FleetSummary, ReportContext, ReportType, breakdown, classify_fleet, process_fleet,
    select,
};
use fleet_report::output::{
    print_json, print_pretty, report_file_name, write_performance_table, write_report,
};
use fleet_report::report::{TemplateKind, render};
use fleet_report::snapshot::{RawUnit, normalize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fleet_report")]
#[command(
    about = "Fleet activity and PTT performance reports from GPS telemetry",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the fleet's activity breakdown
    Fleet {
        /// Read units from a JSON dump instead of the live backend
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Only list vehicles matching this activity filter
        #[arg(short, long, value_enum, default_value_t = ActivityFilter::All)]
        activity: ActivityFilter,
    },
    /// Generate the Driver and Vehicle Performance reports
    Report {
        /// Read units from a JSON dump instead of the live backend
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Report type; also sets the default date range
        #[arg(short = 't', long, value_enum, default_value_t = ReportType::Weekly)]
        report_type: ReportType,

        /// First day of the period (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the period (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Only include vehicles matching this activity filter
        #[arg(short, long, value_enum, default_value_t = ActivityFilter::All)]
        activity: ActivityFilter,

        /// Directory to write the reports to
        #[arg(short, long, default_value = "reports")]
        output_dir: PathBuf,
    },
    /// Fetch units from the live backend and save them as JSON
    Dump {
        /// File to write
        #[arg(short, long, default_value = "fleet.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/fleet_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fleet_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fleet { input, activity } => {
            let units = load_units(input).await?;
            show_fleet(units, activity);
        }
        Commands::Report {
            input,
            report_type,
            from,
            to,
            activity,
            output_dir,
        } => {
            let defaults = report_type.default_range(Local::now().date_naive());
            let date_range = DateRange {
                from: from.unwrap_or(defaults.from),
                to: to.unwrap_or(defaults.to),
            };
            let ctx = ReportContext::new(Utc::now(), date_range, report_type)?;
            info!(
                period = %date_range,
                period_days = ctx.period_days,
                report_type = %report_type,
                "Report period selected"
            );

            let units = load_units(input).await?;
            generate_reports(units, &ctx, activity, &output_dir)?;
        }
        Commands::Dump { output } => {
            let units = live_source().await?.list_units().await?;
            let json = serde_json::to_string_pretty(&units)?;
            std::fs::write(&output, json)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(units = units.len(), path = %output.display(), "Fleet dump saved");
        }
    }

    Ok(())
}

/// Logs in to the tracking backend using `WIALON_TOKEN`.
async fn live_source() -> Result<WialonClient> {
    let token = std::env::var("WIALON_TOKEN").context("WIALON_TOKEN must be set")?;
    let base_url =
        std::env::var("WIALON_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    WialonClient::login(&base_url, &token).await
}

/// Loads raw units from a dump file when given, otherwise from the backend.
#[tracing::instrument]
async fn load_units(input: Option<PathBuf>) -> Result<Vec<RawUnit>> {
    let source: Box<dyn FleetApi> = match input {
        Some(path) => Box::new(DumpFile::new(path)),
        None => Box::new(live_source().await?),
    };
    source.list_units().await
}

fn show_fleet(units: Vec<RawUnit>, filter: ActivityFilter) {
    let fleet = classify_fleet(units.into_iter().map(normalize).collect(), Utc::now());
    let b = breakdown(&fleet);

    info!(
        total = b.total,
        with_gps = b.with_telemetry,
        active_within_week = b.active_within_week,
        "Fleet loaded"
    );
    info!(
        very_active = b.very_active,
        active = b.active,
        somewhat_active = b.somewhat_active,
        inactive = b.inactive,
        "Fleet activity status"
    );

    for v in select(fleet, filter) {
        info!(
            vehicle = %v.snapshot.name,
            status = %v.activity.tier,
            days_inactive = v.activity.days_inactive,
            speed = v.snapshot.position.speed,
            params = v.snapshot.telemetry.parameter_count,
            "Vehicle"
        );
    }
}

#[tracing::instrument(skip(units, ctx), fields(units = units.len()))]
fn generate_reports(
    units: Vec<RawUnit>,
    ctx: &ReportContext,
    filter: ActivityFilter,
    output_dir: &Path,
) -> Result<()> {
    let fleet = select(
        classify_fleet(units.into_iter().map(normalize).collect(), ctx.now),
        filter,
    );
    info!(selected = fleet.len(), "Vehicles selected");

    let processed = process_fleet(&fleet, ctx)?;
    let summary = FleetSummary::from_processed(&processed);
    print_pretty(&summary);
    print_json(&summary)?;

    let stamp = Local::now();
    for kind in TemplateKind::ALL {
        let bytes = render(&processed, &ctx.date_range, ctx.report_type, kind)?;
        let name = report_file_name(kind, ctx.report_type, &stamp);
        write_report(output_dir, &name, &bytes)?;
    }

    let table = output_dir.join(format!(
        "PTT_Performance_Table_{}_{}.csv",
        ctx.report_type,
        stamp.format("%Y%m%d_%H%M%S")
    ));
    write_performance_table(&table, &processed)?;
    info!(path = %table.display(), "Performance table written");

    Ok(())
}
