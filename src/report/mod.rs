//! Fixed-layout report rendering.
//!
//! A [`ReportTemplate`] lays out the title, period block and two header rows
//! once; each [`ProcessedVehicle`] then fills one data row, in input order,
//! starting at the template's data row. The finished [`Sheet`] is written to
//! xlsx by [`xlsx::to_bytes`].

pub mod columns;
pub mod driver;
pub mod layout;
pub mod vehicle;
pub mod xlsx;

use clap::ValueEnum;
use tracing::info;

use crate::error::ReportError;
use crate::fleet::{DateRange, ProcessedVehicle, ReportType};
use driver::{DRIVER_TEMPLATE, driver_row};
pub use layout::{CellKind, CellStyle, CellValue, LayoutCell, ReportTemplate, Sheet};
use vehicle::{VEHICLE_TEMPLATE, vehicle_row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TemplateKind {
    DriverPerformance,
    VehiclePerformance,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [
        TemplateKind::DriverPerformance,
        TemplateKind::VehiclePerformance,
    ];

    pub fn template(self) -> &'static ReportTemplate {
        match self {
            TemplateKind::DriverPerformance => &DRIVER_TEMPLATE,
            TemplateKind::VehiclePerformance => &VEHICLE_TEMPLATE,
        }
    }

    /// Subject word used in report file names.
    pub fn subject(self) -> &'static str {
        match self {
            TemplateKind::DriverPerformance => "Driver",
            TemplateKind::VehiclePerformance => "Vehicle",
        }
    }

    fn row(self, vehicle: &ProcessedVehicle, date_range: &DateRange) -> Vec<CellValue> {
        match self {
            TemplateKind::DriverPerformance => driver_row(vehicle, date_range),
            TemplateKind::VehiclePerformance => vehicle_row(vehicle),
        }
    }
}

/// Checks that `vehicles` data rows starting at `data_start_row` fit in a
/// worksheet.
pub fn check_capacity(data_start_row: u32, vehicles: usize) -> Result<(), ReportError> {
    let rows = data_start_row as usize + vehicles;
    if rows > xlsx::MAX_ROWS {
        return Err(ReportError::LayoutOverflow {
            rows,
            limit: xlsx::MAX_ROWS,
        });
    }
    Ok(())
}

/// Lays out every vehicle into the template's grid.
///
/// # Errors
///
/// [`ReportError::LayoutOverflow`] if the rows would not fit in a worksheet.
pub fn build_sheet(
    vehicles: &[ProcessedVehicle],
    date_range: &DateRange,
    report_type: ReportType,
    kind: TemplateKind,
) -> Result<Sheet, ReportError> {
    let template = kind.template();
    check_capacity(template.data_start_row, vehicles.len())?;

    let mut sheet = template.frame(date_range, report_type);
    for (row, vehicle) in (template.data_start_row..).zip(vehicles) {
        sheet.push_row(row, kind.row(vehicle, date_range));
    }
    Ok(sheet)
}

/// Renders one report document as xlsx bytes.
#[tracing::instrument(skip(vehicles, date_range), fields(vehicles = vehicles.len()))]
pub fn render(
    vehicles: &[ProcessedVehicle],
    date_range: &DateRange,
    report_type: ReportType,
    kind: TemplateKind,
) -> Result<Vec<u8>, ReportError> {
    let sheet = build_sheet(vehicles, date_range, report_type, kind)?;
    let bytes = xlsx::to_bytes(&sheet)?;
    info!(bytes = bytes.len(), "Report rendered");
    Ok(bytes)
}
