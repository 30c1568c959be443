//! Driver Performance template.
//!
//! Columns: 0 assignment, 1 driver, 2..=28 performance block, 29 report end
//! date, 30 action taken and 31 signature (left for manual completion).

use crate::fleet::{DateRange, ProcessedVehicle};
use crate::report::columns::performance_block;
use crate::report::layout::{CellValue, ReportTemplate};

pub const DRIVER_ASSIGNMENT: &str = "PTT TANKER DRIVERS";

#[rustfmt::skip]
const HEADER_ROW_1: &[&str] = &[
    "DRIVER'S ASSIGNMENT", "DRIVER'S NAME", "Raw", "Raw", "Raw", "Raw",
    "TOTAL DISTANCE(KM)", "", "TOTAL DRIVING HOURS", "", "Idling", "",
    "ENGINE HOURS", "", "", "SPEEDING DURATION", "OVERSPEEDING VIOLATION",
    "", "", "", "", "", "", "", "", "HARSH\nACCELERATION", "HARSH\nBRAKING",
    "HARSH\nTURNING", "TOTAL", "Date", "Action Taken", "Signature",
];

#[rustfmt::skip]
const HEADER_ROW_2: &[&str] = &[
    "", "", "Mileage", "Driving Hours", "Idling Duration", "Engine Hours",
    "", "", "", "", "Duration", "", "", "", "", "", "15", "35", "45", "55",
    "60", "65", "75", "80", "Total", "", "", "", "", "", "", "",
];

pub static DRIVER_TEMPLATE: ReportTemplate = ReportTemplate {
    sheet_name: "Driver Performance",
    title: "Driver's Performance Summary",
    title_row: 0,
    title_cols: (1, 31),
    period_label: Some((3, 8, 11)),
    date_from: (5, 8),
    date_to: (5, 20),
    header_rows: (9, 10),
    headers: [HEADER_ROW_1, HEADER_ROW_2],
    data_start_row: 12,
    label_columns: 2,
    column_widths: &[(0, 0, 20.0), (1, 1, 25.0), (2, 31, 8.0)],
};

pub fn driver_row(vehicle: &ProcessedVehicle, date_range: &DateRange) -> Vec<CellValue> {
    let mut row = vec![
        CellValue::text(DRIVER_ASSIGNMENT),
        CellValue::text(format!("Driver - {}", vehicle.name)),
    ];
    row.extend(performance_block(&vehicle.metrics));
    row.extend([
        CellValue::Text(date_range.to_label()),
        CellValue::Blank,
        CellValue::Blank,
    ]);
    row
}
