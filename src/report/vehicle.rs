//! Vehicle Performance template.
//!
//! Columns: 0 department, 1 type, 2 vehicle, 3..=29 performance block,
//! 30 fuel, 31 fuel while driving, 32 fuel while idling, 33 CO2.

use crate::fleet::ProcessedVehicle;
use crate::report::columns::performance_block;
use crate::report::layout::{CellValue, ReportTemplate};

pub const DEPARTMENT: &str = "PTT TANKER";
pub const VEHICLE_TYPE: &str = "TANKER";

/// Shares of total fuel attributed to driving and idling. They sum to 0.9
/// on the paper form and are kept that way.
pub const DRIVING_FUEL_SHARE: f64 = 0.6;
pub const IDLING_FUEL_SHARE: f64 = 0.3;

#[rustfmt::skip]
const HEADER_ROW_1: &[&str] = &[
    "Department", "Type", "Vehicle No.", "Raw", "Raw", "Raw", "Raw",
    "TOTAL DISTANCE(KM)", "", "TOTAL DRIVING HOURS", "", "Idling", "",
    "ENGINE HOURS", "", "", "SPEEDING DURATION", "OVERSPEEDING VIOLATION",
    "", "", "", "", "", "", "", "", "HARSH\nACCELERATION", "HARSH\nBRAKING",
    "HARSH\nTURNING", "TOTAL", "FUEL CONSUMPTION (LITRE)", "", "",
    "TOTAL CO2 EMISSION (KG)",
];

#[rustfmt::skip]
const HEADER_ROW_2: &[&str] = &[
    "", "", "", "Mileage", "Driving Hours", "Idling Duration", "Engine Hours",
    "", "", "", "", "Duration", "", "", "", "", "", "15", "35", "45", "55",
    "60", "65", "75", "80", "Total", "", "", "", "", "DRIVING HOURS",
    "IDLING DURATION", "ENGINE HOURS", "",
];

pub static VEHICLE_TEMPLATE: ReportTemplate = ReportTemplate {
    sheet_name: "Vehicle Performance",
    title: "Vehicle Performance Summary",
    title_row: 0,
    title_cols: (2, 33),
    period_label: None,
    date_from: (4, 9),
    date_to: (4, 21),
    header_rows: (7, 8),
    headers: [HEADER_ROW_1, HEADER_ROW_2],
    data_start_row: 10,
    label_columns: 3,
    column_widths: &[(0, 0, 15.0), (1, 1, 10.0), (2, 2, 15.0), (3, 33, 8.0)],
};

pub fn vehicle_row(vehicle: &ProcessedVehicle) -> Vec<CellValue> {
    let m = &vehicle.metrics;
    let mut row = vec![
        CellValue::text(DEPARTMENT),
        CellValue::text(VEHICLE_TYPE),
        CellValue::text(vehicle.name.as_str()),
    ];
    row.extend(performance_block(m));
    row.extend([
        CellValue::from(m.fuel_consumption),
        CellValue::from(m.fuel_consumption * DRIVING_FUEL_SHARE),
        CellValue::from(m.fuel_consumption * IDLING_FUEL_SHARE),
        CellValue::from(m.co2_emission),
    ]);
    row
}
