//! The performance block shared by both templates.
//!
//! 27 consecutive columns: raw figures, the paired total columns, speeding
//! duration, eight speeding brackets with their total, and the harsh-event
//! counters with theirs.

use crate::metrics::PerformanceMetrics;
use crate::report::layout::CellValue;

/// Divisors applied to the violation count for each speeding bracket
/// (15, 35, 45, 55, 60, 65, 75, 80 km/h over). Each bracket is an
/// independent view of the same count; they do not sum to the total.
pub const BRACKET_DIVISORS: [u32; 8] = [8, 6, 4, 3, 2, 2, 1, 1];

pub const PERFORMANCE_BLOCK_WIDTH: usize = 27;

pub fn speeding_brackets(violations: u32) -> [u32; 8] {
    BRACKET_DIVISORS.map(|d| violations / d)
}

pub fn performance_block(m: &PerformanceMetrics) -> Vec<CellValue> {
    let thousands = if m.total_distance > 0.0 {
        m.total_distance / 1000.0
    } else {
        0.0
    };

    let mut cells = vec![
        // raw
        m.total_distance.into(),
        m.driving_hours.into(),
        m.idling_hours.into(),
        m.engine_hours.into(),
        // totals
        m.total_distance.into(),
        thousands.into(),
        m.driving_hours.into(),
        CellValue::Blank,
        m.idling_hours.into(),
        CellValue::Blank,
        m.engine_hours.into(),
        CellValue::Blank,
        CellValue::Blank,
        // speeding duration is not tracked
        CellValue::Number(0.0),
    ];
    cells.extend(speeding_brackets(m.speeding_violations).map(CellValue::from));
    cells.push(CellValue::from(m.speeding_violations));
    cells.extend([
        CellValue::from(m.harsh_acceleration),
        CellValue::from(m.harsh_braking),
        CellValue::from(m.harsh_cornering),
        CellValue::from(m.total_harsh_events),
    ]);
    cells
}
