//! Declarative fixed-grid templates and the in-memory sheet they produce.
//!
//! Rows and columns are 0-based. Column meaning is positional: a data row is
//! a plain `Vec<CellValue>` indexed by column.

use std::fmt;

use crate::fleet::{DateRange, ReportType};

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Blank,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{n:.2}"),
            CellValue::Blank => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Spans `col..=last_col` on its row.
    MergedTitle { last_col: u16 },
    MergedLabel { last_col: u16 },
    Label,
    Header,
    Data,
}

/// Visual style a cell is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Title,
    Header,
    Text,
    /// Fixed 2-decimal number.
    Number,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCell {
    pub row: u32,
    pub col: u16,
    pub kind: CellKind,
    pub value: CellValue,
}

/// Static description of one report grid.
#[derive(Debug)]
pub struct ReportTemplate {
    pub sheet_name: &'static str,
    pub title: &'static str,
    pub title_row: u32,
    pub title_cols: (u16, u16),
    /// `(row, first_col, last_col)` of the merged "Period: ..." label.
    pub period_label: Option<(u32, u16, u16)>,
    /// `(row, col)` of the "DATE FROM:" label; the date goes one column right.
    pub date_from: (u32, u16),
    pub date_to: (u32, u16),
    pub header_rows: (u32, u32),
    pub headers: [&'static [&'static str]; 2],
    pub data_start_row: u32,
    /// Leading columns always written as text.
    pub label_columns: u16,
    /// `(first_col, last_col, width)`.
    pub column_widths: &'static [(u16, u16, f64)],
}

impl ReportTemplate {
    pub fn column_count(&self) -> usize {
        self.headers[0].len()
    }

    /// Lays out the static cells: title, period block and the two header rows.
    pub fn frame(&self, date_range: &DateRange, report_type: ReportType) -> Sheet {
        let mut cells = vec![LayoutCell {
            row: self.title_row,
            col: self.title_cols.0,
            kind: CellKind::MergedTitle {
                last_col: self.title_cols.1,
            },
            value: CellValue::text(self.title),
        }];

        if let Some((row, first, last)) = self.period_label {
            cells.push(LayoutCell {
                row,
                col: first,
                kind: CellKind::MergedLabel { last_col: last },
                value: CellValue::text(format!(
                    "Period: {}",
                    report_type.as_str().to_uppercase()
                )),
            });
        }

        for ((row, col), label, date) in [
            (self.date_from, "DATE FROM:", date_range.from_label()),
            (self.date_to, "DATE TO:", date_range.to_label()),
        ] {
            cells.push(LayoutCell {
                row,
                col,
                kind: CellKind::Label,
                value: CellValue::text(label),
            });
            cells.push(LayoutCell {
                row,
                col: col + 1,
                kind: CellKind::Data,
                value: CellValue::Text(date),
            });
        }

        for (row, headers) in [
            (self.header_rows.0, self.headers[0]),
            (self.header_rows.1, self.headers[1]),
        ] {
            cells.extend(headers.iter().enumerate().map(|(col, h)| LayoutCell {
                row,
                col: col as u16,
                kind: CellKind::Header,
                value: if h.is_empty() {
                    CellValue::Blank
                } else {
                    CellValue::text(*h)
                },
            }));
        }

        Sheet {
            name: self.sheet_name.to_string(),
            label_columns: self.label_columns,
            column_widths: self.column_widths.to_vec(),
            cells,
        }
    }
}

/// A fully laid-out worksheet, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub label_columns: u16,
    pub column_widths: Vec<(u16, u16, f64)>,
    pub cells: Vec<LayoutCell>,
}

impl Sheet {
    /// Appends one data row, column `i` taking `values[i]`.
    pub fn push_row(&mut self, row: u32, values: Vec<CellValue>) {
        self.cells
            .extend(values.into_iter().enumerate().map(|(col, value)| LayoutCell {
                row,
                col: col as u16,
                kind: CellKind::Data,
                value,
            }));
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&LayoutCell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    pub fn value(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cell(row, col).map(|c| &c.value)
    }

    /// Cells of `row`, ordered by column.
    pub fn row(&self, row: u32) -> Vec<&LayoutCell> {
        let mut cells: Vec<_> = self.cells.iter().filter(|c| c.row == row).collect();
        cells.sort_by_key(|c| c.col);
        cells
    }

    pub fn style_of(&self, cell: &LayoutCell) -> CellStyle {
        match (cell.kind, &cell.value) {
            (CellKind::MergedTitle { .. }, _) => CellStyle::Title,
            (CellKind::MergedLabel { .. } | CellKind::Label | CellKind::Header, _) => {
                CellStyle::Header
            }
            (CellKind::Data, CellValue::Number(_)) if cell.col >= self.label_columns => {
                CellStyle::Number
            }
            (CellKind::Data, _) => CellStyle::Text,
        }
    }
}
