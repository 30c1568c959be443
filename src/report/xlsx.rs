//! Writes a laid-out [`Sheet`] into an xlsx workbook.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use tracing::debug;

use crate::error::ReportError;
use crate::report::layout::{CellKind, CellStyle, CellValue, Sheet};

/// Hard row limit of an xlsx worksheet.
pub const MAX_ROWS: usize = 1_048_576;

struct Formats {
    title: Format,
    header: Format,
    text: Format,
    number: Format,
}

impl Formats {
    fn new() -> Self {
        let centered = || {
            Format::new()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
        };

        Self {
            title: centered()
                .set_bold()
                .set_font_size(16)
                .set_background_color(Color::RGB(0xD9E1F2)),
            header: centered()
                .set_bold()
                .set_font_size(10)
                .set_background_color(Color::RGB(0xB4C6E7))
                .set_text_wrap(),
            text: centered().set_font_size(9),
            number: centered().set_font_size(9).set_num_format("#,##0.00"),
        }
    }

    fn get(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Title => &self.title,
            CellStyle::Header => &self.header,
            CellStyle::Text => &self.text,
            CellStyle::Number => &self.number,
        }
    }
}

/// Serializes `sheet` as a single-worksheet xlsx document.
pub fn to_bytes(sheet: &Sheet) -> Result<Vec<u8>, ReportError> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.name)?;

    for &(first, last, width) in &sheet.column_widths {
        for col in first..=last {
            worksheet.set_column_width(col, width)?;
        }
    }

    for cell in &sheet.cells {
        let format = formats.get(sheet.style_of(cell));
        match (cell.kind, &cell.value) {
            (CellKind::MergedTitle { last_col } | CellKind::MergedLabel { last_col }, value) => {
                worksheet.merge_range(
                    cell.row,
                    cell.col,
                    cell.row,
                    last_col,
                    &value.to_string(),
                    format,
                )?;
            }
            (_, CellValue::Text(s)) => {
                worksheet.write_string_with_format(cell.row, cell.col, s, format)?;
            }
            (_, CellValue::Number(n)) => {
                worksheet.write_number_with_format(cell.row, cell.col, *n, format)?;
            }
            (_, CellValue::Blank) => {
                worksheet.write_blank(cell.row, cell.col, format)?;
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    debug!(sheet = %sheet.name, cells = sheet.cells.len(), bytes = bytes.len(), "Workbook written");
    Ok(bytes)
}
