//! Spreadsheet reader (xlsx, xlsm, xls, ods) for import files.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use super::RawSheet;
use crate::error::{AppError, Result};

/// Render a numeric cell without a trailing `.0` when it is integral, so
/// phone numbers and NIKs typed as numbers survive.
fn number_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e17 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Convert one cell to the text the validator expects.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => number_text(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if dt.is_datetime() => datetime.date().format("%Y-%m-%d").to_string(),
            _ => number_text(dt.as_f64()),
        },
        Data::DateTimeIso(s) => {
            let s = s.trim();
            s.split_once('T').map_or(s, |(date, _)| date).to_string()
        }
        other => other.to_string().trim().to_string(),
    }
}

/// Read the first worksheet of a workbook.
pub fn read_workbook(path: &Path) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::import("The workbook has no worksheets"))??;

    let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    let Some(headers) = rows.next() else {
        return Err(AppError::import("The first worksheet is empty"));
    };

    Ok(RawSheet {
        headers,
        rows: rows.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_text() {
        assert_eq!(number_text(3201234567890001.0), "3201234567890001");
        assert_eq!(number_text(81234567890.0), "81234567890");
        assert_eq!(number_text(12.5), "12.5");
        assert_eq!(number_text(0.0), "0");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("  Siti ".to_string())), "Siti");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Float(46027.0)), "46027");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_iso_datetime_cell_keeps_date() {
        assert_eq!(cell_text(&Data::DateTimeIso("2026-01-05T08:30:00".to_string())), "2026-01-05");
        assert_eq!(cell_text(&Data::DateTimeIso("2026-01-05".to_string())), "2026-01-05");
    }

    #[test]
    fn test_date_cells_read_as_iso() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let dir = std::env::temp_dir().join(format!("hris-desk-dates-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dates.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        sheet.write_string(0, 0, "First Name").unwrap();
        sheet.write_string(0, 1, "Join Date").unwrap();
        sheet.write_string(1, 0, "Siti").unwrap();
        let join = ExcelDateTime::from_ymd(2026, 1, 5).unwrap();
        sheet.write_datetime_with_format(1, 1, &join, &date_format).unwrap();
        workbook.save(&path).unwrap();

        let sheet = read_workbook(&path).unwrap();
        assert_eq!(sheet.rows[0], vec!["Siti".to_string(), "2026-01-05".to_string()]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_workbook_round_trip_through_template() {
        let dir = std::env::temp_dir().join(format!("hris-desk-excel-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("template.xlsx");

        crate::export::write_import_template(&path).unwrap();
        let sheet = read_workbook(&path).unwrap();

        assert_eq!(sheet.headers.len(), super::super::COLUMNS.len());
        assert_eq!(super::super::normalize_header(&sheet.headers[1]), "first_name");
        assert_eq!(sheet.rows.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(read_workbook(Path::new("/nonexistent/staff.xlsx")).is_err());
    }
}
