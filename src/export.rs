//! Excel export functionality.

use std::path::{Path, PathBuf};

use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::format::format_time_opt;
use crate::import::{COLUMNS, ImportReport, REQUIRED_COLUMNS};
use crate::models::{CheckClock, Employee};

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

fn write_headers(worksheet: &mut Worksheet, headers: &[&str], widths: &[f64]) -> Result<(), XlsxError> {
    let format = header_format();
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &format)?;
    }
    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

/// Autofilter over the data and a frozen header row.
fn finish_table(worksheet: &mut Worksheet, rows: usize, columns: usize) -> Result<(), XlsxError> {
    if rows > 0 {
        worksheet.autofilter(0, 0, rows as u32, (columns - 1) as u16)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Export employees to Excel file.
pub fn export_employees(employees: &[Employee], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Employees")?;

    let headers = [
        "Employee Code",
        "Full Name",
        "Email",
        "Phone",
        "NIK",
        "Gender",
        "Position",
        "Branch",
        "Grade",
        "Contract",
        "Join Date",
        "Status",
    ];
    let widths = [15.0, 30.0, 30.0, 16.0, 20.0, 10.0, 22.0, 16.0, 8.0, 12.0, 12.0, 10.0];
    write_headers(worksheet, &headers, &widths)?;

    for (idx, emp) in employees.iter().enumerate() {
        let row = (idx + 1) as u32;

        worksheet.write_string(row, 0, &emp.employee_code)?;
        worksheet.write_string(row, 1, emp.full_name())?;
        worksheet.write_string(row, 2, &emp.email)?;
        worksheet.write_string(row, 3, emp.phone.as_deref().unwrap_or(""))?;
        // Text, so 16-digit NIKs keep every digit.
        worksheet.write_string(row, 4, &emp.nik)?;
        worksheet.write_string(row, 5, emp.gender.label())?;
        worksheet.write_string(row, 6, &emp.position)?;
        worksheet.write_string(row, 7, emp.branch.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 8, emp.grade.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 9, emp.contract_type.label())?;
        worksheet.write_string(row, 10, emp.join_date.to_string())?;
        worksheet.write_string(row, 11, emp.status.label())?;
    }

    finish_table(worksheet, employees.len(), headers.len())?;
    workbook.save(path)?;
    Ok(())
}

/// Export check-clock entries to Excel file.
pub fn export_check_clocks(records: &[CheckClock], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Check Clock")?;

    let hours_format = Format::new().set_num_format("0.00");

    let headers = [
        "Date",
        "Employee",
        "Position",
        "Type",
        "Clock In",
        "Clock Out",
        "Work Hours",
        "Work Type",
        "Location",
        "Status",
        "Note",
    ];
    let widths = [12.0, 30.0, 22.0, 14.0, 10.0, 10.0, 12.0, 10.0, 35.0, 10.0, 30.0];
    write_headers(worksheet, &headers, &widths)?;

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;

        worksheet.write_string(row, 0, record.date.to_string())?;
        worksheet.write_string(row, 1, &record.employee_name)?;
        worksheet.write_string(row, 2, record.position.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 3, record.check_type.label())?;
        worksheet.write_string(row, 4, format_time_opt(record.clock_in))?;
        worksheet.write_string(row, 5, format_time_opt(record.clock_out))?;

        if let Some(minutes) = record.work_minutes() {
            worksheet.write_number_with_format(row, 6, minutes as f64 / 60.0, &hours_format)?;
        } else {
            worksheet.write_string(row, 6, "")?;
        }

        worksheet.write_string(row, 7, record.work_type.map(|w| w.label()).unwrap_or(""))?;
        let location = record.location.as_ref().map(|l| l.display()).unwrap_or_default();
        worksheet.write_string(row, 8, location)?;
        worksheet.write_string(row, 9, record.approval.label())?;
        worksheet.write_string(row, 10, record.note.as_deref().unwrap_or(""))?;
    }

    finish_table(worksheet, records.len(), headers.len())?;
    workbook.save(path)?;
    Ok(())
}

/// Export the row errors of an import check so they can be fixed in the
/// source file.
pub fn export_import_errors(report: &ImportReport, path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Import Errors")?;

    let headers = ["Row", "Column", "Problem"];
    write_headers(worksheet, &headers, &[8.0, 22.0, 60.0])?;

    for (idx, error) in report.errors.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_number(row, 0, error.row as f64)?;
        worksheet.write_string(row, 1, error.column.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 2, &error.message)?;
    }

    finish_table(worksheet, report.errors.len(), headers.len())?;
    workbook.save(path)?;
    Ok(())
}

/// Header text for an import column, `*` marking required ones.
pub fn template_label(column: &str) -> String {
    let label = if column == "nik" {
        "NIK".to_string()
    } else {
        column
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    if REQUIRED_COLUMNS.contains(&column) {
        format!("{label}*")
    } else {
        label
    }
}

fn template_note(column: &str) -> &'static str {
    match column {
        "employee_code" => "Optional. 2-20 letters, digits, '-', '_' or '/'. Generated when blank.",
        "first_name" | "last_name" => "Letters, spaces, '.', ''' and '-'. At most 100 characters.",
        "email" => "Must be unique.",
        "phone" => "Indonesian mobile number: 08..., 628... or +628...",
        "nik" => "16-digit national ID. Must be unique. Keep the cell formatted as text.",
        "gender" => "Male/Female (M, F, L, P, Laki-laki and Perempuan also accepted).",
        "birth_date" => "Date, not in the future and before the join date.",
        "contract_type" => "Permanent, Contract or Intern. Defaults to Permanent.",
        "bank_account_number" => "6-20 digits. Requires Bank Name.",
        "join_date" => "Date, at most one year ahead. YYYY-MM-DD preferred; DD/MM/YYYY accepted.",
        _ => "Optional free text.",
    }
}

const TEMPLATE_EXAMPLE: [&str; 18] = [
    "EMP-001",
    "Siti",
    "Rahmawati",
    "siti.rahmawati@example.com",
    "081234567890",
    "3201234567890001",
    "Female",
    "Bandung",
    "1995-04-12",
    "S1 Accounting",
    "Finance Staff",
    "Bandung",
    "G3",
    "Permanent",
    "BCA",
    "1234567890",
    "Siti Rahmawati",
    "2024-03-01",
];

/// Write the employee import template: header row, one example row and a
/// notes sheet describing each column.
pub fn write_import_template(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let text_format = Format::new().set_num_format("@");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Employees")?;

    let labels: Vec<String> = COLUMNS.iter().map(|c| template_label(c)).collect();
    let headers: Vec<&str> = labels.iter().map(String::as_str).collect();
    let widths: Vec<f64> = COLUMNS.iter().map(|c| if c.ends_with("name") { 22.0 } else { 18.0 }).collect();
    write_headers(worksheet, &headers, &widths)?;

    for (col, value) in TEMPLATE_EXAMPLE.iter().enumerate() {
        worksheet.write_string_with_format(1, col as u16, *value, &text_format)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    let notes = workbook.add_worksheet();
    notes.set_name("Notes")?;
    write_headers(notes, &["Column", "Required", "Rules"], &[24.0, 10.0, 80.0])?;
    for (idx, column) in COLUMNS.iter().enumerate() {
        let row = (idx + 1) as u32;
        notes.write_string(row, 0, template_label(column).trim_end_matches('*'))?;
        notes.write_string(row, 1, if REQUIRED_COLUMNS.contains(column) { "Yes" } else { "No" })?;
        notes.write_string(row, 2, template_note(column))?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Open save file dialog and return selected path.
pub fn show_save_dialog(default_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(default_name)
        .add_filter("Excel Files", &["xlsx"])
        .save_file()
}

/// Open file dialog for an import file.
pub fn show_open_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xls", "ods", "csv"])
        .add_filter("CSV Files", &["csv", "txt"])
        .pick_file()
}

/// Generate default filename for export.
pub fn generate_export_filename(prefix: &str) -> String {
    let now = Local::now();
    format!("{prefix}_{ts}.xlsx", ts = now.format("%Y%m%d_%H%M%S"))
}
