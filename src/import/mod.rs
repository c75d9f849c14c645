//! Bulk employee import: read a CSV or spreadsheet, validate every row and
//! report which rows can be uploaded.

pub mod csv;
pub mod excel;
pub mod fields;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::{ContractType, CreateEmployee, Employee};
use crate::table::{SortKey, Tabular};

/// Largest number of data rows accepted in one file.
pub const MAX_IMPORT_ROWS: usize = 1000;

/// Canonical column names, in template order.
pub const COLUMNS: [&str; 18] = [
    "employee_code",
    "first_name",
    "last_name",
    "email",
    "phone",
    "nik",
    "gender",
    "birth_place",
    "birth_date",
    "education",
    "position",
    "branch",
    "grade",
    "contract_type",
    "bank_name",
    "bank_account_number",
    "bank_account_holder",
    "join_date",
];

/// Columns that must be present in the header.
pub const REQUIRED_COLUMNS: [&str; 6] = ["first_name", "email", "nik", "gender", "position", "join_date"];

/// File extensions the importer understands.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["csv", "txt", "xlsx", "xlsm", "xls", "ods"];

/// Header row plus data rows, all cells as trimmed strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One problem found in one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// Spreadsheet row number; the header is row 1.
    pub row: usize,
    /// Canonical column name, `None` for whole-row problems.
    pub column: Option<String>,
    pub message: String,
}

impl RowError {
    fn new(row: usize, column: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            row,
            column: column.map(str::to_string),
            message: message.into(),
        }
    }
}

impl Tabular for RowError {
    fn matches_search(&self, needle: &str) -> bool {
        self.message.to_lowercase().contains(needle)
            || self.column.as_deref().is_some_and(|c| c.contains(needle))
            || self.row.to_string() == needle
    }

    fn filter_value(&self, key: &str) -> Option<String> {
        match key {
            "column" => self.column.clone(),
            _ => None,
        }
    }

    fn sort_key(&self, column: &str) -> SortKey {
        match column {
            "row" => SortKey::Number(self.row as f64),
            "column" => self.column.as_deref().map(SortKey::text).unwrap_or(SortKey::Missing),
            "message" => SortKey::text(&self.message),
            _ => SortKey::Missing,
        }
    }
}

/// Identifiers already registered on the backend.
#[derive(Debug, Clone, Default)]
pub struct ExistingKeys {
    emails: HashSet<String>,
    niks: HashSet<String>,
    codes: HashSet<String>,
}

impl ExistingKeys {
    pub fn from_employees(employees: &[Employee]) -> Self {
        let mut keys = Self::default();
        for employee in employees {
            keys.emails.insert(employee.email.to_lowercase());
            keys.niks.insert(employee.nik.clone());
            keys.codes.insert(employee.employee_code.to_uppercase());
        }
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.niks.is_empty() && self.codes.is_empty()
    }
}

/// Outcome of validating an import file.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Rows ready to upload, with their spreadsheet row number.
    pub valid: Vec<(usize, CreateEmployee)>,
    pub errors: Vec<RowError>,
    /// Non-blank data rows.
    pub total_rows: usize,
    pub blank_rows: usize,
    /// Header cells that matched no known column.
    pub ignored_columns: Vec<String>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Row numbers with at least one error, ascending.
    pub fn invalid_rows(&self) -> Vec<usize> {
        self.errors
            .iter()
            .map(|e| e.row)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Errors reported for one row.
    pub fn errors_for(&self, row: usize) -> impl Iterator<Item = &RowError> {
        self.errors.iter().filter(move |e| e.row == row)
    }

    pub fn summary(&self) -> String {
        let invalid = self.invalid_rows().len();
        let mut text = format!(
            "{} of {} rows valid, {} invalid ({} errors)",
            self.valid.len(),
            self.total_rows,
            invalid,
            self.errors.len()
        );
        if self.blank_rows > 0 {
            let plural = if self.blank_rows == 1 { "" } else { "s" };
            text.push_str(&format!(", {} blank row{plural} skipped", self.blank_rows));
        }
        text
    }

    /// Employees to send to the bulk endpoint.
    pub fn employees(&self) -> Vec<CreateEmployee> {
        self.valid.iter().map(|(_, e)| e.clone()).collect()
    }
}

/// Map a raw header cell to a canonical column name.
pub fn normalize_header(header: &str) -> String {
    let key: String = header
        .trim()
        .trim_end_matches('*')
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();

    let canonical = match key.as_str() {
        "name" | "firstname" | "given_name" | "nama" | "nama_depan" => "first_name",
        "lastname" | "surname" | "family_name" | "nama_belakang" => "last_name",
        "email_address" | "e_mail" | "mail" => "email",
        "phone_number" | "mobile" | "mobile_number" | "no_hp" | "whatsapp" => "phone",
        "national_id" | "nik_ktp" | "ktp" | "id_number" => "nik",
        "sex" | "jenis_kelamin" => "gender",
        "place_of_birth" | "tempat_lahir" => "birth_place",
        "date_of_birth" | "dob" | "birthdate" | "tanggal_lahir" => "birth_date",
        "last_education" | "pendidikan" => "education",
        "job_title" | "title" | "jabatan" => "position",
        "cabang" => "branch",
        "level" => "grade",
        "contract" | "employment_type" | "jenis_kontrak" => "contract_type",
        "bank" => "bank_name",
        "account_number" | "bank_account" | "no_rekening" => "bank_account_number",
        "account_holder" | "account_name" | "bank_account_name" | "atas_nama" => "bank_account_holder",
        "start_date" | "hire_date" | "joined" | "joined_at" | "tanggal_masuk" => "join_date",
        "code" | "employee_id" | "emp_code" | "nip" => "employee_code",
        other => other,
    };
    canonical.to_string()
}

/// Column positions resolved from the header row.
struct ColumnMap {
    index: HashMap<&'static str, usize>,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<(Self, Vec<String>)> {
        let mut index = HashMap::new();
        let mut ignored = Vec::new();

        for (pos, header) in headers.iter().enumerate() {
            if header.trim().is_empty() {
                continue;
            }
            let key = normalize_header(header);
            match COLUMNS.iter().find(|c| **c == key) {
                Some(column) => {
                    if index.insert(*column, pos).is_some() {
                        return Err(AppError::import(format!("Column '{column}' appears more than once")));
                    }
                }
                None => ignored.push(header.trim().to_string()),
            }
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !index.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::import(format!("Missing required columns: {}", missing.join(", "))));
        }

        Ok((Self { index }, ignored))
    }

    fn cell<'a>(&self, row: &'a [String], column: &str) -> &'a str {
        self.index
            .get(column)
            .and_then(|&pos| row.get(pos))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

/// First row that claimed each identifier.
#[derive(Default)]
struct SeenKeys {
    emails: HashMap<String, usize>,
    niks: HashMap<String, usize>,
    codes: HashMap<String, usize>,
}

/// Validates rows one at a time, collecting every problem in the row.
struct RowCheck<'a> {
    row: usize,
    map: &'a ColumnMap,
    cells: &'a [String],
    errors: Vec<RowError>,
}

impl<'a> RowCheck<'a> {
    fn raw(&self, column: &str) -> &'a str {
        self.map.cell(self.cells, column)
    }

    fn fail(&mut self, column: &str, message: impl Into<String>) {
        self.errors.push(RowError::new(self.row, Some(column), message));
    }

    fn required<T>(&mut self, column: &str, rule: impl Fn(&str) -> std::result::Result<T, String>) -> Option<T> {
        let value = self.raw(column);
        if value.is_empty() {
            self.fail(column, "is required");
            return None;
        }
        match rule(value) {
            Ok(v) => Some(v),
            Err(msg) => {
                self.fail(column, msg);
                None
            }
        }
    }

    /// `Ok(None)` when blank, `Err(())` when present but invalid.
    fn optional<T>(
        &mut self,
        column: &str,
        rule: impl Fn(&str) -> std::result::Result<T, String>,
    ) -> std::result::Result<Option<T>, ()> {
        let value = self.raw(column);
        if value.is_empty() {
            return Ok(None);
        }
        match rule(value) {
            Ok(v) => Ok(Some(v)),
            Err(msg) => {
                self.fail(column, msg);
                Err(())
            }
        }
    }

    fn text(&self, column: &str) -> Option<String> {
        let value = self.raw(column);
        (!value.is_empty()).then(|| value.to_string())
    }
}

fn validate_row(map: &ColumnMap, row: usize, cells: &[String], today: NaiveDate) -> (Option<CreateEmployee>, Vec<RowError>) {
    let mut check = RowCheck {
        row,
        map,
        cells,
        errors: Vec::new(),
    };

    let employee_code = check.optional("employee_code", fields::employee_code);
    let first_name = check.required("first_name", fields::name);
    let last_name = check.optional("last_name", fields::name);
    let email = check.required("email", fields::email);
    let phone = check.optional("phone", fields::phone);
    let nik = check.required("nik", fields::nik);
    let gender = check.required("gender", fields::gender);
    let birth_date = check.optional("birth_date", fields::date);
    let position = check.required("position", |v| Ok(v.to_string()));
    let contract_type = check.optional("contract_type", fields::contract_type);
    let bank_account_number = check.optional("bank_account_number", fields::bank_account);
    let join_date = check.required("join_date", fields::date);

    let bank_name = check.text("bank_name");
    if matches!(bank_account_number, Ok(Some(_))) && bank_name.is_none() {
        check.fail("bank_name", "is required when a bank account number is given");
    }

    if let (Ok(birth), Some(join)) = (&birth_date, join_date) {
        for (column, message) in fields::check_dates(*birth, join, today) {
            check.fail(column, message);
        }
    }

    if !check.errors.is_empty() {
        return (None, check.errors);
    }

    // Every required field parsed and no optional field failed.
    let (
        Ok(employee_code),
        Some(first_name),
        Ok(last_name),
        Some(email),
        Ok(phone),
        Some(nik),
        Some(gender),
        Ok(birth_date),
        Some(position),
        Ok(contract_type),
        Ok(bank_account_number),
        Some(join_date),
    ) = (
        employee_code,
        first_name,
        last_name,
        email,
        phone,
        nik,
        gender,
        birth_date,
        position,
        contract_type,
        bank_account_number,
        join_date,
    )
    else {
        return (None, check.errors);
    };

    let employee = CreateEmployee {
        employee_code,
        first_name,
        last_name,
        email,
        phone,
        nik,
        gender,
        birth_place: check.text("birth_place"),
        birth_date,
        education: check.text("education"),
        position,
        branch: check.text("branch"),
        grade: check.text("grade"),
        contract_type: contract_type.unwrap_or(ContractType::Permanent),
        bank_name,
        bank_account_number,
        bank_account_holder: check.text("bank_account_holder"),
        join_date,
    };
    (Some(employee), Vec::new())
}

fn check_duplicates(
    row: usize,
    employee: &CreateEmployee,
    seen: &SeenKeys,
    existing: &ExistingKeys,
) -> Vec<RowError> {
    let mut errors = Vec::new();
    let code = employee.employee_code.as_deref();

    let checks: [(&str, Option<&str>, &HashMap<String, usize>, &HashSet<String>); 3] = [
        ("email", Some(employee.email.as_str()), &seen.emails, &existing.emails),
        ("nik", Some(employee.nik.as_str()), &seen.niks, &existing.niks),
        ("employee_code", code, &seen.codes, &existing.codes),
    ];

    for (column, value, seen, existing) in checks {
        let Some(value) = value else { continue };
        if let Some(first) = seen.get(value) {
            errors.push(RowError::new(row, Some(column), format!("duplicate of row {first}")));
        } else if existing.contains(value) {
            errors.push(RowError::new(row, Some(column), format!("'{value}' is already registered")));
        }
    }
    errors
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Validate a sheet against the employee import rules.
///
/// File-level problems (missing columns, too many rows) are errors; row
/// problems are collected in the report. Duplicates are judged against the
/// first valid row holding the same email, NIK or employee code.
pub fn validate_sheet(sheet: &RawSheet, existing: &ExistingKeys, today: NaiveDate) -> Result<ImportReport> {
    if sheet.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::import("The file has no header row"));
    }
    let (map, ignored_columns) = ColumnMap::resolve(&sheet.headers)?;

    let data_rows = sheet.rows.iter().filter(|r| !is_blank(r)).count();
    if data_rows > MAX_IMPORT_ROWS {
        return Err(AppError::import(format!(
            "The file has {data_rows} rows; at most {MAX_IMPORT_ROWS} can be imported at once"
        )));
    }

    let mut report = ImportReport {
        ignored_columns,
        ..Default::default()
    };
    let mut seen = SeenKeys::default();

    for (idx, cells) in sheet.rows.iter().enumerate() {
        let row = idx + 2;
        if is_blank(cells) {
            report.blank_rows += 1;
            continue;
        }
        report.total_rows += 1;

        let (employee, errors) = validate_row(&map, row, cells, today);
        let Some(employee) = employee else {
            report.errors.extend(errors);
            continue;
        };

        let duplicates = check_duplicates(row, &employee, &seen, existing);
        if !duplicates.is_empty() {
            report.errors.extend(duplicates);
            continue;
        }

        seen.emails.insert(employee.email.clone(), row);
        seen.niks.insert(employee.nik.clone(), row);
        if let Some(code) = &employee.employee_code {
            seen.codes.insert(code.clone(), row);
        }
        report.valid.push((row, employee));
    }

    debug!(
        valid = report.valid.len(),
        errors = report.errors.len(),
        blank = report.blank_rows,
        "Validated import sheet"
    );
    Ok(report)
}

/// Read a CSV or spreadsheet file, choosing the reader by extension.
pub fn load_file(path: &Path) -> Result<RawSheet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "txt" => self::csv::read_csv_file(path),
        "xlsx" | "xlsm" | "xls" | "ods" => excel::read_workbook(path),
        _ => Err(AppError::import(format!(
            "Unsupported file type '.{ext}' (use {})",
            SUPPORTED_EXTENSIONS.join(", ")
        ))),
    }
}

/// Read and validate an import file.
pub fn validate_file(path: &Path, existing: &ExistingKeys, today: NaiveDate) -> Result<ImportReport> {
    let sheet = load_file(path)?;
    let report = validate_sheet(&sheet, existing, today)?;
    info!("Import check of {}: {}", path.display(), report.summary());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn sheet(headers: &[&str], rows: &[&[&str]]) -> RawSheet {
        RawSheet {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    const HEADERS: [&str; 7] = ["First Name*", "Email", "NIK", "Gender", "Position", "Join Date", "Phone Number"];

    fn good_row<'a>(email: &'a str, nik: &'a str) -> [&'a str; 7] {
        ["Siti", email, nik, "F", "Staff", "2024-03-01", "0812-3456-7890"]
    }

    #[test]
    fn test_normalize_header_aliases() {
        assert_eq!(normalize_header(" First Name* "), "first_name");
        assert_eq!(normalize_header("Name"), "first_name");
        assert_eq!(normalize_header("Phone-Number"), "phone");
        assert_eq!(normalize_header("National ID"), "nik");
        assert_eq!(normalize_header("Tanggal Masuk"), "join_date");
        assert_eq!(normalize_header("Favourite Colour"), "favourite_colour");
    }

    #[test]
    fn test_valid_rows_become_employees() {
        let a = good_row("siti@example.com", "3201234567890001");
        let data = sheet(&HEADERS, &[&a]);
        let report = validate_sheet(&data, &ExistingKeys::default(), today()).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.total_rows, 1);
        let (row, employee) = &report.valid[0];
        assert_eq!(*row, 2);
        assert_eq!(employee.first_name, "Siti");
        assert_eq!(employee.gender, Gender::Female);
        assert_eq!(employee.phone.as_deref(), Some("081234567890"));
        assert_eq!(employee.contract_type, ContractType::Permanent);
        assert_eq!(employee.join_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_missing_required_column_is_file_error() {
        let data = sheet(&["First Name", "Email"], &[&["Siti", "siti@example.com"]]);
        let err = validate_sheet(&data, &ExistingKeys::default(), today()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nik"));
        assert!(msg.contains("join_date"));
    }

    #[test]
    fn test_duplicate_header_is_file_error() {
        let data = sheet(&["Email", "E-mail"], &[]);
        assert!(validate_sheet(&data, &ExistingKeys::default(), today()).is_err());
    }

    #[test]
    fn test_row_collects_every_error() {
        let bad = ["", "not-an-email", "123", "X", "Staff", "31/02/2024", "021-555"];
        let data = sheet(&HEADERS, &[&bad]);
        let report = validate_sheet(&data, &ExistingKeys::default(), today()).unwrap();

        assert!(report.valid.is_empty());
        let columns: Vec<_> = report.errors.iter().filter_map(|e| e.column.as_deref()).collect();
        assert_eq!(columns, ["first_name", "email", "phone", "nik", "gender", "join_date"]);
        assert!(report.errors.iter().all(|e| e.row == 2));
        assert_eq!(report.invalid_rows(), vec![2]);
    }

    #[test]
    fn test_duplicates_within_file() {
        let a = good_row("siti@example.com", "3201234567890001");
        let b = good_row("SITI@example.com", "3201234567890002");
        let c = good_row("budi@example.com", "3201234567890001");
        let data = sheet(&HEADERS, &[&a, &b, &c]);
        let report = validate_sheet(&data, &ExistingKeys::default(), today()).unwrap();

        assert_eq!(report.valid.len(), 1);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].row, 3);
        assert_eq!(report.errors[0].column.as_deref(), Some("email"));
        assert_eq!(report.errors[0].message, "duplicate of row 2");
        assert_eq!(report.errors[1].row, 4);
        assert_eq!(report.errors[1].column.as_deref(), Some("nik"));
    }

    #[test]
    fn test_invalid_first_row_does_not_claim_keys() {
        let mut a = good_row("siti@example.com", "3201234567890001");
        a[3] = "?";
        let b = good_row("siti@example.com", "3201234567890001");
        let data = sheet(&HEADERS, &[&a, &b]);
        let report = validate_sheet(&data, &ExistingKeys::default(), today()).unwrap();

        assert_eq!(report.valid.len(), 1);
        assert_eq!(report.valid[0].0, 3);
    }

    #[test]
    fn test_existing_keys_flag_registered_rows() {
        let existing = Employee {
            id: 1,
            employee_code: "EMP-001".to_string(),
            first_name: "Budi".to_string(),
            last_name: None,
            email: "Budi@Example.com".to_string(),
            phone: None,
            nik: "3201234567890009".to_string(),
            gender: Gender::Male,
            birth_place: None,
            birth_date: None,
            education: None,
            position: "Staff".to_string(),
            branch: None,
            grade: None,
            contract_type: ContractType::Permanent,
            bank_name: None,
            bank_account_number: None,
            bank_account_holder: None,
            join_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            status: Default::default(),
        };
        let keys = ExistingKeys::from_employees(&[existing]);
        let a = good_row("budi@example.com", "3201234567890001");
        let report = validate_sheet(&sheet(&HEADERS, &[&a]), &keys, today()).unwrap();

        assert!(report.valid.is_empty());
        assert!(report.errors[0].message.contains("already registered"));
    }

    #[test]
    fn test_blank_rows_skipped_and_numbering_kept() {
        let a = good_row("siti@example.com", "3201234567890001");
        let blank = [""; 7];
        let mut b = good_row("budi@example.com", "3201234567890002");
        b[1] = "broken";
        let data = sheet(&HEADERS, &[&a, &blank, &b]);
        let report = validate_sheet(&data, &ExistingKeys::default(), today()).unwrap();

        assert_eq!(report.blank_rows, 1);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.errors[0].row, 4);
        assert_eq!(report.summary(), "1 of 2 rows valid, 1 invalid (1 errors), 1 blank row skipped");
    }

    fn filler_sheet(rows: usize) -> RawSheet {
        RawSheet {
            headers: HEADERS.iter().map(|s| s.to_string()).collect(),
            rows: (0..rows).map(|_| vec!["x".to_string()]).collect(),
        }
    }

    #[test]
    fn test_too_many_rows_rejected() {
        let err = validate_sheet(&filler_sheet(MAX_IMPORT_ROWS + 1), &ExistingKeys::default(), today()).unwrap_err();
        assert!(matches!(err, AppError::Import(_)), "{err}");
    }

    #[test]
    fn test_row_limit_is_inclusive() {
        let report = validate_sheet(&filler_sheet(MAX_IMPORT_ROWS), &ExistingKeys::default(), today()).unwrap();
        assert_eq!(report.total_rows, MAX_IMPORT_ROWS);
        assert_eq!(report.invalid_rows().len(), MAX_IMPORT_ROWS);

        // Blank rows do not count toward the limit.
        let mut sheet = filler_sheet(MAX_IMPORT_ROWS);
        sheet.rows.push(vec![String::new()]);
        let report = validate_sheet(&sheet, &ExistingKeys::default(), today()).unwrap();
        assert_eq!(report.blank_rows, 1);
    }

    #[test]
    fn test_bank_name_required_with_account() {
        let mut headers = HEADERS.to_vec();
        headers.push("Account Number");
        let mut row = good_row("siti@example.com", "3201234567890001").to_vec();
        row.push("1234567890");
        let report = validate_sheet(&sheet(&headers, &[row.as_slice()]), &ExistingKeys::default(), today()).unwrap();
        assert_eq!(report.errors[0].column.as_deref(), Some("bank_name"));
    }

    #[test]
    fn test_unknown_columns_reported() {
        let mut headers = HEADERS.to_vec();
        headers.push("Shoe Size");
        let mut row = good_row("siti@example.com", "3201234567890001").to_vec();
        row.push("42");
        let report = validate_sheet(&sheet(&headers, &[row.as_slice()]), &ExistingKeys::default(), today()).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.ignored_columns, vec!["Shoe Size".to_string()]);
    }

    #[test]
    fn test_load_file_rejects_unknown_extension() {
        let err = load_file(Path::new("staff.pdf")).unwrap_err();
        assert!(err.to_string().contains(".pdf"));
    }
}
