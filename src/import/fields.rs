//! Field-level parsing and validation rules for employee import rows.

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::format::parse_flexible_date;
use crate::models::{ContractType, Gender};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex"));

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\+62|62|0)8\d{7,11}$").expect("valid phone regex"));

static NIK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{16}$").expect("valid NIK regex"));

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L} .'\-]+$").expect("valid name regex"));

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-/]{2,20}$").expect("valid code regex"));

static SERIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,7}(\.\d+)?$").expect("valid serial regex"));

/// Longest accepted name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Validate a person name (letters, spaces, `.`, `'`, `-`).
pub fn name(value: &str) -> Result<String, String> {
    if value.chars().count() > MAX_NAME_LEN {
        return Err(format!("must be at most {MAX_NAME_LEN} characters"));
    }
    if !NAME_RE.is_match(value) {
        return Err("may only contain letters, spaces, '.', ''' and '-'".to_string());
    }
    Ok(collapse_spaces(value))
}

/// Validate and lowercase an email address.
pub fn email(value: &str) -> Result<String, String> {
    if EMAIL_RE.is_match(value) {
        Ok(value.to_lowercase())
    } else {
        Err(format!("'{value}' is not a valid email address"))
    }
}

/// Validate an Indonesian mobile number and normalize it to the `08…` form.
///
/// Spreadsheets often drop the leading zero, so a bare `8…` is accepted.
pub fn phone(value: &str) -> Result<String, String> {
    let mut digits: String = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    if digits.starts_with('8') {
        digits.insert(0, '0');
    }

    if !PHONE_RE.is_match(&digits) {
        return Err(format!("'{value}' is not a valid mobile number"));
    }

    let local = digits
        .strip_prefix("+62")
        .or_else(|| digits.strip_prefix("62"))
        .map(|rest| format!("0{rest}"))
        .unwrap_or(digits);
    Ok(local)
}

/// Validate a 16-digit national identity number.
pub fn nik(value: &str) -> Result<String, String> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if NIK_RE.is_match(&compact) {
        Ok(compact)
    } else {
        Err("must be exactly 16 digits".to_string())
    }
}

/// Validate an employee code.
pub fn employee_code(value: &str) -> Result<String, String> {
    if CODE_RE.is_match(value) {
        Ok(value.to_uppercase())
    } else {
        Err("must be 2-20 letters, digits, '-', '_' or '/'".to_string())
    }
}

/// Parse gender in English or Indonesian.
pub fn gender(value: &str) -> Result<Gender, String> {
    match value.trim().to_lowercase().as_str() {
        "m" | "male" | "l" | "laki-laki" | "laki laki" | "pria" => Ok(Gender::Male),
        "f" | "female" | "p" | "perempuan" | "wanita" => Ok(Gender::Female),
        _ => Err(format!("'{value}' is not a recognised gender (use Male or Female)")),
    }
}

/// Parse a contract type in English or Indonesian.
pub fn contract_type(value: &str) -> Result<ContractType, String> {
    match value.trim().to_lowercase().as_str() {
        "permanent" | "tetap" | "pkwtt" => Ok(ContractType::Permanent),
        "contract" | "kontrak" | "pkwt" => Ok(ContractType::Contract),
        "intern" | "internship" | "magang" => Ok(ContractType::Intern),
        _ => Err(format!(
            "'{value}' is not a recognised contract type (use Permanent, Contract or Intern)"
        )),
    }
}

/// Validate a bank account number (6-20 digits, separators ignored).
pub fn bank_account(value: &str) -> Result<String, String> {
    let digits: String = value.chars().filter(|c| !matches!(c, ' ' | '-' | '.')).collect();
    if (6..=20).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(digits)
    } else {
        Err("must be 6-20 digits".to_string())
    }
}

/// Convert an Excel serial day number (1900 date system) to a date.
///
/// Serial 60 is the non-existent 1900-02-29 and is rejected.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as i64;
    let base = match days {
        1..=59 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        60 => return None,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    base.checked_add_signed(Duration::days(days))
}

/// Normalize the many date spellings found in HR spreadsheets.
///
/// Accepts `YYYY-MM-DD` and other year-first forms, day-first `DD/MM/YYYY`
/// forms, `YYYYMMDD`, month names (`5 Jan 2026`, `5-January-2026`) and
/// Excel serial numbers.
pub fn normalize_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    // "2026-01-05 00:00:00" from spreadsheets that export timestamps.
    let date_part = value.split([' ', 'T']).next().unwrap_or(value);
    if date_part.len() == 10
        && let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
    {
        return Some(date);
    }

    if let Some(date) = parse_flexible_date(value) {
        return Some(date);
    }

    if value.len() == 8
        && value.chars().all(|c| c.is_ascii_digit())
        && let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d")
    {
        return Some(date);
    }

    for fmt in ["%d %b %Y", "%d %B %Y", "%d-%b-%Y", "%d-%B-%Y", "%b %d, %Y", "%B %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }

    if SERIAL_RE.is_match(value) {
        return value.parse::<f64>().ok().and_then(excel_serial_to_date);
    }

    None
}

/// Parse a required or optional date cell.
pub fn date(value: &str) -> Result<NaiveDate, String> {
    normalize_date(value).ok_or_else(|| format!("'{value}' is not a recognised date (use YYYY-MM-DD)"))
}

fn collapse_spaces(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cross-field date rules: birth date in the past and before joining; join
/// date at most a year ahead.
pub fn check_dates(birth: Option<NaiveDate>, join: NaiveDate, today: NaiveDate) -> Vec<(&'static str, String)> {
    let mut problems = Vec::new();

    if let Some(birth) = birth {
        if birth > today {
            problems.push(("birth_date", "cannot be in the future".to_string()));
        } else if birth >= join {
            problems.push(("birth_date", "must be before the join date".to_string()));
        }
    }

    if join > today + Duration::days(365) {
        problems.push(("join_date", "cannot be more than a year ahead".to_string()));
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_email() {
        assert_eq!(email("Siti.Rahma@Example.co.id").unwrap(), "siti.rahma@example.co.id");
        assert!(email("siti@localhost").is_err());
        assert!(email("siti example.com").is_err());
        assert!(email("@example.com").is_err());
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(phone("0812-3456-7890").unwrap(), "081234567890");
        assert_eq!(phone("+62 812 3456 7890").unwrap(), "081234567890");
        assert_eq!(phone("6281234567").unwrap(), "081234567");
        assert_eq!(phone("81234567890").unwrap(), "081234567890");
        assert!(phone("021-555-1234").is_err());
        assert!(phone("0812").is_err());
    }

    #[test]
    fn test_nik() {
        assert_eq!(nik("3201 2345 6789 0001").unwrap(), "3201234567890001");
        assert!(nik("320123456789000").is_err());
        assert!(nik("32012345678900AB").is_err());
    }

    #[test]
    fn test_name() {
        assert_eq!(name("Ni  Made   Ayu").unwrap(), "Ni Made Ayu");
        assert!(name("O'Neil-Smith Jr.").is_ok());
        assert!(name("R2D2").is_err());
        assert!(name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_gender_and_contract_aliases() {
        assert_eq!(gender("Laki-laki").unwrap(), Gender::Male);
        assert_eq!(gender(" P ").unwrap(), Gender::Female);
        assert!(gender("x").is_err());

        assert_eq!(contract_type("PKWT").unwrap(), ContractType::Contract);
        assert_eq!(contract_type("magang").unwrap(), ContractType::Intern);
        assert!(contract_type("freelance").is_err());
    }

    #[test]
    fn test_bank_account() {
        assert_eq!(bank_account("123-456 7890").unwrap(), "1234567890");
        assert!(bank_account("12345").is_err());
        assert!(bank_account("12345a").is_err());
    }

    #[test]
    fn test_excel_serials() {
        assert_eq!(excel_serial_to_date(1.0), Some(d(1900, 1, 1)));
        assert_eq!(excel_serial_to_date(59.0), Some(d(1900, 2, 28)));
        assert_eq!(excel_serial_to_date(60.0), None);
        assert_eq!(excel_serial_to_date(61.0), Some(d(1900, 3, 1)));
        assert_eq!(excel_serial_to_date(45658.0), Some(d(2025, 1, 1)));
        assert_eq!(excel_serial_to_date(45658.75), Some(d(2025, 1, 1)));
        assert_eq!(excel_serial_to_date(0.0), None);
    }

    #[test]
    fn test_normalize_date_formats() {
        let expected = Some(d(2026, 1, 5));
        for input in [
            "2026-01-05",
            "2026/1/5",
            "05/01/2026",
            "5-1-2026",
            "05.01.2026",
            "20260105",
            "5 Jan 2026",
            "5 January 2026",
            "05-Jan-2026",
            "Jan 5, 2026",
            "2026-01-05 00:00:00",
            "2026-01-05T00:00:00",
            "46027",
        ] {
            assert_eq!(normalize_date(input), expected, "input {input}");
        }
        assert_eq!(normalize_date("31/02/2026"), None);
        assert_eq!(normalize_date("yesterday"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn test_check_dates() {
        let today = d(2026, 10, 19);
        assert!(check_dates(Some(d(1990, 1, 1)), d(2020, 1, 1), today).is_empty());
        assert_eq!(check_dates(Some(d(2027, 1, 1)), d(2027, 2, 1), today)[0].0, "birth_date");
        assert_eq!(check_dates(Some(d(2021, 1, 1)), d(2020, 1, 1), today)[0].0, "birth_date");
        assert_eq!(check_dates(None, d(2027, 12, 1), today)[0].0, "join_date");
    }
}
