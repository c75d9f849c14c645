//! CSV reader for import files.

use std::io::Read;
use std::path::Path;

use ::csv::{ReaderBuilder, Trim};

use super::RawSheet;
use crate::error::{AppError, Result};

const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Pick the delimiter occurring most often in the header line, ignoring
/// quoted text. Defaults to a comma.
pub fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    let mut counts = [0usize; 3];
    let mut in_quotes = false;
    for byte in header.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = CANDIDATE_DELIMITERS.iter().position(|d| *d == byte) {
            counts[idx] += 1;
        }
    }

    let (best, count) = counts
        .iter()
        .enumerate()
        .max_by_key(|(idx, count)| (**count, std::cmp::Reverse(*idx)))
        .map(|(idx, count)| (idx, *count))
        .unwrap_or((0, 0));

    if count == 0 { b',' } else { CANDIDATE_DELIMITERS[best] }
}

/// Parse CSV text into a sheet. The first record is the header.
pub fn parse_content(content: &str) -> Result<RawSheet> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if content.trim().is_empty() {
        return Err(AppError::import("The file is empty"));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(content))
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let mut records = records.into_iter();
    let headers = records.next().unwrap_or_default();
    Ok(RawSheet {
        headers,
        rows: records.collect(),
    })
}

/// Read CSV from any reader. Invalid UTF-8 is replaced rather than rejected
/// since exports from older spreadsheet tools are often Latin-1.
pub fn read_csv<R: Read>(mut reader: R) -> Result<RawSheet> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    parse_content(&String::from_utf8_lossy(&buffer))
}

pub fn read_csv_file(path: &Path) -> Result<RawSheet> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("\"last, first\";email"), b';');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn test_parse_semicolon_with_bom() {
        let content = "\u{feff}first_name;email\n Siti ; siti@example.com \n\nBudi;budi@example.com;extra\n";
        let sheet = parse_content(content).unwrap();

        assert_eq!(sheet.headers, vec!["first_name", "email"]);
        assert_eq!(sheet.rows[0], vec!["Siti", "siti@example.com"]);
        assert_eq!(sheet.rows.last().unwrap().len(), 3);
    }

    #[test]
    fn test_quoted_fields() {
        let content = "first_name,position\n\"Ayu\",\"Manager, Finance\"\n";
        let sheet = parse_content(content).unwrap();
        assert_eq!(sheet.rows[0][1], "Manager, Finance");
    }

    #[test]
    fn test_empty_file_is_error() {
        assert!(parse_content("").is_err());
        assert!(parse_content("\u{feff}\n  \n").is_err());
    }

    #[test]
    fn test_read_csv_replaces_invalid_utf8() {
        let bytes: &[u8] = b"first_name\nJos\xe9\n";
        let sheet = read_csv(bytes).unwrap();
        assert!(sheet.rows[0][0].starts_with("Jos"));
    }
}
