//! Check-clock (attendance) records.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::table::{SortKey, Tabular};

use super::work_schedule::WorkType;

/// Kind of check-clock entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckClockType {
    /// Regular clock-in / clock-out.
    #[default]
    Attendance,
    AnnualLeave,
    SickLeave,
    Absent,
}

impl CheckClockType {
    pub const ALL: [CheckClockType; 4] = [
        CheckClockType::Attendance,
        CheckClockType::AnnualLeave,
        CheckClockType::SickLeave,
        CheckClockType::Absent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CheckClockType::Attendance => "Attendance",
            CheckClockType::AnnualLeave => "Annual Leave",
            CheckClockType::SickLeave => "Sick Leave",
            CheckClockType::Absent => "Absent",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            CheckClockType::Attendance => "attendance",
            CheckClockType::AnnualLeave => "annual_leave",
            CheckClockType::SickLeave => "sick_leave",
            CheckClockType::Absent => "absent",
        }
    }

    /// Entries that carry clock times.
    pub fn has_times(&self) -> bool {
        matches!(self, CheckClockType::Attendance)
    }
}

/// Review state shared by check-clock entries and leave requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 3] = [ApprovalStatus::Pending, ApprovalStatus::Approved, ApprovalStatus::Rejected];

    pub fn label(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "Pending",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

/// Geographic position attached to a clock event or office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
}

impl Location {
    /// Address if known, otherwise rounded coordinates.
    pub fn display(&self) -> String {
        match self.address.as_deref() {
            Some(addr) if !addr.trim().is_empty() => addr.to_string(),
            _ => format!("{:.5}, {:.5}", self.latitude, self.longitude),
        }
    }
}

/// Check-clock entry as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckClock {
    pub id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    #[serde(default)]
    pub position: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub check_type: CheckClockType,
    #[serde(default)]
    pub clock_in: Option<NaiveTime>,
    #[serde(default)]
    pub clock_out: Option<NaiveTime>,
    #[serde(default)]
    pub work_type: Option<WorkType>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub approval: ApprovalStatus,
    #[serde(default)]
    pub note: Option<String>,
}

impl CheckClock {
    /// Minutes between clock-in and clock-out, if both are present and ordered.
    pub fn work_minutes(&self) -> Option<i64> {
        match (self.clock_in, self.clock_out) {
            (Some(start), Some(end)) if end > start => Some((end - start).num_minutes()),
            _ => None,
        }
    }
}

impl Tabular for CheckClock {
    fn matches_search(&self, needle: &str) -> bool {
        self.employee_name.to_lowercase().contains(needle)
            || self.position.as_deref().is_some_and(|p| p.to_lowercase().contains(needle))
    }

    fn filter_value(&self, key: &str) -> Option<String> {
        match key {
            "check_type" => Some(self.check_type.key().to_string()),
            "approval" => Some(self.approval.key().to_string()),
            "date" => Some(self.date.to_string()),
            _ => None,
        }
    }

    fn sort_key(&self, column: &str) -> SortKey {
        match column {
            "employee_name" => SortKey::text(&self.employee_name),
            "date" => self.date.into(),
            "clock_in" => self.clock_in.into(),
            "clock_out" => self.clock_out.into(),
            "work_minutes" => self.work_minutes().into(),
            _ => SortKey::Missing,
        }
    }
}

/// DTO for a manual check-clock entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCheckClock {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub check_type: CheckClockType,
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub location: Option<Location>,
    pub note: Option<String>,
}

impl CreateCheckClock {
    /// Check the entry is internally consistent before sending it.
    pub fn validate(&self) -> crate::Result<()> {
        if self.check_type.has_times() {
            let Some(clock_in) = self.clock_in else {
                return Err(crate::AppError::validation("Clock-in time is required"));
            };
            if let Some(clock_out) = self.clock_out
                && clock_out <= clock_in
            {
                return Err(crate::AppError::validation("Clock-out must be after clock-in"));
            }
        } else if self.clock_in.is_some() || self.clock_out.is_some() {
            return Err(crate::AppError::validation(format!(
                "{} entries cannot carry clock times",
                self.check_type.label()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_deserialize_times_without_seconds() {
        let record: CheckClock = serde_json::from_str(
            r#"{
                "id": 1,
                "employee_id": 3,
                "employee_name": "Budi",
                "date": "2026-10-19",
                "clock_in": "08:05",
                "clock_out": "17:10:00",
                "approval": "approved"
            }"#,
        )
        .unwrap();

        assert_eq!(record.clock_in, Some(t(8, 5)));
        assert_eq!(record.work_minutes(), Some(545));
        assert_eq!(record.check_type, CheckClockType::Attendance);
    }

    #[test]
    fn test_work_minutes_requires_both_ends() {
        let mut record = CheckClock {
            id: 1,
            employee_id: 1,
            employee_name: "A".to_string(),
            position: None,
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            check_type: CheckClockType::Attendance,
            clock_in: Some(t(8, 0)),
            clock_out: None,
            work_type: None,
            location: None,
            approval: ApprovalStatus::Pending,
            note: None,
        };
        assert_eq!(record.work_minutes(), None);

        record.clock_out = Some(t(7, 0));
        assert_eq!(record.work_minutes(), None);
    }

    #[test]
    fn test_create_validation() {
        let mut entry = CreateCheckClock {
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            check_type: CheckClockType::Attendance,
            clock_in: None,
            clock_out: None,
            location: None,
            note: None,
        };
        assert!(entry.validate().is_err());

        entry.clock_in = Some(t(9, 0));
        entry.clock_out = Some(t(8, 0));
        assert!(entry.validate().is_err());

        entry.clock_out = Some(t(17, 0));
        assert!(entry.validate().is_ok());

        entry.check_type = CheckClockType::SickLeave;
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_location_display() {
        let loc = Location {
            latitude: -6.2,
            longitude: 106.816666,
            address: None,
        };
        assert_eq!(loc.display(), "-6.20000, 106.81667");
    }
}
