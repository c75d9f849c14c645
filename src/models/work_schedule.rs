//! Work schedule templates and employee assignments.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::table::{SortKey, Tabular};

use super::check_clock::Location;

/// Where the work happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    #[default]
    Office,
    Remote,
    Hybrid,
}

impl WorkType {
    pub const ALL: [WorkType; 3] = [WorkType::Office, WorkType::Remote, WorkType::Hybrid];

    pub fn label(&self) -> &'static str {
        match self {
            WorkType::Office => "Office",
            WorkType::Remote => "Remote",
            WorkType::Hybrid => "Hybrid",
        }
    }

    /// Office and hybrid days need a check-in location.
    pub fn requires_location(&self) -> bool {
        matches!(self, WorkType::Office | WorkType::Hybrid)
    }
}

/// Half-open time range `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes().max(0)
    }

    /// Minutes shared by this window and `[from, to)`.
    pub fn overlap_minutes(&self, from: NaiveTime, to: NaiveTime) -> i64 {
        let start = self.start.max(from);
        let end = self.end.min(to);
        if end > start { (end - start).num_minutes() } else { 0 }
    }
}

/// Time windows for one weekday of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub weekday: Weekday,
    pub check_in: TimeWindow,
    #[serde(default)]
    pub break_window: Option<TimeWindow>,
    pub check_out: TimeWindow,
    #[serde(default)]
    pub location: Option<Location>,
}

/// Named schedule template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSchedule {
    pub id: i64,
    pub name: String,
    pub work_type: WorkType,
    pub days: Vec<ScheduleDay>,
}

impl WorkSchedule {
    /// Day definition for a weekday, if it is a working day.
    pub fn day(&self, weekday: Weekday) -> Option<&ScheduleDay> {
        self.days.iter().find(|d| d.weekday == weekday)
    }

    /// Short weekday list such as "Mon, Tue, Wed".
    pub fn working_days_label(&self) -> String {
        let mut days: Vec<Weekday> = self.days.iter().map(|d| d.weekday).collect();
        days.sort_by_key(|d| d.num_days_from_monday());
        days.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
    }
}

impl Tabular for WorkSchedule {
    fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }

    fn filter_value(&self, key: &str) -> Option<String> {
        match key {
            "work_type" => Some(self.work_type.label().to_lowercase()),
            _ => None,
        }
    }

    fn sort_key(&self, column: &str) -> SortKey {
        match column {
            "name" => SortKey::text(&self.name),
            "days" => (self.days.len() as i64).into(),
            _ => SortKey::Missing,
        }
    }
}

/// DTO for creating or replacing a schedule template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreateWorkSchedule {
    pub name: String,
    pub work_type: WorkType,
    pub days: Vec<ScheduleDay>,
}

impl From<&WorkSchedule> for CreateWorkSchedule {
    fn from(schedule: &WorkSchedule) -> Self {
        Self {
            name: schedule.name.clone(),
            work_type: schedule.work_type,
            days: schedule.days.clone(),
        }
    }
}

/// Schedule linked to an employee over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    pub id: i64,
    pub employee_id: i64,
    pub schedule_id: i64,
    pub effective_from: NaiveDate,
    /// Open-ended when `None`.
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
}

impl ScheduleAssignment {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_until.is_none_or(|until| until >= date)
    }
}

/// DTO for assigning a schedule to employees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignSchedule {
    pub schedule_id: i64,
    pub employee_ids: Vec<i64>,
    pub effective_from: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_window_overlap() {
        let lunch = TimeWindow::new(t(12, 0), t(13, 0));
        assert_eq!(lunch.overlap_minutes(t(8, 0), t(17, 0)), 60);
        assert_eq!(lunch.overlap_minutes(t(12, 30), t(17, 0)), 30);
        assert_eq!(lunch.overlap_minutes(t(8, 0), t(11, 0)), 0);
        assert!(lunch.contains(t(12, 0)));
        assert!(!lunch.contains(t(13, 0)));
    }

    #[test]
    fn test_assignment_covers() {
        let assignment = ScheduleAssignment {
            id: 1,
            employee_id: 1,
            schedule_id: 1,
            effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            effective_until: Some(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
        };
        assert!(assignment.covers(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()));
        assert!(!assignment.covers(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()));
        assert!(!assignment.covers(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
    }

    #[test]
    fn test_weekday_serde() {
        let day: ScheduleDay = serde_json::from_str(
            r#"{
                "weekday": "Mon",
                "check_in": { "start": "07:30", "end": "08:15" },
                "check_out": { "start": "17:00", "end": "19:00" }
            }"#,
        )
        .unwrap();
        assert_eq!(day.weekday, Weekday::Mon);
        assert!(day.break_window.is_none());
    }
}
