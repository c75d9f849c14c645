//! Leave requests awaiting or past review.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::check_clock::ApprovalStatus;
use crate::table::{SortKey, Tabular};

/// Kind of leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Sick,
    Maternity,
    Unpaid,
    Other,
}

impl LeaveType {
    pub fn label(&self) -> &'static str {
        match self {
            LeaveType::Annual => "Annual",
            LeaveType::Sick => "Sick",
            LeaveType::Maternity => "Maternity",
            LeaveType::Unpaid => "Unpaid",
            LeaveType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub status: ApprovalStatus,
    #[serde(default)]
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Calendar days requested, both ends inclusive.
    pub fn days(&self) -> i64 {
        ((self.end_date - self.start_date).num_days() + 1).max(0)
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Whether the leave covers a date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

impl Tabular for LeaveRequest {
    fn matches_search(&self, needle: &str) -> bool {
        self.employee_name.to_lowercase().contains(needle)
            || self.reason.as_deref().is_some_and(|r| r.to_lowercase().contains(needle))
    }

    fn filter_value(&self, key: &str) -> Option<String> {
        match key {
            "status" => Some(self.status.key().to_string()),
            "leave_type" => Some(self.leave_type.label().to_lowercase()),
            _ => None,
        }
    }

    fn sort_key(&self, column: &str) -> SortKey {
        match column {
            "employee_name" => SortKey::text(&self.employee_name),
            "start_date" => self.start_date.into(),
            "days" => self.days().into(),
            "created_at" => self.created_at.date_naive().into(),
            _ => SortKey::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_inclusive() {
        let request: LeaveRequest = serde_json::from_str(
            r#"{
                "id": 4,
                "employee_id": 9,
                "employee_name": "Dewi",
                "leave_type": "annual",
                "start_date": "2026-10-20",
                "end_date": "2026-10-22",
                "created_at": "2026-10-01T02:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(request.days(), 3);
        assert!(request.is_pending());
        assert!(request.covers(NaiveDate::from_ymd_opt(2026, 10, 22).unwrap()));
    }
}
