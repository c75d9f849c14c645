//! Dashboard summary counters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSummary {
    pub total_employees: u32,
    pub active_employees: u32,
    /// Hires in the current month.
    pub new_hires: u32,
    pub present_today: u32,
    pub late_today: u32,
    pub on_leave_today: u32,
    pub pending_leave_requests: u32,
}

impl DashboardSummary {
    /// Active employees with no check-clock or leave entry today.
    pub fn absent_today(&self) -> u32 {
        self.active_employees
            .saturating_sub(self.present_today)
            .saturating_sub(self.on_leave_today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_today_saturates() {
        let summary = DashboardSummary {
            active_employees: 10,
            present_today: 8,
            on_leave_today: 4,
            ..Default::default()
        };
        assert_eq!(summary.absent_today(), 0);
    }

    #[test]
    fn test_missing_fields_default() {
        let summary: DashboardSummary = serde_json::from_str(r#"{ "total_employees": 12 }"#).unwrap();
        assert_eq!(summary.total_employees, 12);
        assert_eq!(summary.late_today, 0);
    }
}
