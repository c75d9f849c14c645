//! Work-schedule flattening onto calendar days, assignment planning and
//! check-clock evaluation against a schedule day.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::error::{AppError, Result};
use crate::models::{CreateWorkSchedule, ScheduleAssignment, ScheduleDay, WorkSchedule, WorkType};

/// Longest range `flatten` accepts, in days.
pub const MAX_FLATTEN_DAYS: i64 = 366;

/// One calendar date of a flattened schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    /// `None` on off days.
    pub detail: Option<&'a ScheduleDay>,
    pub work_type: WorkType,
}

impl CalendarDay<'_> {
    pub fn is_working_day(&self) -> bool {
        self.detail.is_some()
    }
}

/// Check a schedule template before it is sent to the backend.
pub fn validate_schedule(schedule: &CreateWorkSchedule) -> Result<()> {
    if schedule.name.trim().is_empty() {
        return Err(AppError::validation("Schedule name is required"));
    }
    if schedule.days.is_empty() {
        return Err(AppError::validation("Select at least one working day"));
    }

    let mut seen = HashSet::new();
    for day in &schedule.days {
        let name = day.weekday.to_string();
        if !seen.insert(day.weekday) {
            return Err(AppError::validation(format!("{name} is defined twice")));
        }
        if !day.check_in.is_valid() {
            return Err(AppError::validation(format!("{name}: check-in window must end after it starts")));
        }
        if !day.check_out.is_valid() {
            return Err(AppError::validation(format!("{name}: check-out window must end after it starts")));
        }
        if day.check_in.start >= day.check_out.end {
            return Err(AppError::validation(format!("{name}: check-in must start before check-out ends")));
        }
        if let Some(brk) = &day.break_window {
            if !brk.is_valid() {
                return Err(AppError::validation(format!("{name}: break must end after it starts")));
            }
            if brk.start < day.check_in.start || brk.end > day.check_out.end {
                return Err(AppError::validation(format!("{name}: break must fall inside the working hours")));
            }
        }
        if schedule.work_type.requires_location() && day.location.is_none() {
            return Err(AppError::validation(format!("{name}: office and hybrid schedules need a check-in location")));
        }
    }
    Ok(())
}

/// Map a schedule template onto every date of `[from, to]`.
pub fn flatten(schedule: &WorkSchedule, from: NaiveDate, to: NaiveDate) -> Result<Vec<CalendarDay<'_>>> {
    if to < from {
        return Err(AppError::validation(format!("Range end {to} is before start {from}")));
    }
    let span = (to - from).num_days() + 1;
    if span > MAX_FLATTEN_DAYS {
        return Err(AppError::validation(format!(
            "Range of {span} days exceeds the {MAX_FLATTEN_DAYS}-day limit"
        )));
    }

    Ok(from
        .iter_days()
        .take(span as usize)
        .map(|date| CalendarDay {
            date,
            detail: schedule.day(date.weekday()),
            work_type: schedule.work_type,
        })
        .collect())
}

/// Monday-first weeks covering a month; dates outside the month are `None`.
pub fn month_grid(year: i32, month: u32) -> Result<Vec<[Option<NaiveDate>; 7]>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::validation(format!("Invalid month {year}-{month}")))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::validation(format!("Invalid month {year}-{month}")))?;

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = first.weekday().num_days_from_monday() as usize;

    for date in first.iter_days().take_while(|d| *d < next_month) {
        week[slot] = Some(date);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }
    Ok(weeks)
}

/// Assignment in force for an employee on a date.
///
/// When several cover the date, the one that started last wins.
pub fn active_assignment(
    assignments: &[ScheduleAssignment],
    employee_id: i64,
    date: NaiveDate,
) -> Option<&ScheduleAssignment> {
    assignments
        .iter()
        .filter(|a| a.employee_id == employee_id && a.covers(date))
        .max_by_key(|a| a.effective_from)
}

/// Result of planning a new assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentPlan {
    /// Existing open assignment to close, with its new end date.
    pub close: Option<(i64, NaiveDate)>,
    pub employee_id: i64,
    pub schedule_id: i64,
    pub effective_from: NaiveDate,
}

/// Plan assigning `schedule_id` to an employee from `effective_from`.
///
/// The employee's open assignment is closed the day before; a start on or
/// before that assignment's own start is rejected.
pub fn plan_assignment(
    existing: &[ScheduleAssignment],
    employee_id: i64,
    schedule_id: i64,
    effective_from: NaiveDate,
) -> Result<AssignmentPlan> {
    let open = existing
        .iter()
        .filter(|a| a.employee_id == employee_id && a.effective_until.is_none())
        .max_by_key(|a| a.effective_from);

    let close = match open {
        Some(current) if effective_from <= current.effective_from => {
            return Err(AppError::validation(format!(
                "Employee already has a schedule starting {}; pick a later date",
                current.effective_from
            )));
        }
        Some(current) if current.schedule_id == schedule_id => {
            return Err(AppError::validation("Employee is already on this schedule"));
        }
        Some(current) => Some((current.id, effective_from - Duration::days(1))),
        None => None,
    };

    Ok(AssignmentPlan {
        close,
        employee_id,
        schedule_id,
        effective_from,
    })
}

/// Attendance outcome for one scheduled day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    OnTime,
    Late,
    Absent,
}

impl DayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DayStatus::OnTime => "On Time",
            DayStatus::Late => "Late",
            DayStatus::Absent => "Absent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayEvaluation {
    pub status: DayStatus,
    /// Minutes after the check-in window closed.
    pub late_minutes: i64,
    /// Minutes before the check-out window opened.
    pub early_leave_minutes: i64,
    /// Worked minutes, excluding the break.
    pub work_minutes: i64,
}

/// Evaluate clock times against a schedule day.
pub fn evaluate(day: &ScheduleDay, clock_in: Option<NaiveTime>, clock_out: Option<NaiveTime>) -> DayEvaluation {
    let Some(clock_in) = clock_in else {
        return DayEvaluation {
            status: DayStatus::Absent,
            late_minutes: 0,
            early_leave_minutes: 0,
            work_minutes: 0,
        };
    };

    let late_minutes = if clock_in > day.check_in.end {
        (clock_in - day.check_in.end).num_minutes()
    } else {
        0
    };

    let (early_leave_minutes, work_minutes) = match clock_out {
        Some(out) if out > clock_in => {
            let early = if out < day.check_out.start {
                (day.check_out.start - out).num_minutes()
            } else {
                0
            };
            let gross = (out - clock_in).num_minutes();
            let on_break = day
                .break_window
                .map(|b| b.overlap_minutes(clock_in, out))
                .unwrap_or(0);
            (early, gross - on_break)
        }
        _ => (0, 0),
    };

    DayEvaluation {
        status: if late_minutes > 0 { DayStatus::Late } else { DayStatus::OnTime },
        late_minutes,
        early_leave_minutes,
        work_minutes,
    }
}

/// Evaluate clock times against the schedule assigned to an employee on `date`.
///
/// `None` when no assignment covers the date or the date is a day off.
pub fn evaluate_for(
    schedules: &[WorkSchedule],
    assignments: &[ScheduleAssignment],
    employee_id: i64,
    date: NaiveDate,
    clock_in: Option<NaiveTime>,
    clock_out: Option<NaiveTime>,
) -> Option<DayEvaluation> {
    let assignment = active_assignment(assignments, employee_id, date)?;
    let schedule = schedules.iter().find(|s| s.id == assignment.schedule_id)?;
    let day = schedule.day(date.weekday())?;
    Some(evaluate(day, clock_in, clock_out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, TimeWindow};
    use chrono::Weekday;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn office() -> Location {
        Location {
            latitude: -6.2,
            longitude: 106.8,
            address: Some("HQ".to_string()),
        }
    }

    fn day(weekday: Weekday) -> ScheduleDay {
        ScheduleDay {
            weekday,
            check_in: TimeWindow::new(t(7, 30), t(8, 15)),
            break_window: Some(TimeWindow::new(t(12, 0), t(13, 0))),
            check_out: TimeWindow::new(t(17, 0), t(19, 0)),
            location: Some(office()),
        }
    }

    fn weekday_schedule() -> WorkSchedule {
        WorkSchedule {
            id: 1,
            name: "Office Mon-Fri".to_string(),
            work_type: WorkType::Office,
            days: [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
                .into_iter()
                .map(day)
                .collect(),
        }
    }

    #[test]
    fn test_flatten_marks_weekends_off() {
        let schedule = weekday_schedule();
        // 2026-10-17 is a Saturday.
        let days = flatten(&schedule, d(2026, 10, 17), d(2026, 10, 20)).unwrap();
        assert_eq!(days.len(), 4);
        let working: Vec<bool> = days.iter().map(|c| c.is_working_day()).collect();
        assert_eq!(working, vec![false, false, true, true]);
        assert_eq!(days[2].detail.unwrap().weekday, Weekday::Mon);
    }

    #[test]
    fn test_flatten_single_day_and_errors() {
        let schedule = weekday_schedule();
        assert_eq!(flatten(&schedule, d(2026, 10, 19), d(2026, 10, 19)).unwrap().len(), 1);
        assert!(flatten(&schedule, d(2026, 10, 19), d(2026, 10, 18)).is_err());
        assert!(flatten(&schedule, d(2026, 1, 1), d(2027, 1, 1)).is_ok());
        assert!(flatten(&schedule, d(2026, 1, 1), d(2027, 1, 2)).is_err());
    }

    #[test]
    fn test_month_grid() {
        // October 2026 starts on a Thursday and has 31 days.
        let weeks = month_grid(2026, 10).unwrap();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0][..3], [None, None, None]);
        assert_eq!(weeks[0][3], Some(d(2026, 10, 1)));
        assert_eq!(weeks[4][5], Some(d(2026, 10, 31)));
        assert_eq!(weeks[4][6], None);

        // February 2027 starts on a Monday: exactly four full weeks.
        assert_eq!(month_grid(2027, 2).unwrap().len(), 4);
        assert!(month_grid(2026, 13).is_err());
    }

    #[test]
    fn test_validate_schedule() {
        let mut schedule = CreateWorkSchedule::from(&weekday_schedule());
        assert!(validate_schedule(&schedule).is_ok());

        schedule.days.push(day(Weekday::Mon));
        assert!(validate_schedule(&schedule).is_err());
        schedule.days.pop();

        schedule.days[0].break_window = Some(TimeWindow::new(t(6, 0), t(7, 0)));
        assert!(validate_schedule(&schedule).is_err());
        schedule.days[0].break_window = None;

        schedule.days[1].location = None;
        assert!(validate_schedule(&schedule).is_err());
        schedule.work_type = WorkType::Hybrid;
        assert!(validate_schedule(&schedule).is_err());
        schedule.work_type = WorkType::Remote;
        assert!(validate_schedule(&schedule).is_ok());

        schedule.name = " ".to_string();
        assert!(validate_schedule(&schedule).is_err());
    }

    fn assignment(id: i64, schedule_id: i64, from: NaiveDate, until: Option<NaiveDate>) -> ScheduleAssignment {
        ScheduleAssignment {
            id,
            employee_id: 5,
            schedule_id,
            effective_from: from,
            effective_until: until,
        }
    }

    #[test]
    fn test_active_assignment_prefers_latest_start() {
        let list = vec![
            assignment(1, 10, d(2026, 1, 1), None),
            assignment(2, 20, d(2026, 6, 1), Some(d(2026, 6, 30))),
        ];
        assert_eq!(active_assignment(&list, 5, d(2026, 6, 15)).unwrap().id, 2);
        assert_eq!(active_assignment(&list, 5, d(2026, 7, 1)).unwrap().id, 1);
        assert!(active_assignment(&list, 5, d(2025, 12, 31)).is_none());
        assert!(active_assignment(&list, 6, d(2026, 6, 15)).is_none());
    }

    #[test]
    fn test_plan_assignment_closes_open_one() {
        let list = vec![assignment(1, 10, d(2026, 1, 1), None)];

        let plan = plan_assignment(&list, 5, 20, d(2026, 11, 1)).unwrap();
        assert_eq!(plan.close, Some((1, d(2026, 10, 31))));

        assert!(plan_assignment(&list, 5, 20, d(2026, 1, 1)).is_err());
        assert!(plan_assignment(&list, 5, 10, d(2026, 11, 1)).is_err());

        let fresh = plan_assignment(&list, 9, 20, d(2026, 11, 1)).unwrap();
        assert!(fresh.close.is_none());
    }

    #[test]
    fn test_evaluate_on_time_with_break() {
        let eval = evaluate(&day(Weekday::Mon), Some(t(8, 0)), Some(t(17, 30)));
        assert_eq!(eval.status, DayStatus::OnTime);
        assert_eq!(eval.late_minutes, 0);
        assert_eq!(eval.early_leave_minutes, 0);
        assert_eq!(eval.work_minutes, 510);
    }

    #[test]
    fn test_evaluate_late_and_early_leave() {
        let eval = evaluate(&day(Weekday::Mon), Some(t(8, 40)), Some(t(16, 30)));
        assert_eq!(eval.status, DayStatus::Late);
        assert_eq!(eval.late_minutes, 25);
        assert_eq!(eval.early_leave_minutes, 30);
        assert_eq!(eval.work_minutes, 410);
    }

    #[test]
    fn test_evaluate_absent_and_missing_clock_out() {
        assert_eq!(evaluate(&day(Weekday::Mon), None, None).status, DayStatus::Absent);

        let eval = evaluate(&day(Weekday::Mon), Some(t(8, 15)), None);
        assert_eq!(eval.status, DayStatus::OnTime);
        assert_eq!(eval.work_minutes, 0);
    }

    #[test]
    fn test_evaluate_for_uses_assigned_schedule() {
        let schedules = vec![weekday_schedule()];
        let list = vec![assignment(1, 1, d(2026, 10, 1), None)];

        // 2026-10-19 is a Monday.
        let eval = evaluate_for(&schedules, &list, 5, d(2026, 10, 19), Some(t(8, 20)), Some(t(17, 0))).unwrap();
        assert_eq!(eval.status, DayStatus::Late);
        assert_eq!(eval.late_minutes, 5);

        assert!(evaluate_for(&schedules, &list, 5, d(2026, 10, 18), Some(t(8, 0)), None).is_none());
        assert!(evaluate_for(&schedules, &list, 6, d(2026, 10, 19), Some(t(8, 0)), None).is_none());
        assert!(evaluate_for(&schedules, &list, 5, d(2026, 9, 30), Some(t(8, 0)), None).is_none());
    }
}
