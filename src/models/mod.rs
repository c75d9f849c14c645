//! Data models for employees, check-clock, schedules, leave and billing.

pub mod check_clock;
pub mod dashboard;
pub mod employee;
pub mod leave;
pub mod page;
pub mod subscription;
pub mod work_schedule;

pub use check_clock::{ApprovalStatus, CheckClock, CheckClockType, CreateCheckClock, Location};
pub use dashboard::DashboardSummary;
pub use employee::{ContractType, CreateEmployee, Employee, EmployeeStatus, Gender, UpdateEmployee};
pub use leave::{LeaveRequest, LeaveType};
pub use page::{Page, PageMeta};
pub use subscription::{
    BillingCycle, CheckoutRequest, CheckoutSession, Package, SeatTier, Subscription, SubscriptionStatus,
};
pub use work_schedule::{
    AssignSchedule, CreateWorkSchedule, ScheduleAssignment, ScheduleDay, TimeWindow, WorkSchedule, WorkType,
};
