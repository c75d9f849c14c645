//! Main application UI.

use std::collections::BTreeSet;
use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, NaiveDate, Weekday};
use eframe::egui::{self, Align, Layout, RichText};
use tokio::sync::mpsc;

use crate::api::employees::BulkResult;
use crate::api::{self, ApiClient};
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::export;
use crate::format::format_time;
use crate::import::{self, ExistingKeys, ImportReport};
use crate::models::{
    ApprovalStatus, AssignSchedule, BillingCycle, CheckClock, CheckClockType, CheckoutRequest, CheckoutSession,
    ContractType, CreateCheckClock, CreateEmployee, CreateWorkSchedule, DashboardSummary, Employee, EmployeeStatus,
    Gender, LeaveRequest, Package, Page, ScheduleAssignment, Subscription, UpdateEmployee, WorkSchedule, WorkType,
};
use crate::table::{PageInfo, TableQuery};

use super::components::{colors, styled_button};
use super::{
    check_clock_panel, dashboard, employee_panel, leave_panel, schedule_panel, settings_panel, subscription_panel,
};

/// Current panel being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Dashboard,
    Employees,
    CheckClock,
    Schedules,
    Leave,
    Subscription,
    Settings,
}

impl Panel {
    pub const ALL: [Panel; 7] = [
        Panel::Dashboard,
        Panel::Employees,
        Panel::CheckClock,
        Panel::Schedules,
        Panel::Leave,
        Panel::Subscription,
        Panel::Settings,
    ];

    /// Get the display name for the panel.
    pub fn name(&self) -> &'static str {
        match self {
            Panel::Dashboard => "Dashboard",
            Panel::Employees => "Employees",
            Panel::CheckClock => "Check Clock",
            Panel::Schedules => "Work Schedules",
            Panel::Leave => "Leave Requests",
            Panel::Subscription => "Subscription",
            Panel::Settings => "Settings",
        }
    }
}

/// Backend reachability shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Checking,
    Online,
    Offline(String),
}

/// Messages from async tasks to UI.
pub enum UiMessage {
    // Data loading
    SummaryLoaded(DashboardSummary),
    EmployeesLoaded(Page<Employee>),
    DirectoryLoaded(Vec<Employee>),
    CheckClocksLoaded(Page<CheckClock>),
    SchedulesLoaded(Vec<WorkSchedule>),
    AssignmentsLoaded(Vec<ScheduleAssignment>),
    LeaveLoaded(Page<LeaveRequest>),
    PackagesLoaded(Vec<Package>),
    SubscriptionLoaded(Option<Subscription>),
    LoadError(String),

    // CRUD operations
    EmployeeSaved(Employee),
    EmployeeDeleted(i64),
    CheckClockSaved(CheckClock),
    CheckClockReviewed(CheckClock),
    ScheduleSaved(WorkSchedule),
    ScheduleDeleted(i64),
    ScheduleAssigned(Vec<ScheduleAssignment>),
    LeaveReviewed(LeaveRequest),
    OperationFailed(String),

    // Import
    ImportChecked(ImportReport),
    ImportUploaded(BulkResult),
    ImportFailed(String),

    // Billing
    CheckoutReady(CheckoutSession),

    // Export
    ExportCompleted(String),
    ExportFailed(String),

    // Connection test
    ConnectionChecked(std::result::Result<(), String>),
}

/// Form state for employee create/edit.
#[derive(Default, Clone)]
pub struct EmployeeForm {
    pub id: Option<i64>,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub nik: String,
    pub gender: Option<Gender>,
    pub birth_place: String,
    pub birth_date_input: String,
    pub education: String,
    pub position: String,
    pub branch: String,
    pub grade: String,
    pub contract_type: ContractType,
    pub bank_name: String,
    pub bank_account_number: String,
    pub bank_account_holder: String,
    pub join_date_input: String,
    pub status: EmployeeStatus,
    pub is_open: bool,
    pub is_editing: bool,
}

impl EmployeeForm {
    /// Reset the form to default values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Empty form for a new hire joining today.
    pub fn create(today: NaiveDate) -> Self {
        Self {
            join_date_input: today.format("%Y-%m-%d").to_string(),
            is_open: true,
            ..Default::default()
        }
    }

    /// Create a form pre-filled for editing an existing employee.
    pub fn edit(emp: &Employee) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            id: Some(emp.id),
            employee_code: emp.employee_code.clone(),
            first_name: emp.first_name.clone(),
            last_name: text(&emp.last_name),
            email: emp.email.clone(),
            phone: text(&emp.phone),
            nik: emp.nik.clone(),
            gender: Some(emp.gender),
            birth_place: text(&emp.birth_place),
            birth_date_input: emp.birth_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            education: text(&emp.education),
            position: emp.position.clone(),
            branch: text(&emp.branch),
            grade: text(&emp.grade),
            contract_type: emp.contract_type,
            bank_name: text(&emp.bank_name),
            bank_account_number: text(&emp.bank_account_number),
            bank_account_holder: text(&emp.bank_account_holder),
            join_date_input: emp.join_date.format("%Y-%m-%d").to_string(),
            status: emp.status,
            is_open: true,
            is_editing: true,
        }
    }
}

/// Form state for a manual check-clock entry.
#[derive(Default, Clone)]
pub struct CheckClockForm {
    pub employee_id: Option<i64>,
    pub employee_search: String,
    pub date_input: String,
    pub check_type: CheckClockType,
    pub clock_in_input: String,
    pub clock_out_input: String,
    pub latitude_input: String,
    pub longitude_input: String,
    pub address: String,
    pub note: String,
    pub is_open: bool,
}

impl CheckClockForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn create(today: NaiveDate) -> Self {
        Self {
            date_input: today.format("%Y-%m-%d").to_string(),
            clock_in_input: "08:00".to_string(),
            clock_out_input: "17:00".to_string(),
            is_open: true,
            ..Default::default()
        }
    }
}

/// Editable times of one weekday in the schedule editor.
#[derive(Clone)]
pub struct DayForm {
    pub enabled: bool,
    pub check_in_start: String,
    pub check_in_end: String,
    pub has_break: bool,
    pub break_start: String,
    pub break_end: String,
    pub check_out_start: String,
    pub check_out_end: String,
    pub latitude_input: String,
    pub longitude_input: String,
    pub address: String,
}

impl Default for DayForm {
    fn default() -> Self {
        Self {
            enabled: false,
            check_in_start: "07:30".to_string(),
            check_in_end: "08:15".to_string(),
            has_break: true,
            break_start: "12:00".to_string(),
            break_end: "13:00".to_string(),
            check_out_start: "17:00".to_string(),
            check_out_end: "18:00".to_string(),
            latitude_input: String::new(),
            longitude_input: String::new(),
            address: String::new(),
        }
    }
}

/// Form state for schedule templates. `days` is indexed from Monday.
#[derive(Default, Clone)]
pub struct ScheduleForm {
    pub id: Option<i64>,
    pub name: String,
    pub work_type: WorkType,
    pub days: [DayForm; 7],
    pub is_open: bool,
    pub is_editing: bool,
}

impl ScheduleForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// New template with Monday to Friday enabled.
    pub fn create() -> Self {
        let mut form = Self {
            is_open: true,
            ..Default::default()
        };
        for day in form.days.iter_mut().take(5) {
            day.enabled = true;
        }
        form
    }

    pub fn edit(schedule: &WorkSchedule) -> Self {
        let mut form = Self {
            id: Some(schedule.id),
            name: schedule.name.clone(),
            work_type: schedule.work_type,
            is_open: true,
            is_editing: true,
            ..Default::default()
        };
        for day in &schedule.days {
            let slot = &mut form.days[day.weekday.num_days_from_monday() as usize];
            slot.enabled = true;
            slot.check_in_start = format_time(day.check_in.start);
            slot.check_in_end = format_time(day.check_in.end);
            slot.has_break = day.break_window.is_some();
            if let Some(brk) = day.break_window {
                slot.break_start = format_time(brk.start);
                slot.break_end = format_time(brk.end);
            }
            slot.check_out_start = format_time(day.check_out.start);
            slot.check_out_end = format_time(day.check_out.end);
            if let Some(loc) = &day.location {
                slot.latitude_input = loc.latitude.to_string();
                slot.longitude_input = loc.longitude.to_string();
                slot.address = loc.address.clone().unwrap_or_default();
            }
        }
        form
    }
}

/// Form state for assigning a schedule to employees.
#[derive(Default, Clone)]
pub struct AssignForm {
    pub schedule_id: Option<i64>,
    pub schedule_name: String,
    pub employee_ids: BTreeSet<i64>,
    pub search: String,
    pub effective_from_input: String,
    pub is_open: bool,
}

impl AssignForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Assignments start on the first of next month unless changed.
    pub fn open(schedule: &WorkSchedule, today: NaiveDate) -> Self {
        let next_month = if today.month() == 12 {
            NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
        }
        .unwrap_or(today);

        Self {
            schedule_id: Some(schedule.id),
            schedule_name: schedule.name.clone(),
            effective_from_input: next_month.format("%Y-%m-%d").to_string(),
            is_open: true,
            ..Default::default()
        }
    }
}

/// What a review dialog acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewKind {
    #[default]
    Leave,
    CheckClock,
}

/// Approve/reject dialog with an optional note.
#[derive(Default, Clone)]
pub struct ReviewForm {
    pub kind: ReviewKind,
    pub id: i64,
    pub subject: String,
    pub approve: bool,
    pub note: String,
    pub is_open: bool,
}

impl ReviewForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn open(kind: ReviewKind, id: i64, subject: impl Into<String>, approve: bool) -> Self {
        Self {
            kind,
            id,
            subject: subject.into(),
            approve,
            note: String::new(),
            is_open: true,
        }
    }

    /// Rejections must say why.
    pub fn can_submit(&self) -> bool {
        self.approve || !self.note.trim().is_empty()
    }
}

/// Bulk import dialog state.
#[derive(Default, Clone)]
pub struct ImportState {
    pub is_open: bool,
    pub path: Option<PathBuf>,
    pub report: Option<ImportReport>,
    pub checking: bool,
    pub uploading: bool,
    pub result: Option<BulkResult>,
    pub error_query: TableQuery,
}

impl ImportState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_busy(&self) -> bool {
        self.checking || self.uploading
    }
}

/// Seat calculator and checkout state.
#[derive(Clone)]
pub struct SeatForm {
    pub package_id: Option<i64>,
    pub seats_input: String,
    pub cycle: BillingCycle,
    pub checking_out: bool,
    pub session: Option<CheckoutSession>,
}

impl Default for SeatForm {
    fn default() -> Self {
        Self {
            package_id: None,
            seats_input: "1".to_string(),
            cycle: BillingCycle::Monthly,
            checking_out: false,
            session: None,
        }
    }
}

impl SeatForm {
    pub fn seats(&self) -> Option<u32> {
        self.seats_input.trim().parse().ok()
    }
}

/// Month shown in the schedule calendar.
#[derive(Clone)]
pub struct CalendarState {
    pub schedule_id: Option<i64>,
    pub year: i32,
    pub month: u32,
}

impl CalendarState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            schedule_id: None,
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn prev_month(&mut self) {
        if self.month == 1 {
            self.month = 12;
            self.year -= 1;
        } else {
            self.month -= 1;
        }
    }

    pub fn next_month(&mut self) {
        if self.month == 12 {
            self.month = 1;
            self.year += 1;
        } else {
            self.month += 1;
        }
    }
}

/// Log level for UI messages.
#[derive(Clone, Copy, Debug)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Log entry for display in the UI.
#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub level: LogLevel,
}

/// Target for delete confirmation dialog.
#[derive(Clone)]
pub enum DeleteTarget {
    Employee(i64, String),
    Schedule(i64, String),
}

/// Main application state.
pub struct App {
    // Runtime and backend
    pub rt: tokio::runtime::Runtime,
    pub api: ApiClient,

    // Message channel for async communication
    pub tx: mpsc::UnboundedSender<UiMessage>,
    pub rx: mpsc::UnboundedReceiver<UiMessage>,

    // Navigation
    pub current_panel: Panel,

    // Cached data
    pub summary: Option<DashboardSummary>,
    pub employees: Vec<Employee>,
    pub directory: Vec<Employee>,
    pub check_clocks: Vec<CheckClock>,
    pub schedules: Vec<WorkSchedule>,
    pub assignments: Vec<ScheduleAssignment>,
    pub leave_requests: Vec<LeaveRequest>,
    pub packages: Vec<Package>,
    pub subscription: Option<Subscription>,

    // Tables
    pub employee_query: TableQuery,
    pub employee_page: PageInfo,
    pub check_clock_query: TableQuery,
    pub check_clock_page: PageInfo,
    pub check_clock_date_input: String,
    pub schedule_query: TableQuery,
    pub leave_query: TableQuery,
    pub leave_page: PageInfo,
    pub leave_tab: ApprovalStatus,

    // Loading states
    pub pending_loads: usize,

    // Forms
    pub employee_form: EmployeeForm,
    pub check_clock_form: CheckClockForm,
    pub schedule_form: ScheduleForm,
    pub assign_form: AssignForm,
    pub review_form: ReviewForm,
    pub import: ImportState,
    pub seat_form: SeatForm,
    pub calendar: CalendarState,

    // Log messages
    pub log_messages: Vec<LogEntry>,

    // Configuration
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub config_modified: bool,
    pub connection: ConnectionStatus,

    // Dialogs
    pub show_delete_confirm: bool,
    pub delete_target: Option<DeleteTarget>,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

impl App {
    pub fn new(config: AppConfig, config_path: PathBuf, rt: tokio::runtime::Runtime) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let api = ApiClient::new(&config.api)?;
        let page_size = config.ui.page_size;
        let today = Local::now().date_naive();

        let mut leave_query = TableQuery::new(page_size);
        leave_query.set_filter("status", Some(ApprovalStatus::Pending.key()));

        let mut app = Self {
            rt,
            api,
            tx,
            rx,
            current_panel: Panel::default(),
            summary: None,
            employees: Vec::new(),
            directory: Vec::new(),
            check_clocks: Vec::new(),
            schedules: Vec::new(),
            assignments: Vec::new(),
            leave_requests: Vec::new(),
            packages: Vec::new(),
            subscription: None,
            employee_query: TableQuery::new(page_size),
            employee_page: PageInfo::default(),
            check_clock_query: TableQuery::new(page_size),
            check_clock_page: PageInfo::default(),
            check_clock_date_input: String::new(),
            schedule_query: TableQuery::new(page_size),
            leave_query,
            leave_page: PageInfo::default(),
            leave_tab: ApprovalStatus::Pending,
            pending_loads: 0,
            employee_form: EmployeeForm::default(),
            check_clock_form: CheckClockForm::default(),
            schedule_form: ScheduleForm::default(),
            assign_form: AssignForm::default(),
            review_form: ReviewForm::default(),
            import: ImportState::default(),
            seat_form: SeatForm::default(),
            calendar: CalendarState::new(today),
            log_messages: Vec::new(),
            config,
            config_path,
            config_modified: false,
            connection: ConnectionStatus::Unknown,
            show_delete_confirm: false,
            delete_target: None,
            error_message: None,
            success_message: None,
        };

        app.log_info(format!("Connecting to {}", app.api.base_url()));
        app.test_connection();
        app.load_summary();
        app.load_packages();

        Ok(app)
    }

    /// Log a message to the UI log.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_messages.push(LogEntry {
            timestamp: Local::now(),
            message: message.into(),
            level,
        });

        // Keep only last 100 messages
        if self.log_messages.len() > 100 {
            self.log_messages.remove(0);
        }
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn log_success(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Success, message);
    }

    pub fn log_warning(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn is_loading(&self) -> bool {
        self.pending_loads > 0
    }

    /// Run a backend call and post its outcome to the UI channel.
    fn spawn_load<T, F>(&mut self, task: F, loaded: fn(T) -> UiMessage)
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        self.pending_loads += 1;
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            match task.await {
                Ok(value) => {
                    let _ = tx.send(loaded(value));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::LoadError(e.to_string()));
                }
            }
        });
    }

    /// Like `spawn_load`, for mutations.
    fn spawn_operation<T, F>(&self, task: F, done: fn(T) -> UiMessage)
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            match task.await {
                Ok(value) => {
                    let _ = tx.send(done(value));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::OperationFailed(e.to_string()));
                }
            }
        });
    }

    /// Switch panels and refresh the data the panel shows.
    pub fn open_panel(&mut self, panel: Panel) {
        self.current_panel = panel;
        match panel {
            Panel::Dashboard => self.load_summary(),
            Panel::Employees => {
                self.load_employees();
                self.load_directory();
            }
            Panel::CheckClock => {
                self.load_check_clocks();
                self.load_directory();
                self.load_schedules();
                self.load_assignments();
            }
            Panel::Schedules => {
                self.load_schedules();
                self.load_assignments();
                self.load_directory();
            }
            Panel::Leave => self.load_leave(),
            Panel::Subscription => {
                self.load_packages();
                self.load_summary();
            }
            Panel::Settings => {}
        }
    }

    pub fn load_summary(&mut self) {
        let api = self.api.clone();
        self.spawn_load(async move { api::dashboard::summary(&api).await }, UiMessage::SummaryLoaded);
    }

    /// Load the current page of the employee table.
    pub fn load_employees(&mut self) {
        let api = self.api.clone();
        let query = self.employee_query.clone();
        self.spawn_load(
            async move { api::employees::list(&api, &query).await },
            UiMessage::EmployeesLoaded,
        );
    }

    /// Load every employee, for pickers and duplicate checks.
    pub fn load_directory(&mut self) {
        let api = self.api.clone();
        self.spawn_load(async move { api::employees::list_all(&api).await }, UiMessage::DirectoryLoaded);
    }

    pub fn load_check_clocks(&mut self) {
        let api = self.api.clone();
        let query = self.check_clock_query.clone();
        self.spawn_load(
            async move { api::check_clocks::list(&api, &query).await },
            UiMessage::CheckClocksLoaded,
        );
    }

    pub fn load_schedules(&mut self) {
        let api = self.api.clone();
        self.spawn_load(async move { api::schedules::list(&api).await }, UiMessage::SchedulesLoaded);
    }

    pub fn load_assignments(&mut self) {
        let api = self.api.clone();
        self.spawn_load(
            async move { api::schedules::list_assignments(&api).await },
            UiMessage::AssignmentsLoaded,
        );
    }

    pub fn load_leave(&mut self) {
        let api = self.api.clone();
        let query = self.leave_query.clone();
        self.spawn_load(async move { api::leave::list(&api, &query).await }, UiMessage::LeaveLoaded);
    }

    /// Load packages and the current subscription.
    pub fn load_packages(&mut self) {
        let api = self.api.clone();
        self.spawn_load(async move { api::subscription::packages(&api).await }, UiMessage::PackagesLoaded);

        let api = self.api.clone();
        self.spawn_load(
            async move { api::subscription::current(&api).await },
            UiMessage::SubscriptionLoaded,
        );
    }

    /// Select a leave tab and reload.
    pub fn set_leave_tab(&mut self, status: ApprovalStatus) {
        self.leave_tab = status;
        self.leave_query.set_filter("status", Some(status.key()));
        self.load_leave();
    }

    pub fn create_employee(&mut self, data: CreateEmployee) {
        let api = self.api.clone();
        self.spawn_operation(
            async move { api::employees::create(&api, &data).await },
            UiMessage::EmployeeSaved,
        );
    }

    pub fn update_employee(&mut self, id: i64, data: UpdateEmployee) {
        let api = self.api.clone();
        self.spawn_operation(
            async move { api::employees::update(&api, id, &data).await },
            UiMessage::EmployeeSaved,
        );
    }

    pub fn delete_employee(&mut self, id: i64) {
        let api = self.api.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            match api::employees::delete(&api, id).await {
                Ok(()) => {
                    let _ = tx.send(UiMessage::EmployeeDeleted(id));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::OperationFailed(e.to_string()));
                }
            }
        });
    }

    pub fn create_check_clock(&mut self, data: CreateCheckClock) {
        let api = self.api.clone();
        self.spawn_operation(
            async move { api::check_clocks::create(&api, &data).await },
            UiMessage::CheckClockSaved,
        );
    }

    /// Create a template, or replace it when `id` is set.
    pub fn save_schedule(&mut self, id: Option<i64>, data: CreateWorkSchedule) {
        let api = self.api.clone();
        self.spawn_operation(
            async move {
                match id {
                    Some(id) => api::schedules::update(&api, id, &data).await,
                    None => api::schedules::create(&api, &data).await,
                }
            },
            UiMessage::ScheduleSaved,
        );
    }

    pub fn delete_schedule(&mut self, id: i64) {
        let api = self.api.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            match api::schedules::delete(&api, id).await {
                Ok(()) => {
                    let _ = tx.send(UiMessage::ScheduleDeleted(id));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::OperationFailed(e.to_string()));
                }
            }
        });
    }

    pub fn assign_schedule(&mut self, data: AssignSchedule) {
        let api = self.api.clone();
        self.spawn_operation(
            async move { api::schedules::assign(&api, &data).await },
            UiMessage::ScheduleAssigned,
        );
    }

    /// Submit the open review dialog.
    pub fn submit_review(&mut self) {
        let form = self.review_form.clone();
        let api = self.api.clone();
        self.log_info(format!(
            "{} {}",
            if form.approve { "Approving" } else { "Rejecting" },
            form.subject
        ));

        match form.kind {
            ReviewKind::Leave => self.spawn_operation(
                async move {
                    if form.approve {
                        api::leave::approve(&api, form.id, Some(&form.note)).await
                    } else {
                        api::leave::reject(&api, form.id, &form.note).await
                    }
                },
                UiMessage::LeaveReviewed,
            ),
            ReviewKind::CheckClock => self.spawn_operation(
                async move {
                    if form.approve {
                        api::check_clocks::approve(&api, form.id).await
                    } else {
                        api::check_clocks::reject(&api, form.id, &form.note).await
                    }
                },
                UiMessage::CheckClockReviewed,
            ),
        }
        self.review_form.reset();
    }

    /// Validate an import file against the current employee list.
    pub fn check_import(&mut self, path: PathBuf) {
        self.import.path = Some(path.clone());
        self.import.report = None;
        self.import.result = None;
        self.import.checking = true;
        self.import.error_query = TableQuery::new(self.config.ui.page_size);
        self.log_info(format!("Checking import file {}", path.display()));

        let api = self.api.clone();
        let tx = self.tx.clone();
        let today = Local::now().date_naive();

        self.rt.spawn(async move {
            match check_import_file(&api, path, today).await {
                Ok(report) => {
                    let _ = tx.send(UiMessage::ImportChecked(report));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::ImportFailed(e.to_string()));
                }
            }
        });
    }

    /// Upload the valid rows of the checked import file.
    pub fn upload_import(&mut self) {
        let Some(report) = &self.import.report else {
            return;
        };
        let employees = report.employees();
        if employees.is_empty() {
            self.error_message = Some("No valid rows to import".to_string());
            return;
        }

        self.import.uploading = true;
        self.log_info(format!("Uploading {} employees", employees.len()));

        let api = self.api.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            match api::employees::bulk_create(&api, &employees).await {
                Ok(result) => {
                    let _ = tx.send(UiMessage::ImportUploaded(result));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::ImportFailed(e.to_string()));
                }
            }
        });
    }

    pub fn checkout(&mut self, request: CheckoutRequest) {
        self.seat_form.checking_out = true;
        self.seat_form.session = None;
        let api = self.api.clone();
        self.spawn_operation(
            async move { api::subscription::checkout(&api, &request).await },
            UiMessage::CheckoutReady,
        );
    }

    /// Ping the backend with the current (possibly unsaved) API settings.
    pub fn test_connection(&mut self) {
        self.connection = ConnectionStatus::Checking;
        let config = self.config.api.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            let result = match ApiClient::new(&config) {
                Ok(client) => client.ping().await.map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(UiMessage::ConnectionChecked(result));
        });
    }

    /// Write settings to disk and reconnect with them.
    pub fn save_config(&mut self) {
        if let Err(e) = self.config.validate() {
            self.error_message = Some(e.to_string());
            return;
        }
        if let Err(e) = self.config.save(&self.config_path) {
            tracing::error!("Failed to save config: {}", e);
            self.error_message = Some(format!("Failed to save config: {e}"));
            return;
        }

        match ApiClient::new(&self.config.api) {
            Ok(api) => self.api = api,
            Err(e) => {
                self.error_message = Some(e.to_string());
                return;
            }
        }

        let page_size = self.config.ui.page_size;
        for query in [
            &mut self.employee_query,
            &mut self.check_clock_query,
            &mut self.schedule_query,
            &mut self.leave_query,
        ] {
            query.set_page_size(page_size);
        }

        self.config_modified = false;
        self.success_message = Some(format!("Settings saved to {}", self.config_path.display()));
        self.log_success("Settings saved");
        self.test_connection();
    }

    /// Export every employee to a workbook chosen by the user.
    pub fn export_employees(&mut self) {
        let Some(path) = export::show_save_dialog(&export::generate_export_filename("employees")) else {
            return;
        };
        let api = self.api.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            let result = async {
                let employees = api::employees::list_all(&api).await?;
                export::export_employees(&employees, &path)?;
                Ok::<_, AppError>(employees.len())
            }
            .await;
            let _ = tx.send(export_message(result, &path));
        });
    }

    /// Export check-clock entries matching the current filters.
    pub fn export_check_clocks(&mut self) {
        let Some(path) = export::show_save_dialog(&export::generate_export_filename("check_clock")) else {
            return;
        };
        let api = self.api.clone();
        let tx = self.tx.clone();
        let query = self.check_clock_query.clone();

        self.rt.spawn(async move {
            let result = async {
                let records = api::check_clocks::list_all(&api, &query).await?;
                export::export_check_clocks(&records, &path)?;
                Ok::<_, AppError>(records.len())
            }
            .await;
            let _ = tx.send(export_message(result, &path));
        });
    }

    /// Save the row errors of the checked import file.
    pub fn export_import_errors(&mut self) {
        let Some(report) = &self.import.report else {
            return;
        };
        let Some(path) = export::show_save_dialog(&export::generate_export_filename("import_errors")) else {
            return;
        };

        match export::export_import_errors(report, &path) {
            Ok(()) => {
                let shown = path.display().to_string();
                self.success_message = Some(format!("Exported to: {shown}"));
                self.log_success(format!("Exported import errors: {shown}"));
            }
            Err(e) => {
                self.error_message = Some(format!("Export failed: {e}"));
                self.log_error(format!("Export failed: {e}"));
            }
        }
    }

    /// Save the employee import template.
    pub fn download_template(&mut self) {
        let Some(path) = export::show_save_dialog("employee_import_template.xlsx") else {
            return;
        };

        match export::write_import_template(&path) {
            Ok(()) => {
                self.success_message = Some(format!("Template saved to: {}", path.display()));
                self.log_success("Saved import template");
            }
            Err(e) => {
                self.error_message = Some(format!("Export failed: {e}"));
                self.log_error(format!("Export failed: {e}"));
            }
        }
    }

    fn finish_load(&mut self) {
        self.pending_loads = self.pending_loads.saturating_sub(1);
    }

    /// Poll async operation results.
    fn poll_async_results(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                UiMessage::SummaryLoaded(summary) => {
                    self.summary = Some(summary);
                    self.finish_load();
                }
                UiMessage::EmployeesLoaded(page) => {
                    let sync = self.employee_query.sync_from_meta(&page.meta, page.data.len());
                    self.employee_page = sync.info;
                    self.employees = page.data;
                    self.finish_load();
                    if sync.refetch {
                        self.load_employees();
                    }
                }
                UiMessage::DirectoryLoaded(employees) => {
                    self.directory = employees;
                    self.finish_load();
                }
                UiMessage::CheckClocksLoaded(page) => {
                    let sync = self.check_clock_query.sync_from_meta(&page.meta, page.data.len());
                    self.check_clock_page = sync.info;
                    self.check_clocks = page.data;
                    self.finish_load();
                    if sync.refetch {
                        self.load_check_clocks();
                    }
                }
                UiMessage::SchedulesLoaded(schedules) => {
                    if let Some(id) = self.calendar.schedule_id
                        && !schedules.iter().any(|s| s.id == id)
                    {
                        self.calendar.schedule_id = None;
                    }
                    if self.calendar.schedule_id.is_none() {
                        self.calendar.schedule_id = schedules.first().map(|s| s.id);
                    }
                    self.schedules = schedules;
                    self.finish_load();
                }
                UiMessage::AssignmentsLoaded(assignments) => {
                    self.assignments = assignments;
                    self.finish_load();
                }
                UiMessage::LeaveLoaded(page) => {
                    let sync = self.leave_query.sync_from_meta(&page.meta, page.data.len());
                    self.leave_page = sync.info;
                    self.leave_requests = page.data;
                    self.finish_load();
                    if sync.refetch {
                        self.load_leave();
                    }
                }
                UiMessage::PackagesLoaded(packages) => {
                    if self.seat_form.package_id.is_none() {
                        self.seat_form.package_id = packages.first().map(|p| p.id);
                    }
                    self.packages = packages;
                    self.finish_load();
                }
                UiMessage::SubscriptionLoaded(subscription) => {
                    if let Some(sub) = &subscription {
                        self.seat_form.package_id = Some(sub.package_id);
                        self.seat_form.seats_input = sub.seats.to_string();
                        self.seat_form.cycle = sub.cycle;
                    }
                    self.subscription = subscription;
                    self.finish_load();
                }
                UiMessage::LoadError(e) => {
                    self.error_message = Some(e.clone());
                    self.log_error(e);
                    self.finish_load();
                }
                UiMessage::EmployeeSaved(emp) => {
                    let name = emp.full_name();
                    self.success_message = Some(format!("Employee '{name}' saved"));
                    self.log_success(format!("Saved employee {name}"));
                    self.employee_form.reset();
                    self.load_employees();
                    self.load_directory();
                }
                UiMessage::EmployeeDeleted(id) => {
                    self.employees.retain(|e| e.id != id);
                    self.directory.retain(|e| e.id != id);
                    self.success_message = Some("Employee deleted".to_string());
                    self.log_success("Employee deleted");
                    self.load_employees();
                }
                UiMessage::CheckClockSaved(record) => {
                    self.success_message = Some(format!("Check-clock entry for {} saved", record.employee_name));
                    self.log_success(format!("Saved check-clock entry for {}", record.employee_name));
                    self.check_clock_form.reset();
                    self.load_check_clocks();
                }
                UiMessage::CheckClockReviewed(record) => {
                    self.log_success(format!(
                        "Check-clock entry for {} {}",
                        record.employee_name,
                        record.approval.label().to_lowercase()
                    ));
                    self.load_check_clocks();
                }
                UiMessage::ScheduleSaved(schedule) => {
                    self.success_message = Some(format!("Schedule '{}' saved", schedule.name));
                    self.log_success(format!("Saved schedule {}", schedule.name));
                    self.calendar.schedule_id = Some(schedule.id);
                    self.schedule_form.reset();
                    self.load_schedules();
                }
                UiMessage::ScheduleDeleted(id) => {
                    self.schedules.retain(|s| s.id != id);
                    self.success_message = Some("Schedule deleted".to_string());
                    self.log_success("Schedule deleted");
                    self.load_schedules();
                    self.load_assignments();
                }
                UiMessage::ScheduleAssigned(created) => {
                    self.success_message = Some(format!("Schedule assigned to {} employees", created.len()));
                    self.log_success(format!("Assigned schedule to {} employees", created.len()));
                    self.assign_form.reset();
                    self.load_assignments();
                }
                UiMessage::LeaveReviewed(request) => {
                    self.log_success(format!(
                        "Leave request of {} {}",
                        request.employee_name,
                        request.status.label().to_lowercase()
                    ));
                    self.load_leave();
                    self.load_summary();
                }
                UiMessage::OperationFailed(e) => {
                    self.seat_form.checking_out = false;
                    self.error_message = Some(e.clone());
                    self.log_error(e);
                }
                UiMessage::ImportChecked(report) => {
                    self.import.checking = false;
                    let summary = report.summary();
                    if report.is_clean() {
                        self.log_success(format!("Import check: {summary}"));
                    } else {
                        self.log_warning(format!("Import check: {summary}"));
                    }
                    self.import.report = Some(report);
                }
                UiMessage::ImportUploaded(result) => {
                    self.import.uploading = false;
                    if result.failed.is_empty() {
                        self.log_success(format!("Imported {} employees", result.created));
                    } else {
                        self.log_warning(format!(
                            "Imported {} employees, {} rejected by the server",
                            result.created,
                            result.failed.len()
                        ));
                    }
                    self.import.result = Some(result);
                    self.load_employees();
                    self.load_directory();
                }
                UiMessage::ImportFailed(e) => {
                    self.import.checking = false;
                    self.import.uploading = false;
                    self.error_message = Some(e.clone());
                    self.log_error(e);
                }
                UiMessage::CheckoutReady(session) => {
                    self.seat_form.checking_out = false;
                    self.log_success(format!("Checkout order {} created", session.order_id));
                    self.seat_form.session = Some(session);
                }
                UiMessage::ExportCompleted(path) => {
                    self.success_message = Some(format!("Exported to {path}"));
                    self.log_success(format!("Export completed: {path}"));
                }
                UiMessage::ExportFailed(e) => {
                    self.error_message = Some(e.clone());
                    self.log_error(e);
                }
                UiMessage::ConnectionChecked(result) => match result {
                    Ok(()) => {
                        self.connection = ConnectionStatus::Online;
                        self.log_success("Backend reachable");
                    }
                    Err(e) => {
                        self.log_error(format!("Backend unreachable: {e}"));
                        self.connection = ConnectionStatus::Offline(e);
                    }
                },
            }
        }
    }

    /// Render menu bar.
    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("Go", |ui| {
                    for panel in Panel::ALL {
                        if ui
                            .add_enabled(self.current_panel != panel, egui::Button::new(panel.name()))
                            .clicked()
                        {
                            self.open_panel(panel);
                            ui.close();
                        }
                    }
                });
                ui.menu_button("Tools", |ui| {
                    if ui.button("Import Employees...").clicked() {
                        self.open_panel(Panel::Employees);
                        self.import.reset();
                        self.import.is_open = true;
                        ui.close();
                    }
                    if ui.button("Download Import Template...").clicked() {
                        self.download_template();
                        ui.close();
                    }
                    ui.separator();
                    let checking = self.connection == ConnectionStatus::Checking;
                    if ui
                        .add_enabled(!checking, egui::Button::new("Test Connection"))
                        .clicked()
                    {
                        self.test_connection();
                        ui.close();
                    }
                });
                ui.menu_button("Settings", |ui| {
                    if ui.button("General").clicked() {
                        self.open_panel(Panel::Settings);
                        ui.close();
                    }
                });
            });
        });
    }

    /// Render status bar (display only, no interaction).
    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(28.0)
            .show(ctx, |ui| {
                ui.disable();
                ui.horizontal(|ui| {
                    let (color, text) = match &self.connection {
                        ConnectionStatus::Unknown => (colors::NEUTRAL, "Not checked".to_string()),
                        ConnectionStatus::Checking => (colors::WARNING, "Checking...".to_string()),
                        ConnectionStatus::Online => (colors::SUCCESS, "Online".to_string()),
                        ConnectionStatus::Offline(e) => (colors::ERROR, format!("Offline ({e})")),
                    };

                    if self.connection == ConnectionStatus::Checking {
                        ui.spinner();
                    }
                    ui.colored_label(color, format!("API: {text}"));
                    ui.separator();
                    ui.label(self.api.base_url());

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(&self.config.company.name);
                        if self.is_loading() {
                            ui.spinner();
                            ui.label("Loading...");
                        }
                    });
                });
            });
    }

    /// Render modal dialogs (error, success, delete confirmation).
    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(ref error) = self.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::ERROR, error);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.error_message = None;
                    }
                });
        }

        if let Some(ref msg) = self.success_message.clone() {
            egui::Window::new("Success")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::SUCCESS, msg);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.success_message = None;
                    }
                });
        }

        if self.review_form.is_open {
            self.show_review_dialog(ctx);
        }

        if self.show_delete_confirm
            && let Some(ref target) = self.delete_target.clone()
        {
            let (title, message) = match target {
                DeleteTarget::Employee(_, name) => ("Delete Employee", format!("Delete employee '{name}'?")),
                DeleteTarget::Schedule(_, name) => (
                    "Delete Schedule",
                    format!("Delete schedule '{name}'? Employees assigned to it lose their schedule."),
                ),
            };

            egui::Window::new(title)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            self.show_delete_confirm = false;
                            self.delete_target = None;
                        }
                        if ui.button("Delete").clicked() {
                            self.confirm_delete();
                            self.show_delete_confirm = false;
                            self.delete_target = None;
                        }
                    });
                });
        }
    }

    /// Approve or reject a leave request or check-clock entry.
    fn show_review_dialog(&mut self, ctx: &egui::Context) {
        let title = match (self.review_form.kind, self.review_form.approve) {
            (ReviewKind::Leave, true) => "Approve Leave Request",
            (ReviewKind::Leave, false) => "Reject Leave Request",
            (ReviewKind::CheckClock, true) => "Approve Check-Clock Entry",
            (ReviewKind::CheckClock, false) => "Reject Check-Clock Entry",
        };

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .default_width(400.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new(&self.review_form.subject).strong());
                ui.add_space(10.0);

                let hint = if self.review_form.approve {
                    "Optional note"
                } else {
                    "Reason for rejection (required)"
                };
                let show_note = self.review_form.kind == ReviewKind::Leave || !self.review_form.approve;
                if show_note {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.review_form.note)
                            .desired_width(360.0)
                            .desired_rows(3)
                            .hint_text(hint),
                    );
                }

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if styled_button(ui, "Cancel").clicked() {
                        self.review_form.reset();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let label = if self.review_form.approve { "Approve" } else { "Reject" };
                        if ui
                            .add_enabled(self.review_form.can_submit(), egui::Button::new(label))
                            .clicked()
                        {
                            self.submit_review();
                        }
                    });
                });
            });
    }

    /// Execute the confirmed delete operation.
    fn confirm_delete(&mut self) {
        if let Some(target) = self.delete_target.take() {
            match target {
                DeleteTarget::Employee(id, name) => {
                    self.log_info(format!("Deleting employee: {name}"));
                    self.delete_employee(id);
                }
                DeleteTarget::Schedule(id, name) => {
                    self.log_info(format!("Deleting schedule: {name}"));
                    self.delete_schedule(id);
                }
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_async_results();

        // Request repaint during async operations
        if self.is_loading()
            || self.connection == ConnectionStatus::Checking
            || self.import.is_busy()
            || self.seat_form.checking_out
        {
            ctx.request_repaint();
        }

        self.show_menu_bar(ctx);
        self.show_status_bar(ctx);
        self.show_dialogs(ctx);

        let mut next_panel = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            let go_back = match self.current_panel {
                Panel::Dashboard => {
                    next_panel = dashboard::show(self, ui);
                    false
                }
                Panel::Employees => employee_panel::show(self, ui),
                Panel::CheckClock => check_clock_panel::show(self, ui),
                Panel::Schedules => schedule_panel::show(self, ui),
                Panel::Leave => leave_panel::show(self, ui),
                Panel::Subscription => subscription_panel::show(self, ui),
                Panel::Settings => settings_panel::show(self, ui),
            };
            if go_back {
                next_panel = Some(Panel::Dashboard);
            }
        });

        if let Some(panel) = next_panel {
            self.open_panel(panel);
        }
    }
}

/// Fetch existing keys, then parse and validate the file off the UI thread.
async fn check_import_file(api: &ApiClient, path: PathBuf, today: NaiveDate) -> Result<ImportReport> {
    let existing = ExistingKeys::from_employees(&api::employees::list_all(api).await?);
    tokio::task::spawn_blocking(move || import::validate_file(&path, &existing, today))
        .await
        .map_err(|e| AppError::import(e.to_string()))?
}

fn export_message(result: Result<usize>, path: &Path) -> UiMessage {
    match result {
        Ok(rows) => UiMessage::ExportCompleted(format!("{} ({rows} rows)", path.display())),
        Err(e) => UiMessage::ExportFailed(format!("Export failed: {e}")),
    }
}

/// Weekday for an editor slot (0 = Monday).
pub fn weekday_at(index: usize) -> Weekday {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ][index % 7]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_assign_form_defaults_to_next_month() {
        let schedule = WorkSchedule {
            id: 3,
            name: "Office".to_string(),
            work_type: WorkType::Office,
            days: Vec::new(),
        };
        assert_eq!(AssignForm::open(&schedule, d(2026, 10, 19)).effective_from_input, "2026-11-01");
        assert_eq!(AssignForm::open(&schedule, d(2026, 12, 5)).effective_from_input, "2027-01-01");
    }

    #[test]
    fn test_calendar_month_navigation_wraps_years() {
        let mut calendar = CalendarState::new(d(2026, 1, 10));
        calendar.prev_month();
        assert_eq!((calendar.year, calendar.month), (2025, 12));
        calendar.next_month();
        calendar.next_month();
        assert_eq!((calendar.year, calendar.month), (2026, 2));
    }

    #[test]
    fn test_rejection_requires_note() {
        let mut form = ReviewForm::open(ReviewKind::Leave, 1, "Budi", false);
        assert!(!form.can_submit());
        form.note = "Overlaps audit week".to_string();
        assert!(form.can_submit());
        assert!(ReviewForm::open(ReviewKind::CheckClock, 2, "Sari", true).can_submit());
    }

    #[test]
    fn test_schedule_form_create_enables_weekdays() {
        let form = ScheduleForm::create();
        let enabled: Vec<Weekday> = (0..7).filter(|i| form.days[*i].enabled).map(weekday_at).collect();
        assert_eq!(
            enabled,
            vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
        );
    }
}
