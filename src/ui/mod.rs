//! GUI panels and application state.

pub mod app;
pub mod check_clock_panel;
pub mod components;
pub mod dashboard;
pub mod employee_panel;
pub mod leave_panel;
pub mod schedule_panel;
pub mod settings_panel;
pub mod setup_wizard;
pub mod subscription_panel;

pub use app::App;
pub use setup_wizard::{SetupApp, SetupWizard};
