pub mod api;
pub mod billing;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod import;
pub mod logging;
pub mod models;
pub mod schedule;
pub mod table;
pub mod ui;

pub use error::{AppError, Result};
