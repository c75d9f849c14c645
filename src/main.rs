//! HRIS Desk - desktop client for employee, attendance, schedule, leave and billing management.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use eframe::egui;
use hris_desk as app;

use app::config::{AppConfig, ConfigLoadResult};
use app::import::{ExistingKeys, validate_file};
use app::ui::{App, SetupApp, SetupWizard};
use app::{export, logging};

/// Desktop client for the HRIS backend.
#[derive(Parser)]
#[command(name = "hris-desk", version)]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Use a specific config file
    #[arg(long, value_name = "PATH", conflicts_with = "dev")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate an employee import file without uploading it
    CheckImport {
        /// CSV or spreadsheet file
        file: PathBuf,
    },
    /// Write the employee import template workbook
    ImportTemplate {
        /// Destination .xlsx file
        file: PathBuf,
    },
}

/// Application launch mode.
enum LaunchMode {
    /// Normal operation with valid config.
    Normal(AppConfig),
    /// Setup wizard for first run or invalid config.
    Setup(SetupWizard, Option<String>),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = match (&cli.config, cli.dev) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from("config.toml"),
        (None, false) => AppConfig::default_path(),
    };

    let load_result = AppConfig::try_load(&config_path);
    let logging_config = match &load_result {
        ConfigLoadResult::Loaded(config) => config.logging.clone(),
        _ => Default::default(),
    };
    let _log_guard = logging::init(&logging_config);

    tracing::info!("HRIS Desk {} starting...", env!("CARGO_PKG_VERSION"));
    if cli.dev {
        tracing::info!("Dev mode: loading config from current directory");
    }
    tracing::info!("Config path: {:?}", config_path);

    match cli.command {
        Some(Command::CheckImport { file }) => return check_import(&file),
        Some(Command::ImportTemplate { file }) => {
            export::write_import_template(&file).with_context(|| format!("Failed to write {}", file.display()))?;
            println!("Template written to {}", file.display());
            return Ok(());
        }
        None => {}
    }

    let launch_mode = match load_result {
        ConfigLoadResult::Loaded(config) => {
            tracing::info!("Config loaded successfully");
            LaunchMode::Normal(config)
        }
        ConfigLoadResult::Missing => {
            tracing::info!("Config missing, starting setup wizard");
            LaunchMode::Setup(SetupWizard::new(), None)
        }
        ConfigLoadResult::Invalid(e) => {
            tracing::warn!("Config invalid: {}", e);
            LaunchMode::Setup(SetupWizard::new(), Some(e.to_string()))
        }
    };

    // Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    match launch_mode {
        LaunchMode::Normal(config) => run_main_app(config, config_path, rt),
        LaunchMode::Setup(wizard, error) => run_setup_wizard(wizard, error, config_path, rt),
    }
}

/// Validate an import file offline and print the report.
///
/// Duplicates against employees already on the backend are not checked here.
fn check_import(file: &Path) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let report = validate_file(file, &ExistingKeys::default(), today)
        .with_context(|| format!("Failed to check {}", file.display()))?;

    println!("{}: {}", file.display(), report.summary());
    if !report.ignored_columns.is_empty() {
        println!("Ignored columns: {}", report.ignored_columns.join(", "));
    }

    for row in report.invalid_rows() {
        for error in report.errors_for(row) {
            match &error.column {
                Some(column) => println!("  row {row}, {column}: {}", error.message),
                None => println!("  row {row}: {}", error.message),
            }
        }
    }

    if !report.is_clean() {
        bail!("{} rows need fixing", report.invalid_rows().len());
    }
    Ok(())
}

/// Run the setup wizard.
fn run_setup_wizard(
    wizard: SetupWizard,
    initial_error: Option<String>,
    config_path: PathBuf,
    rt: tokio::runtime::Runtime,
) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("HRIS Desk - Setup")
            .with_inner_size([600.0, 500.0])
            .with_min_inner_size([500.0, 400.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "HRIS Desk - Setup",
        options,
        Box::new(|_cc| Ok(Box::new(SetupApp::new(wizard, initial_error, config_path, rt)))),
    )
    .map_err(|e| anyhow::anyhow!("Setup window failed: {e}"))
}

/// Run the main application.
fn run_main_app(config: AppConfig, config_path: PathBuf, rt: tokio::runtime::Runtime) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("HRIS Desk")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    tracing::info!("Backend: {}", config.api.base_url);

    eframe::run_native(
        "HRIS Desk",
        options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);

            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);

            let app = App::new(config, config_path, rt)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Main window failed: {e}"))
}
