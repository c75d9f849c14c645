//! First-run setup wizard for configuration.

use std::path::PathBuf;
use std::sync::mpsc;

use eframe::egui::{self, Color32, RichText};

use crate::api::ApiClient;
use crate::config::{ApiConfig, AppConfig, PAGE_SIZES};

/// Connection test state.
#[derive(Default, Clone, Debug, PartialEq)]
pub enum ConnectionTestState {
    #[default]
    NotTested,
    Testing,
    Success,
    Failed(String),
}

/// Setup wizard state.
pub struct SetupWizard {
    /// Current step (0-3).
    pub current_step: usize,
    /// Configuration being built.
    pub config: AppConfig,
    /// Backend connection test state.
    pub api_test_state: ConnectionTestState,
    /// Wizard completed flag.
    pub completed: bool,
    /// Timeout input as string for text editing.
    timeout_input: String,
    /// Tax rate input as string.
    tax_input: String,
}

impl Default for SetupWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupWizard {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Start from an existing (possibly invalid) configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            current_step: 0,
            timeout_input: config.api.timeout_secs.to_string(),
            tax_input: config.company.tax_rate_percent.to_string(),
            config,
            api_test_state: ConnectionTestState::NotTested,
            completed: false,
        }
    }

    /// Check if user can proceed to next step.
    pub fn can_proceed(&self) -> bool {
        match self.current_step {
            0 => true, // Welcome - always can proceed
            1 => self.api_test_state == ConnectionTestState::Success,
            2 => self.validate_company_step().is_ok(),
            3 => self.config.validate().is_ok(),
            _ => false,
        }
    }

    /// Validate company step inputs.
    fn validate_company_step(&self) -> Result<(), String> {
        if self.config.company.name.trim().is_empty() {
            return Err("Company name is required".to_string());
        }
        if !self.tax_input.trim().parse::<u32>().is_ok_and(|t| t <= 100) {
            return Err("Tax rate must be a whole number between 0 and 100".to_string());
        }
        Ok(())
    }

    /// Any edit to the connection settings invalidates the last test.
    fn connection_changed(&mut self) {
        self.api_test_state = ConnectionTestState::NotTested;
    }

    /// Get step title.
    fn step_title(&self) -> &'static str {
        match self.current_step {
            0 => "Welcome",
            1 => "Backend Connection",
            2 => "Company",
            3 => "Confirmation",
            _ => "Setup",
        }
    }

    /// Total number of steps.
    const TOTAL_STEPS: usize = 4;
}

/// Setup wizard application.
pub struct SetupApp {
    pub wizard: SetupWizard,
    pub initial_error: Option<String>,
    pub rt: tokio::runtime::Runtime,
    config_path: PathBuf,
    api_test_rx: Option<mpsc::Receiver<Result<(), String>>>,
}

impl SetupApp {
    pub fn new(
        wizard: SetupWizard,
        initial_error: Option<String>,
        config_path: PathBuf,
        rt: tokio::runtime::Runtime,
    ) -> Self {
        Self {
            wizard,
            initial_error,
            rt,
            config_path,
            api_test_rx: None,
        }
    }

    /// Test the backend connection asynchronously.
    fn start_api_test(&mut self) {
        let config = self.wizard.config.api.clone();
        let (tx, rx) = mpsc::channel();
        self.api_test_rx = Some(rx);
        self.wizard.api_test_state = ConnectionTestState::Testing;

        self.rt.spawn(async move {
            let result = test_api_connection(&config).await;
            let _ = tx.send(result);
        });
    }

    /// Check for async test results.
    fn poll_test_results(&mut self) {
        if let Some(rx) = &self.api_test_rx
            && let Ok(result) = rx.try_recv()
        {
            self.wizard.api_test_state = match result {
                Ok(()) => ConnectionTestState::Success,
                Err(e) => ConnectionTestState::Failed(e),
            };
            self.api_test_rx = None;
        }
    }
}

impl eframe::App for SetupApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll async test results
        self.poll_test_results();

        // Request repaint while testing
        if self.wizard.api_test_state == ConnectionTestState::Testing {
            ctx.request_repaint();
        }

        // Show initial error dialog
        if let Some(err) = self.initial_error.clone() {
            egui::Window::new("Configuration Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(Color32::from_rgb(255, 100, 100), &err);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.initial_error = None;
                    }
                });
            return;
        }

        // Main wizard panel
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);

                // Header
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("HRIS Desk Setup").size(24.0).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!(
                            "Step {} of {}",
                            self.wizard.current_step + 1,
                            SetupWizard::TOTAL_STEPS
                        ));
                    });
                });

                ui.separator();
                ui.add_space(10.0);

                // Step title
                ui.heading(self.wizard.step_title());
                ui.add_space(20.0);

                // Step content
                let needs_api_test = match self.wizard.current_step {
                    0 => {
                        show_welcome_step(ui);
                        false
                    }
                    1 => show_api_step(ui, &mut self.wizard),
                    2 => {
                        show_company_step(ui, &mut self.wizard);
                        false
                    }
                    3 => {
                        show_confirmation_step(ui, &self.wizard, &self.config_path);
                        false
                    }
                    _ => false,
                };

                if needs_api_test {
                    self.start_api_test();
                }

                ui.add_space(30.0);
                ui.separator();

                // Navigation buttons
                ui.horizontal(|ui| {
                    if self.wizard.current_step > 0 && ui.button("< Back").clicked() {
                        self.wizard.current_step -= 1;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if self.wizard.current_step < SetupWizard::TOTAL_STEPS - 1 {
                            let btn_text = if self.wizard.current_step == 0 {
                                "Get Started >"
                            } else {
                                "Next >"
                            };
                            let enabled = self.wizard.can_proceed();
                            if ui.add_enabled(enabled, egui::Button::new(btn_text)).clicked() {
                                self.wizard.current_step += 1;
                            }
                        } else {
                            // Final step - Save & Exit
                            let enabled = self.wizard.can_proceed();
                            if ui.add_enabled(enabled, egui::Button::new("Save & Exit")).clicked() {
                                self.wizard.completed = true;
                            }
                        }
                    });
                });
            });
        });

        // Handle completion
        if self.wizard.completed {
            match self.wizard.config.save(&self.config_path) {
                Ok(()) => {
                    tracing::info!("Setup saved config to {}", self.config_path.display());
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                Err(e) => {
                    tracing::error!("Failed to save config: {}", e);
                    self.initial_error = Some(format!("Failed to save config: {}", e));
                    self.wizard.completed = false;
                }
            }
        }
    }
}

fn show_welcome_step(ui: &mut egui::Ui) {
    ui.label("Welcome to HRIS Desk!");
    ui.add_space(10.0);
    ui.label("This wizard will help you connect to your HR backend.");
    ui.add_space(20.0);
    ui.label("You will need:");
    ui.add_space(5.0);
    ui.label("  - The base URL of the HRIS API");
    ui.label("  - An API token issued by your administrator");
}

fn show_api_step(ui: &mut egui::Ui, wizard: &mut SetupWizard) -> bool {
    let mut needs_test = false;

    egui::Grid::new("api_grid")
        .num_columns(2)
        .spacing([20.0, 8.0])
        .striped(true)
        .show(ui, |ui| {
            ui.label("Base URL:");
            if ui.text_edit_singleline(&mut wizard.config.api.base_url).changed() {
                wizard.connection_changed();
            }
            ui.end_row();

            ui.label("API Token:");
            if ui
                .add(egui::TextEdit::singleline(&mut wizard.config.api.token).password(true))
                .changed()
            {
                wizard.connection_changed();
            }
            ui.end_row();

            ui.label("Timeout (seconds):");
            if ui.text_edit_singleline(&mut wizard.timeout_input).changed()
                && let Ok(t) = wizard.timeout_input.parse()
            {
                wizard.config.api.timeout_secs = t;
                wizard.connection_changed();
            }
            ui.end_row();
        });

    ui.add_space(20.0);

    ui.horizontal(|ui| {
        let testing = wizard.api_test_state == ConnectionTestState::Testing;
        if ui.add_enabled(!testing, egui::Button::new("Test Connection")).clicked() {
            needs_test = true;
        }

        ui.add_space(10.0);

        match &wizard.api_test_state {
            ConnectionTestState::NotTested => {
                ui.label("Not tested");
            }
            ConnectionTestState::Testing => {
                ui.spinner();
                ui.label("Testing...");
            }
            ConnectionTestState::Success => {
                ui.colored_label(Color32::from_rgb(100, 200, 100), "Connection successful!");
            }
            ConnectionTestState::Failed(e) => {
                ui.colored_label(Color32::from_rgb(255, 100, 100), format!("Failed: {}", e));
            }
        }
    });

    needs_test
}

fn show_company_step(ui: &mut egui::Ui, wizard: &mut SetupWizard) {
    ui.label("Company details used on the dashboard and in checkout quotes.");
    ui.add_space(10.0);

    egui::Grid::new("company_grid")
        .num_columns(2)
        .spacing([20.0, 8.0])
        .striped(true)
        .show(ui, |ui| {
            ui.label("Company name:");
            ui.text_edit_singleline(&mut wizard.config.company.name);
            ui.end_row();

            ui.label("Tax rate (%):");
            if ui.text_edit_singleline(&mut wizard.tax_input).changed()
                && let Ok(t) = wizard.tax_input.trim().parse()
            {
                wizard.config.company.tax_rate_percent = t;
            }
            ui.end_row();

            ui.label("Rows per page:");
            egui::ComboBox::from_id_salt("wizard_page_size")
                .selected_text(wizard.config.ui.page_size.to_string())
                .show_ui(ui, |ui| {
                    for size in PAGE_SIZES {
                        ui.selectable_value(&mut wizard.config.ui.page_size, size, size.to_string());
                    }
                });
            ui.end_row();
        });

    // Validation feedback
    if let Err(e) = wizard.validate_company_step() {
        ui.add_space(10.0);
        ui.colored_label(Color32::from_rgb(255, 100, 100), e);
    }
}

fn show_confirmation_step(ui: &mut egui::Ui, wizard: &SetupWizard, config_path: &std::path::Path) {
    ui.label("Review your configuration:");
    ui.add_space(10.0);

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.heading("Backend");
        ui.label(format!("  {}", wizard.config.api.base_url));
        ui.label(format!(
            "  Token: {}",
            if wizard.config.api.has_token() { "set" } else { "not set" }
        ));
        ui.label(format!("  Timeout: {} seconds", wizard.config.api.timeout_secs));
    });

    ui.add_space(10.0);

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.heading("Company");
        ui.label(format!("  {}", wizard.config.company.name));
        ui.label(format!("  Tax rate: {}%", wizard.config.company.tax_rate_percent));
        ui.label(format!("  Rows per page: {}", wizard.config.ui.page_size));
    });

    if let Err(e) = wizard.config.validate() {
        ui.add_space(10.0);
        ui.colored_label(Color32::from_rgb(255, 100, 100), e.to_string());
    }

    ui.add_space(20.0);
    ui.label(format!("Settings will be written to {}.", config_path.display()));
    ui.label("You will need to restart the application after setup.");
}

/// Ping the backend with the entered settings.
async fn test_api_connection(config: &ApiConfig) -> Result<(), String> {
    if config.base_url.trim().is_empty() {
        return Err("URL is empty".to_string());
    }

    let client = ApiClient::new(config).map_err(|e| e.to_string())?;
    client.ping().await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_step_requires_successful_test() {
        let mut wizard = SetupWizard::new();
        assert!(wizard.can_proceed());

        wizard.current_step = 1;
        assert!(!wizard.can_proceed());

        wizard.api_test_state = ConnectionTestState::Success;
        assert!(wizard.can_proceed());

        wizard.connection_changed();
        assert!(!wizard.can_proceed());
    }

    #[test]
    fn test_company_step_validation() {
        let mut wizard = SetupWizard::new();
        wizard.current_step = 2;
        assert!(wizard.can_proceed());

        wizard.tax_input = "150".to_string();
        assert!(!wizard.can_proceed());

        wizard.tax_input = "11".to_string();
        wizard.config.company.name = "  ".to_string();
        assert!(!wizard.can_proceed());
    }

    #[tokio::test]
    async fn test_api_connection_rejects_empty_url() {
        let config = ApiConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert_eq!(test_api_connection(&config).await, Err("URL is empty".to_string()));
    }
}
