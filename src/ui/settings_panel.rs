//! Settings panel for backend connection, company, table and logging configuration.

use eframe::egui::{self, RichText};

use super::app::{App, ConnectionStatus};
use super::components::{back_button, colors, panel_header};
use crate::config::{AppConfig, LOG_LEVELS, PAGE_SIZES};
use crate::logging;

/// Show the settings panel.
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut egui::Ui) -> bool {
    let go_back = back_button(ui);
    panel_header(ui, "Settings");

    egui::ScrollArea::vertical().show(ui, |ui| {
        // Backend connection
        ui.group(|ui| {
            ui.heading("Backend Connection");
            ui.add_space(5.0);

            egui::Grid::new("api_settings_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Base URL:");
                    if ui
                        .add(egui::TextEdit::singleline(&mut app.config.api.base_url).desired_width(300.0))
                        .changed()
                    {
                        app.config_modified = true;
                        app.connection = ConnectionStatus::Unknown;
                    }
                    ui.end_row();

                    ui.label("API Token:");
                    if ui
                        .add(
                            egui::TextEdit::singleline(&mut app.config.api.token)
                                .password(true)
                                .desired_width(300.0),
                        )
                        .changed()
                    {
                        app.config_modified = true;
                        app.connection = ConnectionStatus::Unknown;
                    }
                    ui.end_row();

                    ui.label("Timeout (seconds):");
                    let mut timeout_str = app.config.api.timeout_secs.to_string();
                    if ui.text_edit_singleline(&mut timeout_str).changed()
                        && let Ok(timeout) = timeout_str.parse()
                    {
                        app.config.api.timeout_secs = timeout;
                        app.config_modified = true;
                    }
                    ui.end_row();
                });

            ui.add_space(5.0);

            ui.horizontal(|ui| {
                let checking = app.connection == ConnectionStatus::Checking;
                if ui
                    .add_enabled(!checking, egui::Button::new("Test Connection"))
                    .clicked()
                {
                    app.test_connection();
                }

                // Inline status indicator
                match &app.connection {
                    ConnectionStatus::Checking => {
                        ui.spinner();
                    }
                    ConnectionStatus::Online => {
                        ui.label(RichText::new("Connected").color(colors::SUCCESS));
                    }
                    ConnectionStatus::Offline(e) => {
                        ui.label(RichText::new(format!("Failed: {e}")).color(colors::ERROR));
                    }
                    ConnectionStatus::Unknown => {}
                }
            });

            if !app.config.api.has_token() {
                ui.label(RichText::new("No token set; most requests will be refused.").color(colors::WARNING));
            }
        });

        ui.add_space(15.0);

        // Company
        ui.group(|ui| {
            ui.heading("Company");
            ui.add_space(5.0);

            egui::Grid::new("company_settings_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Company name:");
                    if ui.text_edit_singleline(&mut app.config.company.name).changed() {
                        app.config_modified = true;
                    }
                    ui.end_row();

                    ui.label("Tax rate (%):");
                    let mut tax_str = app.config.company.tax_rate_percent.to_string();
                    if ui.text_edit_singleline(&mut tax_str).changed()
                        && let Ok(tax) = tax_str.parse()
                    {
                        app.config.company.tax_rate_percent = tax;
                        app.config_modified = true;
                    }
                    ui.end_row();
                });
        });

        ui.add_space(15.0);

        // UI Options
        ui.group(|ui| {
            ui.heading("Tables");
            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.label("Rows per page:");
                egui::ComboBox::from_id_salt("settings_page_size")
                    .selected_text(app.config.ui.page_size.to_string())
                    .show_ui(ui, |ui| {
                        for size in PAGE_SIZES {
                            if ui
                                .selectable_value(&mut app.config.ui.page_size, size, size.to_string())
                                .changed()
                            {
                                app.config_modified = true;
                            }
                        }
                    });
            });
        });

        ui.add_space(15.0);

        // Logging
        ui.group(|ui| {
            ui.heading("Logging");
            ui.add_space(5.0);

            egui::Grid::new("logging_settings_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Level:");
                    egui::ComboBox::from_id_salt("settings_log_level")
                        .selected_text(&app.config.logging.level)
                        .show_ui(ui, |ui| {
                            for level in LOG_LEVELS {
                                if ui
                                    .selectable_label(app.config.logging.level.eq_ignore_ascii_case(level), level)
                                    .clicked()
                                {
                                    app.config.logging.level = level.to_string();
                                    app.config_modified = true;
                                }
                            }
                        });
                    ui.end_row();

                    ui.label("Log file:");
                    if ui.checkbox(&mut app.config.logging.file_enabled, "Write daily log files").changed() {
                        app.config_modified = true;
                    }
                    ui.end_row();

                    ui.label("Directory:");
                    let shown = logging::log_dir(&app.config.logging).display().to_string();
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(shown).weak());
                        if ui.small_button("Change...").clicked()
                            && let Some(dir) = rfd::FileDialog::new().pick_folder()
                        {
                            app.config.logging.directory = Some(dir);
                            app.config_modified = true;
                        }
                        if app.config.logging.directory.is_some() && ui.small_button("Default").clicked() {
                            app.config.logging.directory = None;
                            app.config_modified = true;
                        }
                    });
                    ui.end_row();
                });

            ui.label(RichText::new("Logging changes apply after a restart.").small().weak());
        });

        ui.add_space(20.0);

        // Action buttons
        ui.horizontal(|ui| {
            let save_btn = egui::Button::new("Save Settings");
            if ui.add_enabled(app.config_modified, save_btn).clicked() {
                app.save_config();
            }

            if app.config_modified {
                ui.label(RichText::new("(unsaved changes)").color(colors::WARNING).italics());
            }

            if ui.button("Reset to Defaults").clicked() {
                app.config = AppConfig::default();
                app.config_modified = true;
                app.connection = ConnectionStatus::Unknown;
            }
        });

        ui.add_space(10.0);
        ui.label(RichText::new(format!("Config file: {}", app.config_path.display())).small().weak());
    });

    go_back
}
