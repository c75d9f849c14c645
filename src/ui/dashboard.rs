//! Dashboard panel with stats, navigation cards, quick actions, and activity log.

use chrono::Local;
use eframe::egui::{self, Color32, CornerRadius, Margin, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{AIRPLANE_TILT, CALENDAR_CHECK, CLOCK, CREDIT_CARD, GEAR, USERS};

use super::app::{App, CheckClockForm, EmployeeForm, LogLevel, Panel};
use super::components::{colors, dashboard_card, stat_card};
use crate::format::format_date_long;

/// Show the dashboard panel.
///
/// Returns `Some(panel)` if navigation is requested.
pub fn show(app: &mut App, ui: &mut Ui) -> Option<Panel> {
    let mut next_panel = None;
    let today = Local::now().date_naive();

    ui.vertical_centered(|ui| {
        ui.add_space(30.0);

        ui.label(RichText::new(&app.config.company.name).size(32.0).strong());
        ui.add_space(5.0);
        ui.label(RichText::new(format!("HR overview for {}", format_date_long(today))).size(14.0).weak());

        ui.add_space(30.0);

        ui.horizontal(|ui| {
            let available = ui.available_width();
            let start_offset = ((available - 850.0) / 2.0).max(0.0);
            ui.add_space(start_offset);

            match &app.summary {
                Some(summary) => {
                    stat_card(
                        ui,
                        "Employees",
                        &summary.active_employees.to_string(),
                        &format!("{} total, {} new this month", summary.total_employees, summary.new_hires),
                    );
                    stat_card(ui, "Present Today", &summary.present_today.to_string(), "Clocked in");
                    stat_card(ui, "Late Today", &summary.late_today.to_string(), "After check-in window");
                    stat_card(
                        ui,
                        "Absent Today",
                        &summary.absent_today().to_string(),
                        &format!("{} on leave", summary.on_leave_today),
                    );
                    stat_card(
                        ui,
                        "Leave Requests",
                        &summary.pending_leave_requests.to_string(),
                        "Awaiting review",
                    );
                }
                None => {
                    ui.spinner();
                    ui.label("Loading summary...");
                }
            }
        });

        ui.add_space(30.0);

        // Navigation cards row
        let available = ui.available_width();
        let num_cards = 6.0;
        let spacing = 20.0;
        let total_spacing = spacing * (num_cards - 1.0);
        let card_width = ((available - total_spacing) / num_cards).clamp(130.0, 220.0);
        let card_height = card_width * 0.75;
        let card_size = egui::vec2(card_width, card_height);
        let total_width = card_width * num_cards + total_spacing;
        let start_offset = ((available - total_width) / 2.0).max(0.0);

        let cards = [
            (Panel::Employees, "Employees", "Records & import", USERS),
            (Panel::CheckClock, "Check Clock", "Attendance entries", CLOCK),
            (Panel::Schedules, "Schedules", "Work hours & shifts", CALENDAR_CHECK),
            (Panel::Leave, "Leave", "Approve requests", AIRPLANE_TILT),
            (Panel::Subscription, "Subscription", "Seats & billing", CREDIT_CARD),
            (Panel::Settings, "Settings", "Connection & preferences", GEAR),
        ];

        ui.horizontal(|ui| {
            ui.add_space(start_offset);
            for (idx, (panel, title, description, icon)) in cards.into_iter().enumerate() {
                if idx > 0 {
                    ui.add_space(spacing);
                }
                if dashboard_card(ui, title, description, icon, card_size).clicked() {
                    next_panel = Some(panel);
                }
            }
        });

        ui.add_space(30.0);
    });

    // Two-column layout: Quick Actions | Recent Activity
    let available_width = ui.available_width();
    let column_width = (available_width - 40.0) / 2.0;

    ui.horizontal(|ui| {
        ui.add_space(10.0);

        ui.vertical(|ui| {
            ui.set_width(column_width);

            egui::Frame::new()
                .fill(ui.style().visuals.extreme_bg_color)
                .inner_margin(Margin::same(15))
                .corner_radius(CornerRadius::same(8))
                .show(ui, |ui| {
                    ui.set_min_width(column_width - 30.0);

                    ui.label(RichText::new("Quick Actions").strong());
                    ui.add_space(10.0);

                    if ui.button("Add Employee").clicked() {
                        app.employee_form = EmployeeForm::create(today);
                        next_panel = Some(Panel::Employees);
                    }

                    ui.add_space(5.0);

                    if ui.button("Import Employees").clicked() {
                        app.import.reset();
                        app.import.is_open = true;
                        next_panel = Some(Panel::Employees);
                    }

                    ui.add_space(5.0);

                    if ui.button("Record Check-Clock").clicked() {
                        app.check_clock_form = CheckClockForm::create(today);
                        next_panel = Some(Panel::CheckClock);
                    }

                    ui.add_space(5.0);

                    let pending = app.summary.as_ref().map(|s| s.pending_leave_requests).unwrap_or(0);
                    if ui.button(format!("Review Leave ({pending})")).clicked() {
                        next_panel = Some(Panel::Leave);
                    }

                    ui.add_space(5.0);

                    if ui.button("Refresh").clicked() {
                        app.load_summary();
                    }
                });
        });

        ui.add_space(20.0);

        ui.vertical(|ui| {
            ui.set_width(column_width);

            egui::Frame::new()
                .fill(ui.style().visuals.extreme_bg_color)
                .inner_margin(Margin::same(15))
                .corner_radius(CornerRadius::same(8))
                .show(ui, |ui| {
                    ui.set_min_width(column_width - 30.0);

                    ui.label(RichText::new("Recent Activity").strong());
                    ui.add_space(10.0);

                    ScrollArea::vertical().max_height(150.0).show(ui, |ui| {
                        if app.log_messages.is_empty() {
                            ui.label(RichText::new("No recent activity").weak());
                        } else {
                            for entry in app.log_messages.iter().rev().take(10) {
                                let color = match entry.level {
                                    LogLevel::Info => Color32::GRAY,
                                    LogLevel::Success => colors::SUCCESS,
                                    LogLevel::Warning => colors::WARNING,
                                    LogLevel::Error => colors::ERROR,
                                };

                                ui.horizontal(|ui| {
                                    ui.label(
                                        RichText::new(entry.timestamp.format("%H:%M:%S").to_string())
                                            .small()
                                            .color(Color32::DARK_GRAY),
                                    );
                                    ui.label(RichText::new(&entry.message).color(color));
                                });
                            }
                        }
                    });
                });
        });
    });

    ui.add_space(20.0);

    // Subscription status
    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .inner_margin(Margin::same(15))
        .outer_margin(Margin::symmetric(10, 0))
        .corner_radius(CornerRadius::same(8))
        .show(ui, |ui| {
            ui.label(RichText::new("Subscription").strong());
            ui.add_space(10.0);

            match &app.subscription {
                Some(sub) => {
                    ui.horizontal(|ui| {
                        ui.label("Plan:");
                        ui.label(RichText::new(format!("{} ({})", sub.package_name, sub.cycle.label())).weak());
                    });
                    ui.horizontal(|ui| {
                        ui.label("Seats:");
                        let active = app.summary.as_ref().map(|s| s.active_employees).unwrap_or(0);
                        let color = if active > sub.seats { colors::ERROR } else { colors::SUCCESS };
                        ui.label(RichText::new(format!("{active} of {} used", sub.seats)).color(color));
                    });
                    ui.horizontal(|ui| {
                        ui.label("Renews:");
                        ui.label(RichText::new(format!(
                            "{} ({})",
                            format_date_long(sub.current_period_end),
                            sub.status.label()
                        ))
                        .weak());
                    });
                }
                None => {
                    ui.label(RichText::new("No active subscription").weak());
                    if ui.link("Choose a plan").clicked() {
                        next_panel = Some(Panel::Subscription);
                    }
                }
            }
        });

    next_panel
}
