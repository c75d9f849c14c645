//! Check-clock panel: attendance entries, review and manual entry.

use chrono::Local;
use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{ARROWS_CLOCKWISE, CHECK, FILE_XLS, PLUS, X};

use super::app::{App, CheckClockForm, ReviewForm, ReviewKind};
use super::components::{
    action_button, apply_pager, back_button, colors, danger_action_button, date_input, pagination_bar, panel_header,
    primary_button_with_icon, sort_header, status_badge, styled_button, styled_button_with_icon,
};
use crate::format::{format_minutes, format_time_opt, parse_flexible_date, parse_time};
use crate::models::{ApprovalStatus, CheckClockType, CreateCheckClock, Employee, Location};
use crate::schedule::{DayStatus, evaluate_for};

pub fn approval_color(status: ApprovalStatus) -> egui::Color32 {
    match status {
        ApprovalStatus::Pending => colors::WARNING,
        ApprovalStatus::Approved => colors::SUCCESS,
        ApprovalStatus::Rejected => colors::ERROR,
    }
}

/// Show the check-clock panel.
///
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);

    panel_header(ui, "Check Clock");

    ui.horizontal(|ui| {
        if primary_button_with_icon(ui, PLUS, "Add Entry").clicked() {
            app.check_clock_form = CheckClockForm::create(Local::now().date_naive());
        }

        ui.add_space(10.0);

        if styled_button_with_icon(ui, ARROWS_CLOCKWISE, "Refresh").clicked() {
            app.load_check_clocks();
        }

        ui.add_space(10.0);

        if styled_button_with_icon(ui, FILE_XLS, "Export to Excel").clicked() {
            app.export_check_clocks();
        }
    });

    ui.add_space(10.0);

    let mut reload = false;
    ui.horizontal(|ui| {
        ui.label("Type:");
        let selected = app.check_clock_query.filter("check_type").map(str::to_string);
        egui::ComboBox::from_id_salt("cc_type_filter")
            .width(130.0)
            .selected_text(
                CheckClockType::ALL
                    .iter()
                    .find(|t| selected.as_deref() == Some(t.key()))
                    .map(|t| t.label())
                    .unwrap_or("All"),
            )
            .show_ui(ui, |ui| {
                if ui.selectable_label(selected.is_none(), "All").clicked() {
                    app.check_clock_query.set_filter("check_type", None);
                    reload = true;
                }
                for check_type in CheckClockType::ALL {
                    if ui
                        .selectable_label(selected.as_deref() == Some(check_type.key()), check_type.label())
                        .clicked()
                    {
                        app.check_clock_query.set_filter("check_type", Some(check_type.key()));
                        reload = true;
                    }
                }
            });

        ui.add_space(20.0);

        ui.label("Status:");
        let current = app.check_clock_query.filter("approval").map(str::to_string);
        if ui.selectable_label(current.is_none(), "All").clicked() {
            app.check_clock_query.set_filter("approval", None);
            reload = true;
        }
        for status in ApprovalStatus::ALL {
            if ui
                .selectable_label(current.as_deref() == Some(status.key()), status.label())
                .clicked()
            {
                app.check_clock_query.set_filter("approval", Some(status.key()));
                reload = true;
            }
        }

        ui.add_space(20.0);

        ui.label("Date:");
        let before = app.check_clock_query.filter("date").map(str::to_string);
        let parsed = date_input(ui, &mut app.check_clock_date_input, 100.0);
        let wanted = if app.check_clock_date_input.trim().is_empty() {
            None
        } else {
            parsed.map(|d| d.to_string())
        };
        // Only settle on a filter once the text parses or is cleared.
        if (app.check_clock_date_input.trim().is_empty() || parsed.is_some()) && wanted != before {
            app.check_clock_query.set_filter("date", wanted.as_deref());
            reload = true;
        }

        if app.check_clock_query.has_filters() {
            ui.add_space(10.0);
            if styled_button(ui, "Clear").clicked() {
                app.check_clock_query.clear_filters();
                app.check_clock_date_input.clear();
                reload = true;
            }
        }
    });

    ui.add_space(15.0);

    if show_table(app, ui) {
        reload = true;
    }

    ui.add_space(10.0);
    let info = app.check_clock_page;
    if let Some(action) = pagination_bar(ui, "cc_page_size", &info)
        && apply_pager(&mut app.check_clock_query, &info, action)
    {
        reload = true;
    }

    if reload {
        app.load_check_clocks();
    }

    if app.check_clock_form.is_open {
        show_form_dialog(app, ui.ctx());
    }

    go_back
}

fn show_table(app: &mut App, ui: &mut Ui) -> bool {
    let mut sort_changed = false;

    if app.check_clocks.is_empty() {
        ui.label(RichText::new(if app.is_loading() { "Loading..." } else { "No entries found" }).weak());
        return false;
    }

    let mut review = None;

    ScrollArea::vertical()
        .id_salt("cc_scroll")
        .max_height(ui.available_height() - 50.0)
        .show(ui, |ui| {
            egui::Grid::new("cc_grid")
                .num_columns(10)
                .striped(true)
                .min_col_width(60.0)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    sort_changed |= sort_header(ui, &mut app.check_clock_query, "date", "Date");
                    sort_changed |= sort_header(ui, &mut app.check_clock_query, "employee_name", "Employee");
                    ui.strong("Type");
                    sort_changed |= sort_header(ui, &mut app.check_clock_query, "clock_in", "In");
                    sort_changed |= sort_header(ui, &mut app.check_clock_query, "clock_out", "Out");
                    sort_changed |= sort_header(ui, &mut app.check_clock_query, "work_minutes", "Hours");
                    ui.strong("Punctuality");
                    ui.strong("Location");
                    ui.strong("Status");
                    ui.strong("Review");
                    ui.end_row();

                    for record in &app.check_clocks {
                        ui.label(record.date.to_string());
                        ui.vertical(|ui| {
                            ui.label(&record.employee_name);
                            if let Some(position) = &record.position {
                                ui.label(RichText::new(position).small().weak());
                            }
                        });
                        ui.label(record.check_type.label());
                        ui.label(format_time_opt(record.clock_in));
                        ui.label(format_time_opt(record.clock_out));
                        ui.label(record.work_minutes().map(format_minutes).unwrap_or_else(|| "-".to_string()));

                        let punctuality = if record.check_type.has_times() {
                            evaluate_for(
                                &app.schedules,
                                &app.assignments,
                                record.employee_id,
                                record.date,
                                record.clock_in,
                                record.clock_out,
                            )
                        } else {
                            None
                        };
                        match punctuality {
                            Some(eval) if eval.status == DayStatus::Late => {
                                ui.colored_label(colors::WARNING, format!("Late {}", format_minutes(eval.late_minutes)));
                            }
                            Some(eval) => {
                                ui.label(eval.status.label());
                            }
                            None => {
                                ui.label(RichText::new("-").weak());
                            }
                        }

                        let location = record.location.as_ref().map(|l| l.display()).unwrap_or_else(|| "-".to_string());
                        let response = ui.label(&location);
                        if let Some(note) = &record.note {
                            response.on_hover_text(note);
                        }

                        status_badge(ui, record.approval.label(), approval_color(record.approval));

                        ui.horizontal(|ui| {
                            if record.approval.is_final() {
                                ui.label(RichText::new("-").weak());
                                return;
                            }
                            let subject = format!("{} on {}", record.employee_name, record.date);
                            if action_button(ui, CHECK, "Approve").clicked() {
                                review = Some(ReviewForm::open(ReviewKind::CheckClock, record.id, subject.clone(), true));
                            }
                            ui.add_space(4.0);
                            if danger_action_button(ui, X, "Reject").clicked() {
                                review = Some(ReviewForm::open(ReviewKind::CheckClock, record.id, subject, false));
                            }
                        });

                        ui.end_row();
                    }
                });
        });

    if let Some(form) = review {
        app.review_form = form;
    }

    sort_changed
}

fn employee_matches(employee: &Employee, needle: &str) -> bool {
    needle.is_empty()
        || employee.full_name().to_lowercase().contains(needle)
        || employee.employee_code.to_lowercase().contains(needle)
}

fn show_form_dialog(app: &mut App, ctx: &egui::Context) {
    egui::Window::new("Add Check-Clock Entry")
        .collapsible(false)
        .resizable(false)
        .default_width(440.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(10.0);

            let form = &mut app.check_clock_form;
            egui::Grid::new("cc_form_grid")
                .num_columns(2)
                .spacing([20.0, 10.0])
                .show(ui, |ui| {
                    ui.label("Employee:*");
                    ui.vertical(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut form.employee_search)
                                .desired_width(250.0)
                                .hint_text("Type to filter..."),
                        );
                        let needle = form.employee_search.trim().to_lowercase();
                        let selected = form
                            .employee_id
                            .and_then(|id| app.directory.iter().find(|e| e.id == id))
                            .map(|e| e.full_name())
                            .unwrap_or_else(|| "Select employee...".to_string());
                        egui::ComboBox::from_id_salt("cc_form_employee")
                            .width(250.0)
                            .selected_text(selected)
                            .show_ui(ui, |ui| {
                                for employee in app
                                    .directory
                                    .iter()
                                    .filter(|e| e.is_active() && employee_matches(e, &needle))
                                    .take(50)
                                {
                                    ui.selectable_value(
                                        &mut form.employee_id,
                                        Some(employee.id),
                                        format!("{} ({})", employee.full_name(), employee.employee_code),
                                    );
                                }
                            });
                    });
                    ui.end_row();

                    ui.label("Date:*");
                    date_input(ui, &mut form.date_input, 120.0);
                    ui.end_row();

                    ui.label("Type:");
                    egui::ComboBox::from_id_salt("cc_form_type")
                        .width(150.0)
                        .selected_text(form.check_type.label())
                        .show_ui(ui, |ui| {
                            for check_type in CheckClockType::ALL {
                                ui.selectable_value(&mut form.check_type, check_type, check_type.label());
                            }
                        });
                    ui.end_row();

                    if form.check_type.has_times() {
                        ui.label("Clock In:*");
                        ui.add(egui::TextEdit::singleline(&mut form.clock_in_input).desired_width(80.0).hint_text("HH:MM"));
                        ui.end_row();

                        ui.label("Clock Out:");
                        ui.add(
                            egui::TextEdit::singleline(&mut form.clock_out_input)
                                .desired_width(80.0)
                                .hint_text("HH:MM"),
                        );
                        ui.end_row();

                        ui.label("Latitude:");
                        ui.add(egui::TextEdit::singleline(&mut form.latitude_input).desired_width(120.0));
                        ui.end_row();

                        ui.label("Longitude:");
                        ui.add(egui::TextEdit::singleline(&mut form.longitude_input).desired_width(120.0));
                        ui.end_row();

                        ui.label("Address:");
                        ui.add(egui::TextEdit::singleline(&mut form.address).desired_width(250.0));
                        ui.end_row();
                    }

                    ui.label("Note:");
                    ui.add(egui::TextEdit::multiline(&mut form.note).desired_width(250.0).desired_rows(2));
                    ui.end_row();
                });

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                if styled_button(ui, "Cancel").clicked() {
                    app.check_clock_form.reset();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if primary_button_with_icon(ui, "", "Save").clicked() {
                        match build_check_clock(&app.check_clock_form) {
                            Ok(entry) => app.create_check_clock(entry),
                            Err(e) => app.error_message = Some(e),
                        }
                    }
                });
            });
        });
}

/// Optional coordinates; both or neither must be given.
pub fn parse_location(latitude: &str, longitude: &str, address: &str) -> Result<Option<Location>, String> {
    let (latitude, longitude) = (latitude.trim(), longitude.trim());
    if latitude.is_empty() && longitude.is_empty() {
        return Ok(None);
    }

    let lat: f64 = latitude.parse().map_err(|_| format!("Invalid latitude: '{latitude}'"))?;
    let lon: f64 = longitude.parse().map_err(|_| format!("Invalid longitude: '{longitude}'"))?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err("Latitude must be between -90 and 90".to_string());
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err("Longitude must be between -180 and 180".to_string());
    }

    let address = address.trim();
    Ok(Some(Location {
        latitude: lat,
        longitude: lon,
        address: (!address.is_empty()).then(|| address.to_string()),
    }))
}

pub fn build_check_clock(form: &CheckClockForm) -> Result<CreateCheckClock, String> {
    let employee_id = form.employee_id.ok_or("Select an employee")?;
    let date = parse_flexible_date(&form.date_input).ok_or("Invalid date")?;

    let (clock_in, clock_out, location) = if form.check_type.has_times() {
        let clock_in = match form.clock_in_input.trim() {
            "" => None,
            text => Some(parse_time(text).ok_or(format!("Invalid clock-in time: '{text}'"))?),
        };
        let clock_out = match form.clock_out_input.trim() {
            "" => None,
            text => Some(parse_time(text).ok_or(format!("Invalid clock-out time: '{text}'"))?),
        };
        let location = parse_location(&form.latitude_input, &form.longitude_input, &form.address)?;
        (clock_in, clock_out, location)
    } else {
        (None, None, None)
    };

    let note = form.note.trim();
    let entry = CreateCheckClock {
        employee_id,
        date,
        check_type: form.check_type,
        clock_in,
        clock_out,
        location,
        note: (!note.is_empty()).then(|| note.to_string()),
    };
    entry.validate().map_err(|e| e.to_string())?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn form() -> CheckClockForm {
        CheckClockForm {
            employee_id: Some(7),
            ..CheckClockForm::create(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
        }
    }

    #[test]
    fn test_build_attendance_entry() {
        let entry = build_check_clock(&form()).unwrap();
        assert_eq!(entry.employee_id, 7);
        assert_eq!(entry.clock_in, NaiveTime::from_hms_opt(8, 0, 0));
        assert_eq!(entry.location, None);
    }

    #[test]
    fn test_leave_entries_drop_times() {
        let form = CheckClockForm {
            check_type: CheckClockType::SickLeave,
            note: " flu ".to_string(),
            ..form()
        };
        let entry = build_check_clock(&form).unwrap();
        assert_eq!(entry.clock_in, None);
        assert_eq!(entry.note.as_deref(), Some("flu"));
    }

    #[test]
    fn test_build_requires_employee() {
        let form = CheckClockForm {
            employee_id: None,
            ..form()
        };
        assert_eq!(build_check_clock(&form).unwrap_err(), "Select an employee");
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(parse_location("", " ", "ignored").unwrap(), None);
        let loc = parse_location("-6.2", "106.8", " HQ ").unwrap().unwrap();
        assert_eq!(loc.address.as_deref(), Some("HQ"));
        assert!(parse_location("-6.2", "", "").is_err());
        assert!(parse_location("95", "106.8", "").is_err());
    }
}
