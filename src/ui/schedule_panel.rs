//! Work schedule templates, month calendar and employee assignment.

use std::collections::HashMap;

use chrono::{Datelike, Local, NaiveDate};
use eframe::egui::{self, CornerRadius, Margin, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{ARROWS_CLOCKWISE, CALENDAR_BLANK, CARET_LEFT, CARET_RIGHT, PENCIL, PLUS, TRASH, USER_PLUS};

use super::app::{App, AssignForm, DayForm, DeleteTarget, ScheduleForm, weekday_at};
use super::check_clock_panel::parse_location;
use super::components::{
    action_button, apply_pager, back_button, colors, danger_action_button, date_input, pagination_bar, panel_header,
    primary_button_with_icon, sort_header, styled_button, styled_button_with_icon,
};
use crate::format::{format_time, parse_flexible_date, parse_time};
use crate::models::{AssignSchedule, CreateWorkSchedule, ScheduleAssignment, ScheduleDay, TimeWindow, WorkType};
use crate::schedule::{self, AssignmentPlan, active_assignment, plan_assignment};

/// Show the schedule panel.
///
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);

    panel_header(ui, "Work Schedules");

    ui.horizontal(|ui| {
        if primary_button_with_icon(ui, PLUS, "New Schedule").clicked() {
            app.schedule_form = ScheduleForm::create();
        }

        ui.add_space(10.0);

        if styled_button_with_icon(ui, ARROWS_CLOCKWISE, "Refresh").clicked() {
            app.load_schedules();
            app.load_assignments();
        }

        ui.add_space(20.0);

        ui.label("Search:");
        let mut search = app.schedule_query.search.clone();
        if ui
            .add(egui::TextEdit::singleline(&mut search).desired_width(180.0).hint_text("Schedule name..."))
            .changed()
        {
            app.schedule_query.set_search(search);
        }
    });

    ui.add_space(15.0);

    let available = ui.available_width();
    let list_width = (available * 0.45).max(380.0);

    ui.horizontal_top(|ui| {
        ui.vertical(|ui| {
            ui.set_width(list_width);
            show_template_list(app, ui);
        });

        ui.add_space(20.0);

        ui.vertical(|ui| {
            show_calendar(app, ui);
        });
    });

    if app.schedule_form.is_open {
        show_editor_dialog(app, ui.ctx());
    }

    if app.assign_form.is_open {
        show_assign_dialog(app, ui.ctx());
    }

    go_back
}

fn show_template_list(app: &mut App, ui: &mut Ui) {
    if app.schedules.is_empty() {
        ui.label(RichText::new(if app.is_loading() { "Loading..." } else { "No schedules yet" }).weak());
        return;
    }

    let today = Local::now().date_naive();
    let mut headcount: HashMap<i64, usize> = HashMap::new();
    for employee in &app.directory {
        if let Some(assignment) = active_assignment(&app.assignments, employee.id, today) {
            *headcount.entry(assignment.schedule_id).or_default() += 1;
        }
    }

    let view = app.schedule_query.apply(&app.schedules);
    let info = view.info;
    let rows: Vec<_> = view.rows.into_iter().cloned().collect();
    let mut edit = None;
    let mut assign = None;

    ScrollArea::vertical()
        .id_salt("schedule_scroll")
        .max_height(ui.available_height() - 60.0)
        .show(ui, |ui| {
            egui::Grid::new("schedule_grid")
                .num_columns(5)
                .striped(true)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    sort_header(ui, &mut app.schedule_query, "name", "Name");
                    ui.strong("Type");
                    sort_header(ui, &mut app.schedule_query, "days", "Days");
                    ui.strong("Employees");
                    ui.strong("Actions");
                    ui.end_row();

                    for schedule in &rows {
                        let selected = app.calendar.schedule_id == Some(schedule.id);
                        if ui.selectable_label(selected, &schedule.name).clicked() {
                            app.calendar.schedule_id = Some(schedule.id);
                        }
                        ui.label(schedule.work_type.label());
                        ui.label(schedule.working_days_label());
                        ui.label(headcount.get(&schedule.id).copied().unwrap_or(0).to_string());

                        ui.horizontal(|ui| {
                            if action_button(ui, CALENDAR_BLANK, "Show calendar").clicked() {
                                app.calendar.schedule_id = Some(schedule.id);
                            }
                            ui.add_space(4.0);
                            if action_button(ui, PENCIL, "Edit").clicked() {
                                edit = Some(ScheduleForm::edit(schedule));
                            }
                            ui.add_space(4.0);
                            if action_button(ui, USER_PLUS, "Assign employees").clicked() {
                                assign = Some(AssignForm::open(schedule, today));
                            }
                            ui.add_space(4.0);
                            if danger_action_button(ui, TRASH, "Delete").clicked() {
                                app.delete_target = Some(DeleteTarget::Schedule(schedule.id, schedule.name.clone()));
                                app.show_delete_confirm = true;
                            }
                        });
                        ui.end_row();
                    }
                });
        });

    ui.add_space(10.0);
    if let Some(action) = pagination_bar(ui, "schedule_page_size", &info) {
        apply_pager(&mut app.schedule_query, &info, action);
    }

    if let Some(form) = edit {
        app.schedule_form = form;
    }
    if let Some(form) = assign {
        app.assign_form = form;
    }
}

fn show_calendar(app: &mut App, ui: &mut Ui) {
    let Some(schedule) = app
        .calendar
        .schedule_id
        .and_then(|id| app.schedules.iter().find(|s| s.id == id))
        .cloned()
    else {
        ui.label(RichText::new("Select a schedule to see its calendar").weak());
        return;
    };

    ui.horizontal(|ui| {
        if ui.button(CARET_LEFT).on_hover_text("Previous month").clicked() {
            app.calendar.prev_month();
        }
        let title = NaiveDate::from_ymd_opt(app.calendar.year, app.calendar.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default();
        ui.label(RichText::new(title).size(18.0).strong());
        if ui.button(CARET_RIGHT).on_hover_text("Next month").clicked() {
            app.calendar.next_month();
        }
        ui.add_space(10.0);
        ui.label(RichText::new(format!("{} ({})", schedule.name, schedule.work_type.label())).weak());
    });

    ui.add_space(10.0);

    let weeks = match schedule::month_grid(app.calendar.year, app.calendar.month) {
        Ok(weeks) => weeks,
        Err(e) => {
            ui.colored_label(colors::ERROR, e.to_string());
            return;
        }
    };
    let Some(first) = weeks.iter().flatten().flatten().next().copied() else {
        return;
    };
    let Some(last) = weeks.iter().flatten().flatten().last().copied() else {
        return;
    };
    let days = match schedule::flatten(&schedule, first, last) {
        Ok(days) => days,
        Err(e) => {
            ui.colored_label(colors::ERROR, e.to_string());
            return;
        }
    };
    let by_date: HashMap<NaiveDate, _> = days.iter().map(|d| (d.date, d)).collect();
    let today = Local::now().date_naive();
    let cell_width = ((ui.available_width() - 6.0 * 6.0) / 7.0).clamp(70.0, 120.0);

    egui::Grid::new("schedule_calendar")
        .num_columns(7)
        .spacing([6.0, 6.0])
        .show(ui, |ui| {
            for index in 0..7 {
                ui.label(RichText::new(weekday_at(index).to_string()).strong());
            }
            ui.end_row();

            for week in &weeks {
                for slot in week {
                    let Some(date) = slot else {
                        ui.label("");
                        continue;
                    };
                    let detail = by_date.get(date).and_then(|d| d.detail);
                    let fill = if detail.is_some() {
                        colors::SUCCESS.gamma_multiply(0.15)
                    } else {
                        ui.style().visuals.extreme_bg_color
                    };
                    let stroke = if *date == today {
                        egui::Stroke::new(1.5, colors::PRIMARY)
                    } else {
                        egui::Stroke::NONE
                    };

                    egui::Frame::new()
                        .fill(fill)
                        .stroke(stroke)
                        .inner_margin(Margin::same(6))
                        .corner_radius(CornerRadius::same(4))
                        .show(ui, |ui| {
                            ui.set_min_size(egui::vec2(cell_width, 48.0));
                            ui.vertical(|ui| {
                                ui.label(RichText::new(date.day().to_string()).strong());
                                match detail {
                                    Some(day) => {
                                        ui.label(
                                            RichText::new(format!(
                                                "{}-{}",
                                                format_time(day.check_in.start),
                                                format_time(day.check_out.end)
                                            ))
                                            .small(),
                                        );
                                    }
                                    None => {
                                        ui.label(RichText::new("Off").small().weak());
                                    }
                                }
                            });
                        });
                }
                ui.end_row();
            }
        });
}

fn time_input(ui: &mut Ui, value: &mut String) {
    let color = if parse_time(value).is_some() {
        ui.visuals().text_color()
    } else {
        colors::ERROR
    };
    ui.add(
        egui::TextEdit::singleline(value)
            .desired_width(48.0)
            .hint_text("HH:MM")
            .text_color(color),
    );
}

fn show_editor_dialog(app: &mut App, ctx: &egui::Context) {
    let title = if app.schedule_form.is_editing {
        "Edit Schedule"
    } else {
        "New Schedule"
    };

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .default_width(760.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            let form = &mut app.schedule_form;
            ui.add_space(10.0);

            egui::Grid::new("schedule_form_header")
                .num_columns(2)
                .spacing([20.0, 10.0])
                .show(ui, |ui| {
                    ui.label("Name:*");
                    ui.add(egui::TextEdit::singleline(&mut form.name).desired_width(250.0));
                    ui.end_row();

                    ui.label("Work Type:");
                    ui.horizontal(|ui| {
                        for work_type in WorkType::ALL {
                            ui.selectable_value(&mut form.work_type, work_type, work_type.label());
                        }
                    });
                    ui.end_row();
                });

            if form.work_type.requires_location() {
                ui.label(RichText::new("Office and hybrid schedules need a check-in location on every working day.").weak());
            }

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(5.0);

            egui::Grid::new("schedule_form_days")
                .num_columns(6)
                .striped(true)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    ui.strong("Day");
                    ui.strong("Check-in");
                    ui.strong("Break");
                    ui.strong("Check-out");
                    ui.strong("Location (lat, long)");
                    ui.strong("Address");
                    ui.end_row();

                    for (index, day) in form.days.iter_mut().enumerate() {
                        ui.checkbox(&mut day.enabled, weekday_at(index).to_string());

                        ui.add_enabled_ui(day.enabled, |ui| {
                            ui.horizontal(|ui| {
                                time_input(ui, &mut day.check_in_start);
                                ui.label("-");
                                time_input(ui, &mut day.check_in_end);
                            });
                        });
                        ui.add_enabled_ui(day.enabled, |ui| {
                            ui.horizontal(|ui| {
                                ui.checkbox(&mut day.has_break, "");
                                ui.add_enabled_ui(day.has_break, |ui| {
                                    time_input(ui, &mut day.break_start);
                                    ui.label("-");
                                    time_input(ui, &mut day.break_end);
                                });
                            });
                        });
                        ui.add_enabled_ui(day.enabled, |ui| {
                            ui.horizontal(|ui| {
                                time_input(ui, &mut day.check_out_start);
                                ui.label("-");
                                time_input(ui, &mut day.check_out_end);
                            });
                        });
                        ui.add_enabled_ui(day.enabled, |ui| {
                            ui.horizontal(|ui| {
                                ui.add(egui::TextEdit::singleline(&mut day.latitude_input).desired_width(70.0));
                                ui.add(egui::TextEdit::singleline(&mut day.longitude_input).desired_width(70.0));
                            });
                        });
                        ui.add_enabled_ui(day.enabled, |ui| {
                            ui.add(egui::TextEdit::singleline(&mut day.address).desired_width(140.0));
                        });
                        ui.end_row();
                    }
                });

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                if styled_button(ui, "Cancel").clicked() {
                    app.schedule_form.reset();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if primary_button_with_icon(ui, "", "Save").clicked() {
                        match build_schedule(&app.schedule_form) {
                            Ok(data) => {
                                let id = app.schedule_form.id.filter(|_| app.schedule_form.is_editing);
                                app.save_schedule(id, data);
                            }
                            Err(e) => app.error_message = Some(e),
                        }
                    }
                });
            });
        });
}

fn window(label: &str, start: &str, end: &str) -> Result<TimeWindow, String> {
    let start = parse_time(start).ok_or(format!("{label}: invalid start time '{start}'"))?;
    let end = parse_time(end).ok_or(format!("{label}: invalid end time '{end}'"))?;
    Ok(TimeWindow::new(start, end))
}

fn build_day(index: usize, day: &DayForm) -> Result<ScheduleDay, String> {
    let weekday = weekday_at(index);
    let name = weekday.to_string();
    let check_in = window(&format!("{name} check-in"), &day.check_in_start, &day.check_in_end)?;
    let break_window = if day.has_break {
        Some(window(&format!("{name} break"), &day.break_start, &day.break_end)?)
    } else {
        None
    };
    let check_out = window(&format!("{name} check-out"), &day.check_out_start, &day.check_out_end)?;
    let location =
        parse_location(&day.latitude_input, &day.longitude_input, &day.address).map_err(|e| format!("{name}: {e}"))?;

    Ok(ScheduleDay {
        weekday,
        check_in,
        break_window,
        check_out,
        location,
    })
}

/// Turn the editor state into a validated template.
pub fn build_schedule(form: &ScheduleForm) -> Result<CreateWorkSchedule, String> {
    let days = form
        .days
        .iter()
        .enumerate()
        .filter(|(_, day)| day.enabled)
        .map(|(index, day)| build_day(index, day))
        .collect::<Result<Vec<_>, _>>()?;

    let data = CreateWorkSchedule {
        name: form.name.trim().to_string(),
        work_type: form.work_type,
        days,
    };
    schedule::validate_schedule(&data).map_err(|e| e.to_string())?;
    Ok(data)
}

/// Plan every selected employee; `Err` holds the first problem.
pub fn assign_request(
    form: &AssignForm,
    existing: &[ScheduleAssignment],
) -> Result<(AssignSchedule, Vec<AssignmentPlan>), String> {
    let schedule_id = form.schedule_id.ok_or("No schedule selected")?;
    let effective_from = parse_flexible_date(&form.effective_from_input).ok_or("Invalid effective date")?;
    if form.employee_ids.is_empty() {
        return Err("Select at least one employee".to_string());
    }

    let plans = form
        .employee_ids
        .iter()
        .map(|id| plan_assignment(existing, *id, schedule_id, effective_from).map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((
        AssignSchedule {
            schedule_id,
            employee_ids: form.employee_ids.iter().copied().collect(),
            effective_from,
        },
        plans,
    ))
}

fn show_assign_dialog(app: &mut App, ctx: &egui::Context) {
    let mut open = true;
    let today = Local::now().date_naive();

    egui::Window::new(format!("Assign '{}'", app.assign_form.schedule_name))
        .collapsible(false)
        .resizable(false)
        .default_width(520.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            let form = &mut app.assign_form;
            ui.add_space(10.0);

            let effective_from = ui
                .horizontal(|ui| {
                    ui.label("Effective from:*");
                    date_input(ui, &mut form.effective_from_input, 120.0)
                })
                .inner;

            ui.horizontal(|ui| {
                ui.label("Search:");
                ui.add(egui::TextEdit::singleline(&mut form.search).desired_width(200.0));
                if ui.button("Select shown").clicked() {
                    let needle = form.search.trim().to_lowercase();
                    form.employee_ids.extend(
                        app.directory
                            .iter()
                            .filter(|e| e.is_active() && e.full_name().to_lowercase().contains(&needle))
                            .map(|e| e.id),
                    );
                }
                if ui.button("Clear").clicked() {
                    form.employee_ids.clear();
                }
            });

            ui.add_space(5.0);
            ui.label(format!("{} selected", form.employee_ids.len()));
            ui.add_space(5.0);

            let needle = form.search.trim().to_lowercase();
            ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                for employee in app
                    .directory
                    .iter()
                    .filter(|e| e.is_active() && e.full_name().to_lowercase().contains(&needle))
                {
                    let mut checked = form.employee_ids.contains(&employee.id);
                    ui.horizontal(|ui| {
                        if ui
                            .checkbox(&mut checked, format!("{} ({})", employee.full_name(), employee.employee_code))
                            .changed()
                        {
                            if checked {
                                form.employee_ids.insert(employee.id);
                            } else {
                                form.employee_ids.remove(&employee.id);
                            }
                        }

                        let current = active_assignment(&app.assignments, employee.id, today)
                            .and_then(|a| app.schedules.iter().find(|s| s.id == a.schedule_id))
                            .map(|s| s.name.as_str());
                        if let Some(name) = current {
                            ui.label(RichText::new(format!("now: {name}")).small().weak());
                        }

                        if checked
                            && let (Some(schedule_id), Some(from)) = (form.schedule_id, effective_from)
                        {
                            match plan_assignment(&app.assignments, employee.id, schedule_id, from) {
                                Ok(plan) => {
                                    if let Some((_, until)) = plan.close {
                                        ui.label(
                                            RichText::new(format!("current schedule ends {until}"))
                                                .small()
                                                .color(colors::INFO),
                                        );
                                    }
                                }
                                Err(e) => {
                                    ui.colored_label(colors::ERROR, e.to_string());
                                }
                            }
                        }
                    });
                }
            });

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(10.0);

            let request = assign_request(&app.assign_form, &app.assignments);
            ui.horizontal(|ui| {
                if styled_button(ui, "Cancel").clicked() {
                    app.assign_form.reset();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let response = ui.add_enabled(request.is_ok(), egui::Button::new("Assign"));
                    if let Err(e) = &request {
                        response.clone().on_disabled_hover_text(e.as_str());
                    }
                    if response.clicked()
                        && let Ok((data, plans)) = request
                    {
                        let closing = plans.iter().filter(|p| p.close.is_some()).count();
                        app.log_info(format!(
                            "Assigning schedule to {} employees ({closing} current schedules closed)",
                            plans.len()
                        ));
                        app.assign_schedule(data);
                    }
                });
            });
        });

    if !open {
        app.assign_form.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_build_schedule_from_defaults() {
        let form = ScheduleForm {
            name: " Head Office ".to_string(),
            work_type: WorkType::Remote,
            ..ScheduleForm::create()
        };
        let data = build_schedule(&form).unwrap();
        assert_eq!(data.name, "Head Office");
        assert_eq!(data.days.len(), 5);
        assert_eq!(data.days[0].weekday, Weekday::Mon);
        assert_eq!(data.days[4].check_in.end, NaiveTime::from_hms_opt(8, 15, 0).unwrap());
    }

    #[test]
    fn test_build_schedule_reports_bad_time() {
        let mut form = ScheduleForm {
            name: "Shift".to_string(),
            work_type: WorkType::Remote,
            ..ScheduleForm::create()
        };
        form.days[1].check_out_end = "25:00".to_string();
        let err = build_schedule(&form).unwrap_err();
        assert!(err.starts_with("Tue check-out"), "{err}");
    }

    #[test]
    fn test_office_schedule_needs_location() {
        let mut form = ScheduleForm {
            name: "Office".to_string(),
            work_type: WorkType::Office,
            ..ScheduleForm::create()
        };
        assert!(build_schedule(&form).is_err());

        for day in form.days.iter_mut() {
            day.latitude_input = "-6.2".to_string();
            day.longitude_input = "106.8".to_string();
        }
        assert!(build_schedule(&form).is_ok());
    }

    #[test]
    fn test_assign_request_plans_closures() {
        let existing = vec![ScheduleAssignment {
            id: 11,
            employee_id: 1,
            schedule_id: 2,
            effective_from: date(2026, 1, 1),
            effective_until: None,
        }];
        let mut form = AssignForm {
            schedule_id: Some(5),
            effective_from_input: "2026-11-01".to_string(),
            ..Default::default()
        };
        assert!(assign_request(&form, &existing).is_err());

        form.employee_ids.extend([1, 3]);
        let (data, plans) = assign_request(&form, &existing).unwrap();
        assert_eq!(data.employee_ids, vec![1, 3]);
        assert_eq!(plans[0].close, Some((11, date(2026, 10, 31))));
        assert_eq!(plans[1].close, None);

        form.effective_from_input = "2025-12-01".to_string();
        assert!(assign_request(&form, &existing).is_err());
    }
}
