//! Leave request review panel.

use eframe::egui::{self, Key, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{ARROWS_CLOCKWISE, CHECK, MAGNIFYING_GLASS, PAPERCLIP, X};

use super::app::{App, ReviewForm, ReviewKind};
use super::check_clock_panel::approval_color;
use super::components::{
    action_button, apply_pager, back_button, danger_action_button, pagination_bar, panel_header, sort_header,
    status_badge, styled_button_with_icon,
};
use crate::format::relative_range_label;
use crate::models::ApprovalStatus;

/// Show the leave panel.
///
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);

    panel_header(ui, "Leave Requests");

    ui.horizontal(|ui| {
        for status in ApprovalStatus::ALL {
            let label = match (status, &app.summary) {
                (ApprovalStatus::Pending, Some(summary)) => {
                    format!("{} ({})", status.label(), summary.pending_leave_requests)
                }
                _ => status.label().to_string(),
            };
            if ui
                .selectable_label(app.leave_tab == status, RichText::new(label).size(15.0))
                .clicked()
                && app.leave_tab != status
            {
                app.set_leave_tab(status);
            }
            ui.add_space(10.0);
        }
    });

    ui.add_space(10.0);

    let mut reload = false;
    ui.horizontal(|ui| {
        ui.label("Search:");
        let mut search = app.leave_query.search.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut search)
                .desired_width(220.0)
                .hint_text("Employee or reason..."),
        );
        if response.changed() {
            app.leave_query.set_search(search);
        }
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
        if submitted || styled_button_with_icon(ui, MAGNIFYING_GLASS, "Search").clicked() {
            reload = true;
        }

        ui.add_space(10.0);

        if styled_button_with_icon(ui, ARROWS_CLOCKWISE, "Refresh").clicked() {
            reload = true;
        }
    });

    ui.add_space(15.0);

    if show_table(app, ui) {
        reload = true;
    }

    ui.add_space(10.0);
    let info = app.leave_page;
    if let Some(action) = pagination_bar(ui, "leave_page_size", &info)
        && apply_pager(&mut app.leave_query, &info, action)
    {
        reload = true;
    }

    if reload {
        app.load_leave();
    }

    go_back
}

fn show_table(app: &mut App, ui: &mut Ui) -> bool {
    if app.leave_requests.is_empty() {
        let text = if app.is_loading() {
            "Loading...".to_string()
        } else {
            format!("No {} leave requests", app.leave_tab.label().to_lowercase())
        };
        ui.label(RichText::new(text).weak());
        return false;
    }

    let mut sort_changed = false;
    let mut review = None;

    ScrollArea::vertical()
        .id_salt("leave_scroll")
        .max_height(ui.available_height() - 50.0)
        .show(ui, |ui| {
            egui::Grid::new("leave_grid")
                .num_columns(8)
                .striped(true)
                .min_col_width(60.0)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    sort_changed |= sort_header(ui, &mut app.leave_query, "employee_name", "Employee");
                    ui.strong("Type");
                    sort_changed |= sort_header(ui, &mut app.leave_query, "start_date", "Dates");
                    sort_changed |= sort_header(ui, &mut app.leave_query, "days", "Days");
                    ui.strong("Reason");
                    sort_changed |= sort_header(ui, &mut app.leave_query, "created_at", "Submitted");
                    ui.strong("Status");
                    ui.strong("Review");
                    ui.end_row();

                    for request in &app.leave_requests {
                        ui.label(&request.employee_name);
                        ui.label(request.leave_type.label());
                        ui.label(relative_range_label(request.start_date, request.end_date));
                        ui.label(request.days().to_string());

                        ui.horizontal(|ui| {
                            let reason = request.reason.as_deref().unwrap_or("-");
                            let short: String = reason.chars().take(40).collect();
                            let truncated = short.len() < reason.len();
                            let response = ui.label(if truncated { format!("{short}...") } else { short });
                            if truncated {
                                response.on_hover_text(reason);
                            }
                            if let Some(url) = &request.attachment_url {
                                ui.hyperlink_to(PAPERCLIP, url).on_hover_text("Open attachment");
                            }
                        });

                        ui.label(request.created_at.format("%Y-%m-%d").to_string());

                        let badge = status_badge_text(request.status, request.review_note.as_deref());
                        status_badge(ui, &badge, approval_color(request.status));

                        ui.horizontal(|ui| {
                            if !request.is_pending() {
                                ui.label(RichText::new("-").weak());
                                return;
                            }
                            let subject = format!(
                                "{} - {} leave, {} day(s)",
                                request.employee_name,
                                request.leave_type.label(),
                                request.days()
                            );
                            if action_button(ui, CHECK, "Approve").clicked() {
                                review = Some(ReviewForm::open(ReviewKind::Leave, request.id, subject.clone(), true));
                            }
                            ui.add_space(4.0);
                            if danger_action_button(ui, X, "Reject").clicked() {
                                review = Some(ReviewForm::open(ReviewKind::Leave, request.id, subject, false));
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

fn status_badge_text(status: ApprovalStatus, note: Option<&str>) -> String {
    match note {
        Some(note) if status.is_final() && !note.trim().is_empty() => format!("{}: {}", status.label(), note.trim()),
        _ => status.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_badge_text_shows_review_note() {
        assert_eq!(status_badge_text(ApprovalStatus::Pending, Some("ignored")), "Pending");
        assert_eq!(
            status_badge_text(ApprovalStatus::Rejected, Some(" overlaps audit ")),
            "Rejected: overlaps audit"
        );
        assert_eq!(status_badge_text(ApprovalStatus::Approved, None), "Approved");
    }
}
