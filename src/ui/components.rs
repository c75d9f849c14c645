//! Shared UI components.

use eframe::egui::{self, Color32, CornerRadius, Margin, Response, RichText, Sense, StrokeKind, Ui};
use egui_phosphor::regular::{CARET_DOUBLE_LEFT, CARET_DOUBLE_RIGHT, CARET_LEFT, CARET_RIGHT};

use crate::config::PAGE_SIZES;
use crate::table::{PageInfo, PageItem, SortDirection, TableQuery, page_items};

/// Render a clickable dashboard card with dynamic size.
///
/// Returns the response which can be checked for `.clicked()`.
pub fn dashboard_card(ui: &mut Ui, title: &str, description: &str, icon: &str, size: egui::Vec2) -> Response {
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());

    if ui.is_rect_visible(rect) {
        let visuals = ui.style().interact(&response);

        // 200 is the reference width
        let scale = size.x / 200.0;

        ui.painter().rect_filled(rect, 8.0, visuals.bg_fill);
        ui.painter()
            .rect_stroke(rect, 8.0, visuals.bg_stroke, StrokeKind::Outside);

        let icon_pos = egui::pos2(rect.center().x, rect.top() + size.y * 0.23);
        ui.painter().text(
            icon_pos,
            egui::Align2::CENTER_CENTER,
            icon,
            egui::FontId::proportional(36.0 * scale),
            visuals.text_color(),
        );

        let title_pos = egui::pos2(rect.center().x, rect.center().y + size.y * 0.07);
        ui.painter().text(
            title_pos,
            egui::Align2::CENTER_CENTER,
            title,
            egui::FontId::proportional(18.0 * scale),
            visuals.text_color(),
        );

        let desc_pos = egui::pos2(rect.center().x, rect.bottom() - size.y * 0.17);
        ui.painter().text(
            desc_pos,
            egui::Align2::CENTER_CENTER,
            description,
            egui::FontId::proportional(12.0 * scale),
            ui.visuals().weak_text_color(),
        );
    }

    response
}

/// Render a stat card with title, value, and subtitle.
pub fn stat_card(ui: &mut Ui, title: &str, value: &str, subtitle: &str) {
    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .inner_margin(Margin::same(15))
        .outer_margin(Margin::same(5))
        .corner_radius(CornerRadius::same(8))
        .show(ui, |ui| {
            ui.set_min_width(150.0);

            ui.vertical(|ui| {
                ui.label(RichText::new(title).small());
                ui.label(RichText::new(value).heading().strong());
                ui.label(RichText::new(subtitle).small().weak());
            });
        });
}

/// Status indicator colors.
pub mod colors {
    use super::Color32;

    pub const SUCCESS: Color32 = Color32::from_rgb(100, 200, 100);
    pub const ERROR: Color32 = Color32::from_rgb(255, 100, 100);
    pub const WARNING: Color32 = Color32::from_rgb(255, 200, 100);
    pub const NEUTRAL: Color32 = Color32::from_rgb(150, 150, 150);
    pub const INFO: Color32 = Color32::from_rgb(100, 150, 230);
    pub const PRIMARY: Color32 = Color32::from_rgb(0x44, 0x72, 0xC4);
}

/// Render a back button that returns true when clicked.
pub fn back_button(ui: &mut Ui) -> bool {
    ui.button(RichText::new("< Back to Dashboard").size(14.0)).clicked()
}

/// Render a panel header with title.
pub fn panel_header(ui: &mut Ui, title: &str) {
    ui.heading(RichText::new(title).size(24.0));
    ui.add_space(10.0);
    ui.separator();
    ui.add_space(20.0);
}

fn icon_text(icon: &str, label: &str) -> String {
    if icon.is_empty() {
        label.to_string()
    } else {
        format!("{icon} {label}")
    }
}

/// Standard toolbar button.
pub fn styled_button(ui: &mut Ui, label: &str) -> Response {
    ui.add(egui::Button::new(RichText::new(label).size(14.0)).min_size(egui::vec2(80.0, 28.0)))
}

pub fn styled_button_with_icon(ui: &mut Ui, icon: &str, label: &str) -> Response {
    styled_button(ui, &icon_text(icon, label))
}

/// Filled button for the main action of a panel or dialog.
pub fn primary_button_with_icon(ui: &mut Ui, icon: &str, label: &str) -> Response {
    ui.add(
        egui::Button::new(RichText::new(icon_text(icon, label)).size(14.0).color(Color32::WHITE))
            .fill(colors::PRIMARY)
            .min_size(egui::vec2(80.0, 28.0)),
    )
}

/// Small icon button used inside table rows.
pub fn action_button(ui: &mut Ui, icon: &str, tooltip: &str) -> Response {
    ui.add(egui::Button::new(RichText::new(icon).size(14.0)).small())
        .on_hover_text(tooltip)
}

pub fn danger_action_button(ui: &mut Ui, icon: &str, tooltip: &str) -> Response {
    ui.add(egui::Button::new(RichText::new(icon).size(14.0).color(colors::ERROR)).small())
        .on_hover_text(tooltip)
}

/// Rounded colored label, e.g. an approval status.
pub fn status_badge(ui: &mut Ui, text: &str, color: Color32) {
    egui::Frame::new()
        .fill(color.gamma_multiply(0.2))
        .inner_margin(Margin::symmetric(8, 2))
        .corner_radius(CornerRadius::same(10))
        .show(ui, |ui| {
            ui.label(RichText::new(text).small().color(color));
        });
}

/// Column header that toggles sorting; returns true when the sort changed.
pub fn sort_header(ui: &mut Ui, query: &mut TableQuery, column: &str, label: &str) -> bool {
    let arrow = match &query.sort {
        Some(spec) if spec.column == column => match spec.direction {
            SortDirection::Asc => " ^",
            SortDirection::Desc => " v",
        },
        _ => "",
    };

    let clicked = ui
        .add(egui::Label::new(RichText::new(format!("{label}{arrow}")).strong()).sense(Sense::click()))
        .on_hover_text("Sort")
        .clicked();
    if clicked {
        query.toggle_sort(column);
    }
    clicked
}

/// Navigation requested from a pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerAction {
    /// 0-based page index.
    Go(usize),
    PageSize(usize),
}

/// "Showing x-y of n", page size picker and numbered page buttons.
pub fn pagination_bar(ui: &mut Ui, id_salt: &str, info: &PageInfo) -> Option<PagerAction> {
    let mut action = None;
    let last = info.page_count() - 1;

    ui.horizontal(|ui| {
        ui.label(info.summary());

        ui.add_space(20.0);
        ui.label("Rows:");
        egui::ComboBox::from_id_salt(id_salt)
            .width(60.0)
            .selected_text(info.page_size.to_string())
            .show_ui(ui, |ui| {
                for size in PAGE_SIZES {
                    if ui.selectable_label(info.page_size == size, size.to_string()).clicked() {
                        action = Some(PagerAction::PageSize(size));
                    }
                }
            });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            // Right-to-left, so buttons are added last to first.
            if ui
                .add_enabled(info.has_next(), egui::Button::new(CARET_DOUBLE_RIGHT))
                .on_hover_text("Last page")
                .clicked()
            {
                action = Some(PagerAction::Go(last));
            }
            if ui
                .add_enabled(info.has_next(), egui::Button::new(CARET_RIGHT))
                .on_hover_text("Next page")
                .clicked()
            {
                action = Some(PagerAction::Go(info.page + 1));
            }

            for item in page_items(info.page, info.page_count(), 1).into_iter().rev() {
                match item {
                    PageItem::Page(page) => {
                        if ui
                            .selectable_label(page == info.page, (page + 1).to_string())
                            .clicked()
                            && page != info.page
                        {
                            action = Some(PagerAction::Go(page));
                        }
                    }
                    PageItem::Ellipsis => {
                        ui.label("...");
                    }
                }
            }

            if ui
                .add_enabled(info.has_prev(), egui::Button::new(CARET_LEFT))
                .on_hover_text("Previous page")
                .clicked()
            {
                action = Some(PagerAction::Go(info.page - 1));
            }
            if ui
                .add_enabled(info.has_prev(), egui::Button::new(CARET_DOUBLE_LEFT))
                .on_hover_text("First page")
                .clicked()
            {
                action = Some(PagerAction::Go(0));
            }
        });
    });

    action
}

/// Apply a pager action to a query; returns true when a reload is needed.
pub fn apply_pager(query: &mut TableQuery, info: &PageInfo, action: PagerAction) -> bool {
    let before = (query.page, query.page_size);
    match action {
        PagerAction::Go(page) => query.go_to(page, info),
        PagerAction::PageSize(size) => query.set_page_size(size),
    }
    before != (query.page, query.page_size)
}

/// Date text input that turns red when it does not parse.
///
/// Returns the parsed date, `None` when empty or invalid.
pub fn date_input(ui: &mut Ui, input: &mut String, width: f32) -> Option<chrono::NaiveDate> {
    let parsed = crate::format::parse_flexible_date(input);
    let is_valid = input.trim().is_empty() || parsed.is_some();
    let text_color = if is_valid {
        ui.visuals().text_color()
    } else {
        colors::ERROR
    };

    ui.add(
        egui::TextEdit::singleline(input)
            .desired_width(width)
            .hint_text("YYYY-MM-DD")
            .text_color(text_color),
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_pager_detects_changes() {
        let mut query = TableQuery::new(10);
        let info = PageInfo {
            page: 0,
            page_size: 10,
            total_rows: 35,
        };

        assert!(apply_pager(&mut query, &info, PagerAction::Go(3)));
        assert_eq!(query.page, 3);
        assert!(!apply_pager(&mut query, &info, PagerAction::Go(9)));

        // Row 31 stays visible on the second page of 20.
        assert!(apply_pager(&mut query, &info, PagerAction::PageSize(20)));
        assert_eq!((query.page, query.page_size), (1, 20));
    }
}
