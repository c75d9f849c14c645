//! Subscription panel: current plan, packages, seat quote and checkout.

use eframe::egui::{self, CornerRadius, Margin, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{ARROWS_CLOCKWISE, CHECK_CIRCLE, CREDIT_CARD};

use super::app::App;
use super::components::{back_button, colors, panel_header, primary_button_with_icon, styled_button_with_icon};
use crate::billing::{self, Quote};
use crate::format::{format_date_long, format_rupiah};
use crate::models::{BillingCycle, CheckoutRequest, Package};

/// Show the subscription panel.
///
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);

    panel_header(ui, "Subscription");

    ui.horizontal(|ui| {
        if styled_button_with_icon(ui, ARROWS_CLOCKWISE, "Refresh").clicked() {
            app.load_packages();
            app.load_summary();
        }
    });

    ui.add_space(10.0);

    show_current(app, ui);

    ui.add_space(20.0);

    if app.packages.is_empty() {
        ui.label(RichText::new(if app.is_loading() { "Loading packages..." } else { "No packages available" }).weak());
        return go_back;
    }

    ui.label(RichText::new("Packages").size(18.0).strong());
    ui.add_space(10.0);

    ScrollArea::horizontal().id_salt("package_scroll").show(ui, |ui| {
        ui.horizontal_top(|ui| {
            for package in app.packages.clone() {
                show_package_card(app, ui, &package);
                ui.add_space(15.0);
            }
        });
    });

    ui.add_space(20.0);

    show_checkout(app, ui);

    go_back
}

fn show_current(app: &App, ui: &mut Ui) {
    ui.group(|ui| {
        ui.set_min_width(400.0);
        ui.heading("Current Plan");
        ui.add_space(5.0);

        let Some(sub) = &app.subscription else {
            ui.label(RichText::new("No active subscription. Choose a package below.").weak());
            return;
        };

        let active = app.summary.as_ref().map(|s| s.active_employees).unwrap_or(0);
        egui::Grid::new("current_plan_grid")
            .num_columns(2)
            .spacing([20.0, 6.0])
            .show(ui, |ui| {
                ui.label("Package:");
                ui.label(RichText::new(&sub.package_name).strong());
                ui.end_row();

                ui.label("Billing:");
                ui.label(sub.cycle.label());
                ui.end_row();

                ui.label("Seats:");
                let color = if active > sub.seats { colors::ERROR } else { colors::SUCCESS };
                ui.colored_label(color, format!("{active} active of {} seats", sub.seats));
                ui.end_row();

                ui.label("Status:");
                ui.label(sub.status.label());
                ui.end_row();

                ui.label("Current period ends:");
                ui.label(format_date_long(sub.current_period_end));
                ui.end_row();
            });
    });
}

fn show_package_card(app: &mut App, ui: &mut Ui, package: &Package) {
    let selected = app.seat_form.package_id == Some(package.id);
    let current = app.subscription.as_ref().is_some_and(|s| s.package_id == package.id);
    let stroke = if selected {
        egui::Stroke::new(2.0, colors::PRIMARY)
    } else {
        egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color)
    };

    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .stroke(stroke)
        .inner_margin(Margin::same(15))
        .corner_radius(CornerRadius::same(8))
        .show(ui, |ui| {
            ui.set_width(240.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new(&package.name).size(18.0).strong());
                if current {
                    ui.label(RichText::new("Current").small().color(colors::SUCCESS));
                }
            });
            if let Some(description) = &package.description {
                ui.label(RichText::new(description).weak());
            }

            ui.add_space(8.0);
            for feature in &package.features {
                ui.label(format!("{CHECK_CIRCLE} {feature}"));
            }

            ui.add_space(8.0);
            ui.separator();
            for tier in &package.tiers {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(tier.label()).small());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(format!("{} /user/mo", format_rupiah(tier.price_per_user))).small());
                    });
                });
            }

            if let Err(e) = billing::validate_tiers(&package.tiers) {
                ui.colored_label(colors::WARNING, e.to_string());
            }

            ui.add_space(8.0);
            if ui.selectable_label(selected, if selected { "Selected" } else { "Select" }).clicked() {
                app.seat_form.package_id = Some(package.id);
                app.seat_form.session = None;
            }
        });
}

/// Quote for the seat form, with seats checked against the active headcount.
pub fn price_preview(
    package: &Package,
    seats: Option<u32>,
    cycle: BillingCycle,
    tax_rate_percent: u32,
    active_employees: u32,
) -> Result<Quote, String> {
    let seats = seats.ok_or("Enter a whole number of seats")?;
    billing::validate_seats(seats, active_employees).map_err(|e| e.to_string())?;
    billing::quote(package, seats, cycle, tax_rate_percent).map_err(|e| e.to_string())
}

fn show_checkout(app: &mut App, ui: &mut Ui) {
    let Some(package) = app
        .seat_form
        .package_id
        .and_then(|id| app.packages.iter().find(|p| p.id == id))
        .cloned()
    else {
        return;
    };
    let active = app.summary.as_ref().map(|s| s.active_employees).unwrap_or(0);
    let tax_rate = app.config.company.tax_rate_percent;

    ui.group(|ui| {
        ui.set_min_width(400.0);
        ui.heading(format!("Checkout: {}", package.name));
        ui.add_space(10.0);

        egui::Grid::new("checkout_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("Seats:");
                ui.horizontal(|ui| {
                    if ui
                        .add(egui::TextEdit::singleline(&mut app.seat_form.seats_input).desired_width(80.0))
                        .changed()
                    {
                        app.seat_form.session = None;
                    }
                    if ui.small_button(format!("Match {active} active")).clicked() {
                        app.seat_form.seats_input = active.max(1).to_string();
                        app.seat_form.session = None;
                    }
                    ui.label(RichText::new(format!("up to {}", billing::max_seats(&package))).weak());
                });
                ui.end_row();

                ui.label("Billing:");
                ui.horizontal(|ui| {
                    for cycle in [BillingCycle::Monthly, BillingCycle::Yearly] {
                        if ui.selectable_value(&mut app.seat_form.cycle, cycle, cycle.label()).changed() {
                            app.seat_form.session = None;
                        }
                    }
                    if app.seat_form.cycle == BillingCycle::Yearly {
                        ui.label(
                            RichText::new(format!("{} months free", billing::YEARLY_FREE_MONTHS))
                                .small()
                                .color(colors::SUCCESS),
                        );
                    }
                });
                ui.end_row();
            });

        ui.add_space(10.0);

        let preview = price_preview(&package, app.seat_form.seats(), app.seat_form.cycle, tax_rate, active);
        match &preview {
            Ok(quote) => {
                egui::Grid::new("quote_grid")
                    .num_columns(2)
                    .spacing([40.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("Tier:");
                        ui.label(format!(
                            "{} at {} /user/mo",
                            quote.tier.label(),
                            format_rupiah(quote.tier.price_per_user)
                        ));
                        ui.end_row();

                        ui.label(format!("Subtotal ({} seats x {} mo):", quote.seats, quote.months));
                        ui.label(format_rupiah(quote.subtotal));
                        ui.end_row();

                        if quote.discount > 0 {
                            ui.label("Discount:");
                            ui.colored_label(colors::SUCCESS, format!("-{}", format_rupiah(quote.discount)));
                            ui.end_row();
                        }

                        ui.label(format!("Tax ({tax_rate}%):"));
                        ui.label(format_rupiah(quote.tax));
                        ui.end_row();

                        ui.label(RichText::new("Total:").strong());
                        ui.label(RichText::new(format_rupiah(quote.total)).strong());
                        ui.end_row();

                        ui.label("Per month:");
                        ui.label(RichText::new(format_rupiah(quote.per_month())).weak());
                        ui.end_row();
                    });
            }
            Err(e) => {
                ui.colored_label(colors::ERROR, e);
            }
        }

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if app.seat_form.checking_out {
                ui.spinner();
                ui.label("Creating payment...");
                return;
            }

            let clicked = ui
                .add_enabled_ui(preview.is_ok(), |ui| {
                    primary_button_with_icon(ui, CREDIT_CARD, "Proceed to Payment").clicked()
                })
                .inner;
            if clicked && let Ok(quote) = &preview
            {
                app.log_info(format!(
                    "Checkout {} for {} seats ({})",
                    package.name,
                    quote.seats,
                    format_rupiah(quote.total)
                ));
                app.checkout(CheckoutRequest {
                    package_id: package.id,
                    seats: quote.seats,
                    cycle: app.seat_form.cycle,
                });
            }
        });

        if let Some(session) = &app.seat_form.session {
            ui.add_space(10.0);
            ui.colored_label(
                colors::SUCCESS,
                format!("Order {} created for {}", session.order_id, format_rupiah(session.amount)),
            );
            ui.hyperlink_to("Open payment page", &session.payment_url);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeatTier;

    fn package() -> Package {
        Package {
            id: 1,
            name: "Standard".to_string(),
            description: None,
            features: Vec::new(),
            tiers: vec![
                SeatTier {
                    min_employees: 1,
                    max_employees: 50,
                    price_per_user: 20_000,
                },
                SeatTier {
                    min_employees: 51,
                    max_employees: 200,
                    price_per_user: 15_000,
                },
            ],
        }
    }

    #[test]
    fn test_preview_rejects_too_few_seats() {
        let err = price_preview(&package(), Some(10), BillingCycle::Monthly, 11, 12).unwrap_err();
        assert!(err.contains("cannot cover 12"), "{err}");
        assert!(price_preview(&package(), None, BillingCycle::Monthly, 11, 0).is_err());
    }

    #[test]
    fn test_preview_prices_seats() {
        let quote = price_preview(&package(), Some(60), BillingCycle::Monthly, 11, 55).unwrap();
        assert_eq!(quote.tier.price_per_user, 15_000);
        assert_eq!(quote.subtotal, 900_000);
        assert_eq!(quote.total, 999_000);
    }
}
