//! Employee management panel: paginated table, CRUD, bulk import and export.

use chrono::{Local, NaiveDate};
use eframe::egui::{self, Key, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{
    ARROWS_CLOCKWISE, DOWNLOAD_SIMPLE, FILE_XLS, FOLDER_OPEN, MAGNIFYING_GLASS, PENCIL, PLUS, TRASH, UPLOAD_SIMPLE,
};

use super::app::{App, DeleteTarget, EmployeeForm};
use super::components::{
    action_button, apply_pager, back_button, colors, danger_action_button, date_input, pagination_bar, panel_header,
    primary_button_with_icon, sort_header, status_badge, styled_button, styled_button_with_icon,
};
use crate::export;
use crate::import::{COLUMNS, ExistingKeys, RawSheet, validate_sheet};
use crate::models::{ContractType, CreateEmployee, Employee, EmployeeStatus, Gender, UpdateEmployee};

/// Show the employee panel.
///
/// Returns `true` if the back button was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let go_back = back_button(ui);

    panel_header(ui, "Employees");

    // Toolbar row 1: Action buttons
    ui.horizontal(|ui| {
        if primary_button_with_icon(ui, PLUS, "Add Employee").clicked() {
            app.employee_form = EmployeeForm::create(Local::now().date_naive());
        }

        ui.add_space(10.0);

        if styled_button_with_icon(ui, UPLOAD_SIMPLE, "Import").clicked() {
            app.import.reset();
            app.import.is_open = true;
        }

        ui.add_space(10.0);

        if styled_button_with_icon(ui, ARROWS_CLOCKWISE, "Refresh").clicked() {
            app.load_employees();
        }

        ui.add_space(10.0);

        if styled_button_with_icon(ui, FILE_XLS, "Export to Excel").clicked() {
            app.export_employees();
        }
    });

    ui.add_space(10.0);

    // Toolbar row 2: Search and filter
    let mut reload = false;
    ui.horizontal(|ui| {
        ui.label("Search:");
        let mut search = app.employee_query.search.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut search)
                .desired_width(220.0)
                .hint_text("Name, email, code or NIK..."),
        );
        if response.changed() {
            app.employee_query.set_search(search);
        }
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
        if submitted || styled_button_with_icon(ui, MAGNIFYING_GLASS, "Search").clicked() {
            reload = true;
        }

        ui.add_space(20.0);

        ui.label("Status:");
        let current = app.employee_query.filter("status").map(str::to_string);
        for (key, label) in [
            (None, "All"),
            (Some(EmployeeStatus::Active.key()), "Active"),
            (Some(EmployeeStatus::Inactive.key()), "Inactive"),
        ] {
            if ui.selectable_label(current.as_deref() == key, label).clicked() {
                app.employee_query.set_filter("status", key);
                reload = true;
            }
        }

        ui.add_space(20.0);

        ui.label("Contract:");
        let selected = app.employee_query.filter("contract_type").map(str::to_string);
        egui::ComboBox::from_id_salt("emp_contract_filter")
            .width(120.0)
            .selected_text(
                ContractType::ALL
                    .iter()
                    .find(|c| selected.as_deref() == Some(c.key()))
                    .map(|c| c.label())
                    .unwrap_or("All"),
            )
            .show_ui(ui, |ui| {
                if ui.selectable_label(selected.is_none(), "All").clicked() {
                    app.employee_query.set_filter("contract_type", None);
                    reload = true;
                }
                for contract in ContractType::ALL {
                    if ui
                        .selectable_label(selected.as_deref() == Some(contract.key()), contract.label())
                        .clicked()
                    {
                        app.employee_query.set_filter("contract_type", Some(contract.key()));
                        reload = true;
                    }
                }
            });

        if app.employee_query.has_filters() {
            ui.add_space(10.0);
            if styled_button(ui, "Clear").clicked() {
                app.employee_query.clear_filters();
                reload = true;
            }
        }
    });

    ui.add_space(15.0);

    if show_table(app, ui) {
        reload = true;
    }

    ui.add_space(10.0);
    let info = app.employee_page;
    if let Some(action) = pagination_bar(ui, "emp_page_size", &info)
        && apply_pager(&mut app.employee_query, &info, action)
    {
        reload = true;
    }

    if reload {
        app.load_employees();
    }

    if app.employee_form.is_open {
        show_form_dialog(app, ui.ctx());
    }

    if app.import.is_open {
        show_import_dialog(app, ui.ctx());
    }

    go_back
}

/// Returns true when the sort changed.
fn show_table(app: &mut App, ui: &mut Ui) -> bool {
    let mut sort_changed = false;

    if app.employees.is_empty() {
        ui.label(RichText::new(if app.is_loading() { "Loading..." } else { "No employees found" }).weak());
        return false;
    }

    ScrollArea::vertical()
        .id_salt("employee_scroll")
        .max_height(ui.available_height() - 50.0)
        .show(ui, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("employees_grid")
                .num_columns(9)
                .striped(true)
                .min_col_width(60.0)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    for (column, label) in [
                        ("employee_code", "Code"),
                        ("name", "Name"),
                        ("email", "Email"),
                        ("position", "Position"),
                    ] {
                        sort_changed |= sort_header(ui, &mut app.employee_query, column, label);
                    }
                    ui.strong("Branch");
                    ui.strong("Contract");
                    sort_changed |= sort_header(ui, &mut app.employee_query, "join_date", "Join Date");
                    ui.strong("Status");
                    ui.strong("Actions");
                    ui.end_row();

                    for emp in &app.employees {
                        ui.label(&emp.employee_code);
                        ui.label(emp.full_name());
                        ui.label(&emp.email);
                        ui.label(&emp.position);
                        ui.label(emp.branch.as_deref().unwrap_or("-"));
                        ui.label(emp.contract_type.label());
                        ui.label(emp.join_date.to_string());
                        let color = if emp.is_active() { colors::SUCCESS } else { colors::NEUTRAL };
                        status_badge(ui, emp.status.label(), color);

                        ui.horizontal(|ui| {
                            ui.add_space(8.0);
                            if action_button(ui, PENCIL, "Edit").clicked() {
                                app.employee_form = EmployeeForm::edit(emp);
                            }
                            ui.add_space(4.0);
                            if danger_action_button(ui, TRASH, "Delete").clicked() {
                                app.delete_target = Some(DeleteTarget::Employee(emp.id, emp.full_name()));
                                app.show_delete_confirm = true;
                            }
                        });

                        ui.end_row();
                    }
                });
        });

    sort_changed
}

fn text_row(ui: &mut Ui, label: &str, value: &mut String, hint: &str) {
    ui.label(label);
    ui.add(
        egui::TextEdit::singleline(value)
            .desired_width(250.0)
            .hint_text(hint),
    );
    ui.end_row();
}

fn show_form_dialog(app: &mut App, ctx: &egui::Context) {
    let title = if app.employee_form.is_editing {
        "Edit Employee"
    } else {
        "Add Employee"
    };

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .default_width(480.0)
        .max_height(600.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(10.0);

            ScrollArea::vertical().max_height(480.0).show(ui, |ui| {
                let form = &mut app.employee_form;
                egui::Grid::new("emp_form_grid")
                    .num_columns(2)
                    .spacing([20.0, 10.0])
                    .show(ui, |ui| {
                        text_row(ui, "Employee Code:", &mut form.employee_code, "Generated when blank");
                        text_row(ui, "First Name:*", &mut form.first_name, "");
                        text_row(ui, "Last Name:", &mut form.last_name, "");
                        text_row(ui, "Email:*", &mut form.email, "name@company.com");
                        text_row(ui, "Phone:", &mut form.phone, "08...");
                        text_row(ui, "NIK:*", &mut form.nik, "16 digits");

                        ui.label("Gender:*");
                        egui::ComboBox::from_id_salt("emp_form_gender")
                            .width(150.0)
                            .selected_text(form.gender.map(|g| g.label()).unwrap_or("Select..."))
                            .show_ui(ui, |ui| {
                                for gender in Gender::ALL {
                                    ui.selectable_value(&mut form.gender, Some(gender), gender.label());
                                }
                            });
                        ui.end_row();

                        text_row(ui, "Birth Place:", &mut form.birth_place, "");

                        ui.label("Birth Date:");
                        date_input(ui, &mut form.birth_date_input, 120.0);
                        ui.end_row();

                        text_row(ui, "Education:", &mut form.education, "");
                        text_row(ui, "Position:*", &mut form.position, "");
                        text_row(ui, "Branch:", &mut form.branch, "");
                        text_row(ui, "Grade:", &mut form.grade, "");

                        ui.label("Contract:");
                        egui::ComboBox::from_id_salt("emp_form_contract")
                            .width(150.0)
                            .selected_text(form.contract_type.label())
                            .show_ui(ui, |ui| {
                                for contract in ContractType::ALL {
                                    ui.selectable_value(&mut form.contract_type, contract, contract.label());
                                }
                            });
                        ui.end_row();

                        text_row(ui, "Bank Name:", &mut form.bank_name, "");
                        text_row(ui, "Account Number:", &mut form.bank_account_number, "6-20 digits");
                        text_row(ui, "Account Holder:", &mut form.bank_account_holder, "");

                        ui.label("Join Date:*");
                        ui.vertical(|ui| {
                            date_input(ui, &mut form.join_date_input, 120.0);
                            ui.weak("Format: YYYY-MM-DD");
                        });
                        ui.end_row();

                        if form.is_editing {
                            ui.label("Status:");
                            ui.horizontal(|ui| {
                                ui.selectable_value(&mut form.status, EmployeeStatus::Active, "Active");
                                ui.selectable_value(&mut form.status, EmployeeStatus::Inactive, "Inactive");
                            });
                            ui.end_row();
                        }
                    });
            });

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                if styled_button(ui, "Cancel").clicked() {
                    app.employee_form.reset();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if primary_button_with_icon(ui, "", "Save").clicked() {
                        save_employee(app);
                    }
                });
            });
        });
}

fn save_employee(app: &mut App) {
    let form = &app.employee_form;
    let others: Vec<Employee> = app
        .directory
        .iter()
        .filter(|e| Some(e.id) != form.id)
        .cloned()
        .collect();
    let existing = ExistingKeys::from_employees(&others);

    let data = match build_employee(form, &existing, Local::now().date_naive()) {
        Ok(data) => data,
        Err(e) => {
            app.error_message = Some(e);
            return;
        }
    };

    match form.id {
        Some(id) if form.is_editing => {
            let update = update_from(data, form.status);
            app.update_employee(id, update);
        }
        _ => app.create_employee(data),
    }
}

/// Form fields in import column order.
fn form_cells(form: &EmployeeForm) -> Vec<String> {
    let cells = [
        form.employee_code.as_str(),
        form.first_name.as_str(),
        form.last_name.as_str(),
        form.email.as_str(),
        form.phone.as_str(),
        form.nik.as_str(),
        form.gender.map(|g| g.label()).unwrap_or(""),
        form.birth_place.as_str(),
        form.birth_date_input.as_str(),
        form.education.as_str(),
        form.position.as_str(),
        form.branch.as_str(),
        form.grade.as_str(),
        form.contract_type.label(),
        form.bank_name.as_str(),
        form.bank_account_number.as_str(),
        form.bank_account_holder.as_str(),
        form.join_date_input.as_str(),
    ];
    cells.iter().map(|c| c.trim().to_string()).collect()
}

/// Validate the form with the same rules as an import row.
pub fn build_employee(
    form: &EmployeeForm,
    existing: &ExistingKeys,
    today: NaiveDate,
) -> Result<CreateEmployee, String> {
    let sheet = RawSheet {
        headers: COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: vec![form_cells(form)],
    };
    let mut report = validate_sheet(&sheet, existing, today).map_err(|e| e.to_string())?;

    if let Some((_, employee)) = report.valid.pop() {
        return Ok(employee);
    }
    let problems: Vec<String> = report
        .errors
        .iter()
        .map(|e| match &e.column {
            Some(column) => format!("{}: {}", column.replace('_', " "), e.message),
            None => e.message.clone(),
        })
        .collect();
    Err(problems.join("\n"))
}

fn update_from(data: CreateEmployee, status: EmployeeStatus) -> UpdateEmployee {
    UpdateEmployee {
        first_name: Some(data.first_name),
        last_name: Some(data.last_name),
        email: Some(data.email),
        phone: Some(data.phone),
        nik: Some(data.nik),
        gender: Some(data.gender),
        birth_place: Some(data.birth_place),
        birth_date: Some(data.birth_date),
        education: Some(data.education),
        position: Some(data.position),
        branch: Some(data.branch),
        grade: Some(data.grade),
        contract_type: Some(data.contract_type),
        bank_name: Some(data.bank_name),
        bank_account_number: Some(data.bank_account_number),
        bank_account_holder: Some(data.bank_account_holder),
        join_date: Some(data.join_date),
        status: Some(status),
    }
}

fn show_import_dialog(app: &mut App, ctx: &egui::Context) {
    let mut open = true;

    egui::Window::new("Import Employees")
        .collapsible(false)
        .resizable(true)
        .default_width(720.0)
        .max_height(640.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label("Upload a CSV or Excel file with one employee per row.");
            ui.label(RichText::new("Columns marked * in the template are required.").weak());
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                let busy = app.import.is_busy();
                if ui
                    .add_enabled(!busy, egui::Button::new(format!("{FOLDER_OPEN} Choose File...")))
                    .clicked()
                    && let Some(path) = export::show_open_dialog()
                {
                    app.check_import(path);
                }

                if styled_button_with_icon(ui, DOWNLOAD_SIMPLE, "Download Template").clicked() {
                    app.download_template();
                }

                if let Some(path) = &app.import.path {
                    ui.label(RichText::new(path.display().to_string()).weak());
                }
            });

            ui.add_space(10.0);

            if app.import.checking {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Checking file...");
                });
                return;
            }

            let Some(report) = app.import.report.clone() else {
                return;
            };

            ui.separator();
            ui.add_space(5.0);

            let summary_color = if report.is_clean() { colors::SUCCESS } else { colors::WARNING };
            ui.colored_label(summary_color, report.summary());

            if !report.ignored_columns.is_empty() {
                ui.colored_label(
                    colors::NEUTRAL,
                    format!("Ignored columns: {}", report.ignored_columns.join(", ")),
                );
            }

            if !report.errors.is_empty() {
                ui.add_space(10.0);
                show_error_table(app, ui, &report);
            }

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(5.0);

            if let Some(result) = app.import.result.clone() {
                ui.colored_label(colors::SUCCESS, format!("{} employees created", result.created));
                for failure in &result.failed {
                    let row = report.valid.get(failure.index).map(|(row, _)| *row);
                    let label = row.map(|r| format!("Row {r}")).unwrap_or_else(|| "Row ?".to_string());
                    ui.colored_label(colors::ERROR, format!("{label}: {}", failure.message));
                }
                ui.add_space(5.0);
                if styled_button(ui, "Close").clicked() {
                    app.import.reset();
                }
                return;
            }

            ui.horizontal(|ui| {
                if app.import.uploading {
                    ui.spinner();
                    ui.label("Uploading...");
                    return;
                }

                let valid = report.valid.len();
                if ui
                    .add_enabled(
                        valid > 0,
                        egui::Button::new(format!("{UPLOAD_SIMPLE} Import {valid} valid rows")),
                    )
                    .clicked()
                {
                    app.upload_import();
                }

                if !report.is_clean() {
                    if valid > 0 {
                        ui.colored_label(colors::WARNING, "Rows with errors will be skipped");
                    }
                    if styled_button_with_icon(ui, FILE_XLS, "Export Errors").clicked() {
                        app.export_import_errors();
                    }
                }
            });
        });

    if !open && !app.import.is_busy() {
        app.import.reset();
    }
}

fn show_error_table(app: &mut App, ui: &mut Ui, report: &crate::import::ImportReport) {
    ui.horizontal(|ui| {
        ui.label("Filter:");
        let mut search = app.import.error_query.search.clone();
        if ui
            .add(
                egui::TextEdit::singleline(&mut search)
                    .desired_width(200.0)
                    .hint_text("Row, column or message..."),
            )
            .changed()
        {
            app.import.error_query.set_search(search);
        }
    });

    ui.add_space(5.0);

    let view = app.import.error_query.apply(&report.errors);
    let info = view.info;

    ScrollArea::vertical()
        .id_salt("import_error_scroll")
        .max_height(260.0)
        .show(ui, |ui| {
            egui::Grid::new("import_error_grid")
                .num_columns(3)
                .striped(true)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    ui.strong("Row");
                    ui.strong("Column");
                    ui.strong("Problem");
                    ui.end_row();

                    for error in &view.rows {
                        ui.label(error.row.to_string());
                        ui.label(error.column.as_deref().unwrap_or("-"));
                        ui.colored_label(colors::ERROR, &error.message);
                        ui.end_row();
                    }
                });
        });

    if let Some(action) = pagination_bar(ui, "import_error_page_size", &info) {
        apply_pager(&mut app.import.error_query, &info, action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn filled_form() -> EmployeeForm {
        EmployeeForm {
            first_name: "  Dewi   Lestari ".to_string(),
            email: "Dewi@Example.com".to_string(),
            phone: "812-3456-7890".to_string(),
            nik: "3201234567890002".to_string(),
            gender: Some(Gender::Female),
            position: "HR Officer".to_string(),
            join_date_input: "01/09/2026".to_string(),
            ..EmployeeForm::create(today())
        }
    }

    #[test]
    fn test_form_normalizes_like_import() {
        let employee = build_employee(&filled_form(), &ExistingKeys::default(), today()).unwrap();
        assert_eq!(employee.first_name, "Dewi Lestari");
        assert_eq!(employee.email, "dewi@example.com");
        assert_eq!(employee.phone.as_deref(), Some("081234567890"));
        assert_eq!(employee.join_date, NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());
        assert_eq!(employee.employee_code, None);
        assert_eq!(employee.contract_type, ContractType::Permanent);
    }

    #[test]
    fn test_form_lists_every_problem() {
        let form = EmployeeForm {
            gender: None,
            nik: "123".to_string(),
            ..filled_form()
        };
        let err = build_employee(&form, &ExistingKeys::default(), today()).unwrap_err();
        assert!(err.contains("nik: must be exactly 16 digits"), "{err}");
        assert!(err.contains("gender: is required"), "{err}");
    }

    #[test]
    fn test_update_keeps_status() {
        let data = build_employee(&filled_form(), &ExistingKeys::default(), today()).unwrap();
        let update = update_from(data, EmployeeStatus::Inactive);
        assert_eq!(update.status, Some(EmployeeStatus::Inactive));
        assert_eq!(update.bank_name, Some(None));
    }
}
