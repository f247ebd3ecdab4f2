// src/app/ui.rs
use eframe::egui as eg;

use super::types::{LoadPhase, DIALOG_BUILD_FAILED, DIALOG_TITLE};
use super::ShowsheetApp;

const DATE_COMBO_WIDTH: f32 = 180.0;

impl ShowsheetApp {
    pub fn render(&mut self, ctx: &eg::Context) {
        let modal = self.error_dialog.is_some();
        let mut retry = false;
        let mut generate = false;

        eg::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!modal, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(10.0);
                    ui.label(eg::RichText::new(&self.today).size(16.0));
                    ui.add_space(8.0);
                    ui.label(&self.status);
                    if self.phase == LoadPhase::Loading {
                        ui.add(eg::Spinner::new().size(14.0));
                    }
                    ui.add_space(8.0);

                    self.ui_render_date_combo(ui);
                    ui.add_space(8.0);

                    if self.retry_visible() && ui.button("重试").clicked() {
                        retry = true;
                    }
                    if ui
                        .add_enabled(self.can_generate(), eg::Button::new("生成文档并打开"))
                        .clicked()
                    {
                        generate = true;
                    }
                });
            });
        });

        // Apply after .show() so the panel closure no longer borrows self
        if retry {
            self.start_load(Some(ctx));
        }
        if generate {
            self.generate_and_open();
        }

        self.ui_render_error_dialog(ctx);
    }

    // ---------- DATE DROPDOWN ----------
    fn ui_render_date_combo(&mut self, ui: &mut eg::Ui) {
        let selected_text = self
            .dates
            .get(self.selected)
            .map(|d| d.label.clone())
            .unwrap_or_default();

        ui.add_enabled_ui(self.phase == LoadPhase::Ready, |ui| {
            eg::ComboBox::from_id_source("date_combo")
                .selected_text(selected_text)
                .width(DATE_COMBO_WIDTH)
                .show_ui(ui, |ui| {
                    for (idx, choice) in self.dates.iter().enumerate() {
                        ui.selectable_value(&mut self.selected, idx, choice.label.as_str());
                    }
                });
        });
    }

    // ---------- ERROR DIALOG ----------
    fn ui_render_error_dialog(&mut self, ctx: &eg::Context) {
        let Some(detail) = self.error_message().map(str::to_string) else {
            return;
        };

        let mut close = false;
        eg::Window::new(DIALOG_TITLE)
            .collapsible(false)
            .resizable(false)
            .anchor(eg::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(eg::RichText::new(DIALOG_BUILD_FAILED).strong());
                ui.label(eg::RichText::new(detail).weak());
                ui.add_space(6.0);
                ui.vertical_centered(|ui| {
                    if ui.button("确定").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            self.dismiss_error();
        }
    }
}
