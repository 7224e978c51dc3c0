use eframe::egui;

use crate::egui_app::api::DocumentKind;
use crate::egui_app::state::AppState;
use crate::egui_app::theme::{colors, styles};

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);

        styles::card_frame().show(ui, |ui| {
            ui.set_width(360.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Create Document").size(22.0).color(colors::TEXT_LIGHT));
                ui.add_space(12.0);

                ui.add_sized(
                    [320.0, 28.0],
                    egui::TextEdit::singleline(&mut state.title_input).hint_text("Document title"),
                );
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    for kind in [DocumentKind::Public, DocumentKind::Private] {
                        ui.radio_value(
                            &mut state.kind_input,
                            kind,
                            egui::RichText::new(kind.label()).color(colors::TEXT_LIGHT),
                        );
                    }
                });

                if state.kind_input == DocumentKind::Private {
                    ui.add_space(8.0);
                    ui.add_sized(
                        [320.0, 28.0],
                        egui::TextEdit::singleline(&mut state.password_input)
                            .password(true)
                            .hint_text("Password"),
                    );
                }

                ui.add_space(12.0);
                let create = egui::Button::new(egui::RichText::new("Create").color(colors::TEXT_LIGHT))
                    .fill(colors::ACCENT)
                    .min_size(egui::vec2(320.0, 32.0));
                if ui.add_enabled(state.can_create() && !state.loading, create).clicked() {
                    state.handle_create();
                }
            });
        });

        ui.add_space(24.0);

        styles::card_frame().show(ui, |ui| {
            ui.set_width(360.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Join Document").size(22.0).color(colors::TEXT_LIGHT));
                ui.add_space(12.0);

                ui.add_sized(
                    [320.0, 28.0],
                    egui::TextEdit::singleline(&mut state.join_id_input).hint_text("Document id"),
                );

                ui.add_space(12.0);
                let join = egui::Button::new(egui::RichText::new("Join").color(colors::TEXT_LIGHT))
                    .fill(colors::ACCENT)
                    .min_size(egui::vec2(320.0, 32.0));
                if ui.add_enabled(!state.loading, join).clicked() {
                    state.handle_join();
                }
            });
        });

        if state.loading {
            ui.add_space(15.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Loading...").color(colors::TEXT_LIGHT));
                ui.spinner();
            });
        }

        if let Some(ref error) = state.error {
            ui.add_space(10.0);
            ui.label(egui::RichText::new(error).color(colors::ERROR));
        }
    });
}
