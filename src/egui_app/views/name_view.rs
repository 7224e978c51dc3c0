use eframe::egui;

use crate::egui_app::state::AppState;
use crate::egui_app::theme::{colors, styles};

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.vertical_centered(|ui| {
        ui.add_space(120.0);

        styles::card_frame().show(ui, |ui| {
            ui.set_width(320.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("What's your name?").size(22.0).color(colors::TEXT_LIGHT));
                ui.add_space(16.0);

                let input = ui.add_sized(
                    [280.0, 28.0],
                    egui::TextEdit::singleline(&mut state.user_name_input).hint_text("Your name"),
                );
                let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                if let Some(ref error) = state.error {
                    ui.add_space(8.0);
                    ui.label(egui::RichText::new(error).color(colors::ERROR));
                }

                ui.add_space(16.0);
                let button = egui::Button::new(egui::RichText::new("Continue").color(colors::TEXT_LIGHT))
                    .fill(colors::ACCENT)
                    .min_size(egui::vec2(280.0, 32.0));

                if ui.add(button).clicked() || submitted {
                    state.submit_name();
                }
            });
        });
    });
}
