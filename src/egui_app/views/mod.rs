use eframe::egui;

use crate::egui_app::AppView;
use crate::egui_app::state::AppState;
use crate::egui_app::theme::{colors, styles};

pub mod editor_view;
pub mod home_view;
pub mod name_view;

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_panel")
        .frame(styles::top_bar_frame())
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(colors::TEXT_LIGHT, egui::RichText::new("📝 Collabpad").size(18.0).strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(16.0);

                    if state.current_view == AppView::Editor {
                        if ui.button("Leave").clicked() {
                            state.leave_document();
                            return;
                        }
                        ui.add_space(16.0);

                        if let Some(editor) = &state.editor {
                            ui.colored_label(
                                styles::status_color(&editor.status),
                                format!("● {}", editor.status.label()),
                            );
                        }
                    }

                    if !state.user_name.is_empty() {
                        ui.add_space(16.0);
                        ui.colored_label(colors::TEXT_SECONDARY, &state.user_name);
                    }
                });
            });
        });
}

pub fn render_main_panel(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default()
        .frame(styles::main_panel_frame())
        .show(ctx, |ui| match state.current_view {
            AppView::Name => name_view::render(ui, state),
            AppView::Home => home_view::render(ui, state),
            AppView::Editor => editor_view::render(ui, state),
        });
}
