use eframe::egui;

use crate::egui_app::state::{AppState, EditorState};
use crate::egui_app::theme::{colors, styles};
use crate::sync::buffer::EditKey;

/// Structural key pressed this frame, if any
fn pressed_edit_key(ctx: &egui::Context) -> Option<EditKey> {
    ctx.input(|i| {
        if i.key_pressed(egui::Key::Enter) {
            Some(EditKey::Enter)
        } else if i.key_pressed(egui::Key::Delete) {
            Some(EditKey::Delete)
        } else if i.key_pressed(egui::Key::Backspace) {
            Some(EditKey::Backspace)
        } else {
            None
        }
    })
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let Some(editor) = state.editor.as_mut() else {
        ui.colored_label(colors::ERROR, "No document is open");
        return;
    };

    render_info_bar(ui, editor);
    render_participants(ui, editor);

    if let Some(ref error) = editor.last_error {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.add_space(16.0);
            ui.colored_label(colors::ERROR, error);
        });
    }

    styles::editor_frame().show(ui, |ui| {
        if !editor.seeded {
            ui.horizontal(|ui| {
                ui.colored_label(colors::TEXT_DARK, "Loading document...");
                ui.spinner();
            });
            return;
        }

        let key = pressed_edit_key(ui.ctx());
        egui::ScrollArea::vertical().show(ui, |ui| {
            let output = egui::TextEdit::multiline(&mut editor.text)
                .desired_width(f32::INFINITY)
                .desired_rows(30)
                .text_color(colors::TEXT_DARK)
                .frame(false)
                .show(ui);

            if output.response.changed() {
                editor.text_changed(key.or(Some(EditKey::Other)));
            }
            if let Some(range) = output.cursor_range {
                editor.cursor_moved(range.primary.index);
            }
        });
    });
}

fn render_info_bar(ui: &mut egui::Ui, editor: &EditorState) {
    styles::info_bar_frame().show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.colored_label(colors::TEXT_DARK, format!("User: {}", editor.user_name));
            ui.add_space(16.0);
            ui.colored_label(colors::TEXT_DARK, &editor.document.name);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(colors::TEXT_DARK, format!("Revision: {}", editor.revision));
                ui.add_space(16.0);
                if ui.small_button("Copy id").clicked() {
                    ui.ctx().copy_text(editor.document.id.clone());
                }
                ui.colored_label(colors::TEXT_SECONDARY, &editor.document.id);
            });
        });
    });
}

fn render_participants(ui: &mut egui::Ui, editor: &EditorState) {
    ui.horizontal(|ui| {
        ui.add_space(16.0);
        if editor.participants.is_empty() {
            ui.colored_label(colors::TEXT_SECONDARY, "Only you are here");
        } else {
            ui.colored_label(colors::TEXT_SECONDARY, "Also here:");
            for cursor in &editor.participants {
                ui.colored_label(colors::TEXT_LIGHT, format!("{} @{}", cursor.name, cursor.position));
            }
        }

        if editor.remote_operations > 0 {
            ui.add_space(16.0);
            ui.colored_label(
                colors::STATUS_CONNECTING,
                format!("{} remote edits not merged", editor.remote_operations),
            );
        }
    });
}
