//! Theme Styling Functions
//!
//! Helpers that keep frames and indicator colors consistent across views.

use eframe::egui::{self, Color32, CornerRadius, Stroke};
use super::colors;
use crate::sync::connection::{ConnectionState, ConnectionStatus};

/// Apply the global theme to the egui context
pub fn apply_global_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals.panel_fill = colors::BG_DARK;
    style.visuals.window_fill = colors::CARD_BG;

    style.visuals.widgets.inactive.bg_fill = colors::ACCENT;
    style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, colors::TEXT_LIGHT);

    style.visuals.widgets.hovered.bg_fill = colors::ACCENT_HOVER;
    style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, colors::TEXT_LIGHT);

    style.visuals.extreme_bg_color = colors::EDITOR_BG;
    style.visuals.override_text_color = None;

    ctx.set_style(style);
}

/// Create a frame style for the top bar
pub fn top_bar_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(colors::TOP_BAR_BG)
        .inner_margin(egui::Margin::symmetric(12, 8))
}

/// Create a frame style for the main panel
pub fn main_panel_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(colors::BG_DARK)
        .inner_margin(egui::Margin::same(0))
}

/// Create a frame for the centered forms (name, create, join)
pub fn card_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(colors::CARD_BG)
        .corner_radius(CornerRadius::same(12))
        .inner_margin(egui::Margin::same(24))
        .shadow(egui::epaint::Shadow {
            offset: [0, 4],
            blur: 12,
            spread: 0,
            color: Color32::from_black_alpha(60),
        })
}

/// Create a frame for the user / revision strip above the editor
pub fn info_bar_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(colors::INFO_BAR_BG)
        .stroke(Stroke::new(1.0, colors::INFO_BAR_BORDER))
        .inner_margin(egui::Margin::symmetric(16, 8))
}

/// Create a frame for the text area
pub fn editor_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(colors::EDITOR_BG)
        .inner_margin(egui::Margin::same(16))
}

/// Indicator color for a connection status
pub fn status_color(status: &ConnectionStatus) -> Color32 {
    match status.state {
        ConnectionState::Open => colors::STATUS_ONLINE,
        ConnectionState::Connecting => colors::STATUS_CONNECTING,
        ConnectionState::Closed if status.exhausted => colors::ERROR,
        ConnectionState::Idle | ConnectionState::Closed => colors::STATUS_OFFLINE,
    }
}
