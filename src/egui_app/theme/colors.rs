//! Color Constants for the Editor Theme
//!
//! Dark chrome around a light writing surface.

use eframe::egui::Color32;

/// Top bar background - Charcoal
pub const TOP_BAR_BG: Color32 = Color32::from_rgb(0x2B, 0x2B, 0x2B);

/// Dark background for main areas
pub const BG_DARK: Color32 = Color32::from_rgb(0x1F, 0x1F, 0x1F);

/// Form card background
pub const CARD_BG: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);

/// Info bar background - Light gray
pub const INFO_BAR_BG: Color32 = Color32::from_rgb(0xF3, 0xF4, 0xF6);

/// Info bar border
pub const INFO_BAR_BORDER: Color32 = Color32::from_rgb(0xE5, 0xE7, 0xEB);

/// Editor surface
pub const EDITOR_BG: Color32 = Color32::from_rgb(0xFF, 0xFF, 0xFF);

/// Text on dark backgrounds
pub const TEXT_LIGHT: Color32 = Color32::from_rgb(0xF5, 0xF5, 0xF5);

/// Text on light backgrounds
pub const TEXT_DARK: Color32 = Color32::from_rgb(0x22, 0x22, 0x22);

/// Secondary text color (muted)
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(0x9C, 0xA3, 0xAF);

/// Accent color for primary buttons
pub const ACCENT: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);

/// Accent hover
pub const ACCENT_HOVER: Color32 = Color32::from_rgb(0x22, 0x22, 0x22);

/// Connected indicator - Green
pub const STATUS_ONLINE: Color32 = Color32::from_rgb(0x28, 0xA7, 0x45);

/// Connecting indicator - Amber
pub const STATUS_CONNECTING: Color32 = Color32::from_rgb(0xFF, 0xC1, 0x07);

/// Disconnected indicator - Gray
pub const STATUS_OFFLINE: Color32 = Color32::from_rgb(0x9E, 0x9E, 0x9E);

/// Error color - Red
pub const ERROR: Color32 = Color32::from_rgb(0xDC, 0x35, 0x45);
