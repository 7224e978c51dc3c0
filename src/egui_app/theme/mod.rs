//! Theme Module
//!
//! Colors and frame builders shared by every view.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::egui_app::theme::{colors, styles};
//!
//! styles::apply_global_theme(ctx);
//! styles::info_bar_frame().show(ui, |ui| {
//!     ui.colored_label(colors::TEXT_DARK, "Revision: 3");
//! });
//! ```

pub mod colors;
pub mod styles;

pub use colors::*;
pub use styles::*;
