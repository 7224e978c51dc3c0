/**
 * Collabpad - Main Entry Point
 *
 * Native desktop client for collaborative documents. Implements eframe::App
 * on top of AppState and the views module.
 */
use collabpad::egui_app::{theme::styles, views, AppState};
use collabpad::shared::config::SyncConfig;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (config, config_problems) = SyncConfig::load_or_default(None);
    for problem in &config_problems {
        tracing::warn!(error = %problem, "configuration problem, falling back");
    }
    tracing::info!(server = %config.server_url, "starting collabpad");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 760.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Collabpad",
        options,
        Box::new(move |cc| {
            styles::apply_global_theme(&cc.egui_ctx);
            let mut state = AppState::new(config);
            state.report_config_problems(&config_problems);
            Ok(Box::new(CollabpadApp { state }))
        }),
    )
}

/// Main application state
struct CollabpadApp {
    state: AppState,
}

impl eframe::App for CollabpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.tick();

        views::render_top_bar(ctx, &mut self.state);

        views::render_main_panel(ctx, &mut self.state);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
