mod app;
mod color;
mod state;
mod ui;

use app::DashboardApp;
use eframe::egui;
use health_dashboard::config::DashboardConfig;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_env();
    let mut state = AppState::new(config);
    state.load_default();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Public Health Surveillance Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
}
