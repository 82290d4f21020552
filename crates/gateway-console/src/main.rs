//! Gateway Console: read and set the GatewayManager threshold through a
//! connected wallet.

use eframe::egui;

mod app;
mod bridge;
mod ui;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Gateway Console");

    let bridge = bridge::ConsoleBridge::from_env();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Gateway Console")
            .with_inner_size([720.0, 540.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gateway Console",
        native_options,
        Box::new(|cc| Ok(Box::new(app::App::new(cc, bridge)))),
    )
}
