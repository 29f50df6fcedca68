// Countdown Widget
// Main entry point

use countdown_widget::ui_egui::CountdownApp;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::init();

    log::info!("Starting Countdown Widget");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Countdown Timers")
            .with_inner_size([380.0, 520.0])
            .with_min_inner_size([260.0, 200.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Countdown Timers",
        options,
        Box::new(|cc| Ok(Box::new(CountdownApp::new(cc)))),
    )
}
