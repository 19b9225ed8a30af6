use std::path::PathBuf;

use clap::Parser;
use egui::Vec2;
use log::error;

use laptrace::dataset::load_dataset;
use laptrace::settings::store::default_store;
use laptrace::ui::LapTrendsApp;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the results dataset document
    #[arg(short, long, default_value = "data.json")]
    data: PathBuf,
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let args = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");

    // The dataset is loaded once; a failure is carried into the app as a
    // terminal load-failed state rather than aborting the process.
    let dataset = load_dataset(&args.data);
    if let Err(e) = &dataset {
        error!("Could not load dataset {:?}: {}", args.data, e);
    }

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(1200., 800.));

    eframe::run_native(
        "Laptrace",
        native_options,
        Box::new(|cc| Ok(Box::new(LapTrendsApp::new(dataset, default_store(), cc)))),
    )
    .expect("could not start app");
}
