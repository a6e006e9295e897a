//! Phishing Detection Core - Entry Point
//!
//! Loads both classifiers (load-or-fail, before serving anything) and runs a
//! one-shot classification from the command line. The boundary layer that
//! translates wire requests lives elsewhere; this binary exercises the same
//! `PredictionService` it would embed.

use std::path::Path;

use phishing_core::constants;
use phishing_core::logic::{PredictionService, RawRequest};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "Starting {} v{}",
        constants::APP_NAME,
        constants::APP_VERSION
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("Usage: phishing-core <email|url> <text...>");
        std::process::exit(2);
    }

    let models_dir = constants::get_models_dir();
    let mut service = PredictionService::new();
    if let Err(e) = service.load_models(Path::new(&models_dir)) {
        log::error!("Startup aborted: {}", e);
        std::process::exit(1);
    }

    let request = RawRequest::new(args[1..].join(" "), args[0].clone());
    match service.predict_one(&request) {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("Failed to encode result: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            log::error!("Prediction failed: {}", e);
            eprintln!("{}", e.public_message());
            std::process::exit(1);
        }
    }
}
