//! Replay entry point.
//!
//! Usage: `gridruler <script.json>`. Prints the resulting scene stores as
//! JSON. Set `RUST_LOG=debug` to follow the drag lifecycle.

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting GridRuler replay");

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: gridruler <script.json>");
        return ExitCode::FAILURE;
    };

    let outcome = gridruler_app::Script::from_path(&path)
        .and_then(|script| pollster::block_on(gridruler_app::run(script)));
    let json = outcome.and_then(|outcome| Ok(serde_json::to_string_pretty(&outcome)?));
    match json {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Replay failed: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
