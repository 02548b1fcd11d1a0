mod report;

use bondmap::{run, Config};
use log::info;
use report::render_summary;
use std::error::Error;
use std::path::PathBuf;

/// Configuration file read when no path is given on the command line.
const DEFAULT_CONFIG: &str = "bondmap.json";

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // An explicit path must exist; the default one may be absent.
    let config = match std::env::args_os().nth(1) {
        Some(path) => Config::from_file(&PathBuf::from(path))?,
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG);
            if path.exists() {
                Config::from_file(&path)?
            } else {
                info!("`{DEFAULT_CONFIG}` not found, using built-in defaults");
                Config::default()
            }
        }
    };

    let summary = run(&config)?;
    let report = render_summary(&summary);
    println!("{report}");

    Ok(())
}
