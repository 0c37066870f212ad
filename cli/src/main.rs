mod config;
mod scrape;
mod types;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use dotenv::dotenv;
use env_logger::{Env, Target};

use crate::config::Config;
use crate::types::Error;

fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Stdout)
        .init();
}

/// Log the outcome of a run and turn it into the process exit status.
fn report(result: Result<PathBuf, Error>) -> u8 {
    match result {
        Ok(path) => {
            log::debug!("finished scraping, output: {}", path.display());
            0
        }
        Err(e) => {
            log::error!("{}", e);
            if let Error::Fetch(_) = e {
                log::error!("Failed to fetch recruitment page. Exiting.");
            }
            1
        }
    }
}

fn main() -> ExitCode {
    dotenv().ok();
    init_logger();
    let result = Config::from_env().and_then(|config| scrape::run(&config));
    ExitCode::from(report(result))
}
