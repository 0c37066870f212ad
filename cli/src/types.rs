use job_scraper::ibps::{FetchError, ParseError};
use persistence::WriteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Write error: {0}")]
    Write(#[from] WriteError),
    #[error("Invalid configuration: {0}")]
    Config(String),
}
