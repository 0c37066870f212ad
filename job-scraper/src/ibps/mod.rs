pub mod scraper;

use reqwest::StatusCode;
use thiserror::Error;

pub use self::scraper::{extract, fetch, FetchConfig};

pub const RECRUITMENT_URL: &str = "https://www.ibps.in/index.php/recruitment/";
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build http client: '{0}'")]
    Client(#[source] reqwest::Error),
    #[error("Request error: '{0}'")]
    Request(#[from] reqwest::Error),
    #[error("Failed to scrape data from: '{url}', status: {status}")]
    RequestNotOk { url: String, status: StatusCode },
    #[error("Empty response body from: '{0}'")]
    EmptyBody(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Document contains no html markup")]
    NotHtml,
    #[error("Invalid base url '{href}': '{source}'")]
    InvalidBaseUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
}
