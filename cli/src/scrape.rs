use std::path::PathBuf;

use job_scraper::ibps;
use persistence::CsvWriter;
use url::Url;

use crate::config::Config;
use crate::types::Error;

/// Fetch the listing page, extract its postings and save them, returns the csv path.
pub fn run(config: &Config) -> Result<PathBuf, Error> {
    let page_url = Url::parse(&config.fetch.url)
        .map_err(|e| Error::Config(format!("invalid url '{}': {}", config.fetch.url, e)))?;
    let html = ibps::fetch(&config.fetch)?;
    let jobs = ibps::extract(&html, &page_url)?;
    let writer = CsvWriter::new(&config.output_dir, &config.file_prefix);
    let path = writer.write(jobs)?;
    Ok(path)
}
