use std::{env, path::PathBuf, time::Duration};

use job_scraper::ibps::FetchConfig;
use persistence::DEFAULT_FILE_PREFIX;

use crate::types::Error;

const OUTPUT_DIR_VAR: &str = "IBPS_OUTPUT_DIR";
const TIMEOUT_VAR: &str = "IBPS_REQUEST_TIMEOUT_SECS";
const ACCEPT_INVALID_CERTS_VAR: &str = "IBPS_ACCEPT_INVALID_CERTS";

/// Settings of a single run, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub fetch: FetchConfig,
    pub output_dir: PathBuf,
    pub file_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            output_dir: PathBuf::from("data"),
            file_prefix: DEFAULT_FILE_PREFIX.to_owned(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();
        if let Some(dir) = var(OUTPUT_DIR_VAR).filter(|dir| !dir.trim().is_empty()) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(secs) = var(TIMEOUT_VAR) {
            let secs = secs
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "{} must be a positive number of seconds, got '{}'",
                        TIMEOUT_VAR, secs
                    ))
                })?;
            config.fetch.timeout = Duration::from_secs(secs);
        }
        if let Some(flag) = var(ACCEPT_INVALID_CERTS_VAR) {
            config.fetch.accept_invalid_certs = parse_flag(&flag).ok_or_else(|| {
                Error::Config(format!(
                    "{} must be true or false, got '{}'",
                    ACCEPT_INVALID_CERTS_VAR, flag
                ))
            })?;
        }
        log::debug!("using config: {:?}", config);
        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use job_scraper::ibps::RECRUITMENT_URL;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.fetch.url, RECRUITMENT_URL);
        assert_eq!(config.fetch.timeout, Duration::from_secs(10));
        assert!(!config.fetch.accept_invalid_certs);
        assert_eq!(config.output_dir, PathBuf::from("data"));
        assert_eq!(config.file_prefix, "ibps_recruitments");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (OUTPUT_DIR_VAR, "/tmp/ibps"),
            (TIMEOUT_VAR, " 30 "),
            (ACCEPT_INVALID_CERTS_VAR, "TRUE"),
        ])
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/ibps"));
        assert_eq!(config.fetch.timeout, Duration::from_secs(30));
        assert!(config.fetch.accept_invalid_certs);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(config_from(&[(TIMEOUT_VAR, "ten")]), Err(Error::Config(_))));
        assert!(matches!(config_from(&[(TIMEOUT_VAR, "0")]), Err(Error::Config(_))));
        assert!(matches!(
            config_from(&[(ACCEPT_INVALID_CERTS_VAR, "maybe")]),
            Err(Error::Config(_))
        ));
    }
}
