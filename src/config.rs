use crate::error::{Result, ScoutError};
use crate::scrapers::query::validate_criteria;
use crate::scrapers::types::SearchCriteria;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DATA_DIR_NAME: &str = ".house_searcher_data";

/// Everything a sync controller needs, decided once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub criteria: SearchCriteria,
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            criteria: SearchCriteria::default(),
            data_dir: default_data_dir(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Defaults overridden by `HOUSE_SCOUT_*` variables (a `.env` file is
    /// honoured).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Some(v) = parse_var("HOUSE_SCOUT_MAX_PRICE")? {
            config.criteria.max_price = v;
        }
        if let Some(v) = parse_var("HOUSE_SCOUT_MIN_AREA")? {
            config.criteria.min_area = v;
        }
        if let Some(v) = parse_var("HOUSE_SCOUT_MIN_ROOMS")? {
            config.criteria.min_rooms = v;
        }
        if let Some(v) = parse_var("HOUSE_SCOUT_MAX_ROOMS")? {
            config.criteria.max_rooms = v;
        }
        if let Ok(dir) = env::var("HOUSE_SCOUT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = parse_var("HOUSE_SCOUT_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        validate_criteria(&config.criteria)?;
        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ScoutError::Config(format!("{} has invalid value '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
