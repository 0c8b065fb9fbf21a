use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{Result, anyhow};
use bank::BANK_PATH;
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub dataset_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            port: try_load("RUST_PORT", "5000")?,
            dataset_path: try_load("DATASET_PATH", BANK_PATH)?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    parse_value(key, env::var(key).ok(), default)
}

fn parse_value<T: FromStr>(key: &str, value: Option<String>, default: &str) -> Result<T>
where
    T::Err: Display,
{
    value
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            anyhow!("Environment misconfigured: invalid {key} value: {e}")
        })
}
