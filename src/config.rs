use anyhow::{Context, Result};
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::pricing::DEFAULT_CURRENCY;

/// Runtime settings, read from the environment (and `.env` if present)
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Directory holding one JSON file per collection
    pub data_dir: PathBuf,
    /// ISO code used when rendering prices
    pub currency: String,
    /// Identity the demo binary acts as
    pub demo_user: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            currency: DEFAULT_CURRENCY.to_string(),
            demo_user: "demo-host".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let currency = match var("STAY_CURRENCY") {
            Some(code) => {
                if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    anyhow::bail!("STAY_CURRENCY must be a three-letter code, got {:?}", code);
                }
                code.to_ascii_uppercase()
            }
            None => defaults.currency,
        };

        let data_dir = var("STAY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        Ok(Self {
            data_dir,
            currency,
            demo_user: var("STAY_DEMO_USER").unwrap_or(defaults.demo_user),
        })
    }

    pub fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Failed to create data directory {}", self.data_dir.display()))
    }
}
