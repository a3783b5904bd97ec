use anyhow::{Context, Result};
use std::env;

use crate::scoring::FusionConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_path: String,
    /// defaults for requests that don't override weights or top_n
    pub fusion: FusionConfig,
    /// tolerate collaborative index entries missing from the catalog
    pub cf_skip_unknown: bool,
}

fn parse_var<T>(name: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("failed to parse {name}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let fusion = FusionConfig::new(
            parse_var("CBF_WEIGHT", "0.7")?,
            parse_var("CF_WEIGHT", "0.3")?,
            parse_var("TOP_N", "10")?,
        );
        fusion.validate().context("invalid fusion weights")?;

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", "8080")?,
            data_path: env::var("GAMES_DATA_PATH")
                .unwrap_or_else(|_| "data/games.json".to_string()),
            fusion,
            cf_skip_unknown: parse_var("CF_SKIP_UNKNOWN", "false")?,
        })
    }
}
