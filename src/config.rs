use crate::normalize::DelayBounds;
use anyhow::{bail, Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub delay: DelayBounds,
    /// Log feature-vector statistics for every prediction.
    pub log_pred: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = DelayBounds::default();
        let delay = DelayBounds {
            min: parse_or(&get, "DELAY_MIN", defaults.min)?,
            max: parse_or(&get, "DELAY_MAX", defaults.max)?,
        };
        if !delay.min.is_finite() || !delay.max.is_finite() {
            bail!(
                "DELAY_MIN and DELAY_MAX must be finite (got {} and {})",
                delay.min,
                delay.max
            );
        }
        if delay.min > delay.max {
            bail!("DELAY_MIN ({}) is greater than DELAY_MAX ({})", delay.min, delay.max);
        }

        Ok(Self {
            model_path: get("MODEL_PATH")
                .unwrap_or_else(|| "best_model.json".to_string())
                .into(),
            scaler_path: get("SCALER_PATH")
                .unwrap_or_else(|| "scaler.json".to_string())
                .into(),
            host: parse_or(&get, "HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: parse_or(&get, "PORT", 8001)?,
            delay,
            log_pred: get("LOG_PRED").as_deref() == Some("1"),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
