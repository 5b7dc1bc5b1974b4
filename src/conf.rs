use crate::{execution::POLL_INTERVAL, Error, Result};
use std::{env, time::Duration};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_GEOCODER_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_USER_AGENT: &str = concat!("leadscout/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Conf {
    pub api_url: Url,
    pub geocoder_url: Url,
    pub geocoder_timeout: Duration,
    pub poll_interval: Duration,
    pub token: Option<String>,
    pub user_agent: String,
}

impl Conf {
    pub fn from_env() -> Result<Conf> {
        Conf::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Conf> {
        let var = |key: &str| lookup(key).filter(|it| !it.trim().is_empty());
        Ok(Conf {
            api_url: parse_base_url(
                &var("LEADSCOUT_API_URL").unwrap_or(DEFAULT_API_URL.into()),
            )?,
            geocoder_url: parse_base_url(
                &var("LEADSCOUT_GEOCODER_URL").unwrap_or(DEFAULT_GEOCODER_URL.into()),
            )?,
            geocoder_timeout: Duration::from_millis(parse_u64(
                "LEADSCOUT_GEOCODER_TIMEOUT_MS",
                var("LEADSCOUT_GEOCODER_TIMEOUT_MS"),
                DEFAULT_GEOCODER_TIMEOUT_MS,
            )?),
            poll_interval: Duration::from_secs(parse_u64(
                "LEADSCOUT_POLL_INTERVAL_SECS",
                var("LEADSCOUT_POLL_INTERVAL_SECS"),
                POLL_INTERVAL.as_secs(),
            )?),
            token: var("LEADSCOUT_TOKEN"),
            user_agent: var("LEADSCOUT_USER_AGENT").unwrap_or(DEFAULT_USER_AGENT.into()),
        })
    }
}

// Url::join drops the last path segment unless the base ends with a slash
fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let url = if raw.ends_with('/') {
        Url::parse(raw)?
    } else {
        Url::parse(&format!("{raw}/"))?
    };
    Ok(url)
}

fn parse_u64(key: &str, value: Option<String>, default: u64) -> Result<u64> {
    match value {
        Some(value) => match value.trim().parse::<u64>() {
            Ok(0) | Err(_) => Err(Error::InvalidInput(format!(
                "{key} must be a positive integer, got {value}"
            ))),
            Ok(parsed) => Ok(parsed),
        },
        None => Ok(default),
    }
}
