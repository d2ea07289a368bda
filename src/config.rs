use std::{env, time::Duration};

use anyhow::Context;
use secrecy::SecretString;

pub const DEFAULT_DATABASE: &str = "restaurant_app";
pub const DEFAULT_APP_NAME: &str = "restaurant-db-bootstrap";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: SecretString,
    pub database_name: String,
    pub app_name: String,
    pub timeout: Duration,
    pub output: OutputFormat,
    pub strict_validators: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mongodb_uri = env::var("MONGODB_URI").context("MONGODB_URI must be set")?;
        let database_name = env::var("MONGODB_DATABASE")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let app_name =
            env::var("MONGODB_APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string());
        let timeout = parse_timeout(env::var("MONGODB_TIMEOUT_SECS").ok().as_deref());
        let output = OutputFormat::parse(env::var("BOOTSTRAP_OUTPUT").ok().as_deref());
        let strict_validators =
            parse_flag(env::var("BOOTSTRAP_STRICT_VALIDATORS").ok().as_deref());

        Ok(Self {
            mongodb_uri: SecretString::from(mongodb_uri),
            database_name,
            app_name,
            timeout,
            output,
            strict_validators,
        })
    }
}

fn parse_timeout(value: Option<&str>) -> Duration {
    let secs = value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}
