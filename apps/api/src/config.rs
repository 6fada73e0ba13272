use crate::errors::ConfigError;

pub const DEFAULT_DB_NAME: &str = "market_pulse_jobs";

/// Application configuration loaded from environment variables.
///
/// Credentials are optional at load time: a dry run never needs them, so
/// commands only fail when they actually ask for a missing value.
#[derive(Debug, Clone)]
pub struct Config {
    pub cloudant_url: Option<String>,
    pub cloudant_apikey: Option<String>,
    pub db_name: String,
    pub rapidapi_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

/// Cloudant connection settings, guaranteed present.
#[derive(Debug, Clone)]
pub struct CloudantConfig {
    pub url: String,
    pub apikey: String,
    pub db_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            cloudant_url: optional_env("CLOUDANT_URL"),
            cloudant_apikey: optional_env("CLOUDANT_APIKEY"),
            db_name: optional_env("CLOUDANT_DB_NAME")
                .unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            rapidapi_key: optional_env("RAPIDAPI_KEY"),
            port: match optional_env("PORT") {
                Some(raw) => raw
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidValue { var: "PORT", value: raw })?,
                None => 8080,
            },
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Cloudant settings, or a fatal configuration error if either env var
    /// is missing.
    pub fn cloudant(&self) -> Result<CloudantConfig, ConfigError> {
        let url = self
            .cloudant_url
            .clone()
            .ok_or(ConfigError::MissingVar("CLOUDANT_URL"))?;
        let apikey = self
            .cloudant_apikey
            .clone()
            .ok_or(ConfigError::MissingVar("CLOUDANT_APIKEY"))?;
        Ok(CloudantConfig {
            url,
            apikey,
            db_name: self.db_name.clone(),
        })
    }

    /// Salary API key, required for non-dry salary batches.
    pub fn rapidapi_key(&self) -> Result<&str, ConfigError> {
        self.rapidapi_key
            .as_deref()
            .ok_or(ConfigError::MissingVar("RAPIDAPI_KEY"))
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
