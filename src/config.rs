use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::constants::DEFAULT_BASE_URL;
use crate::models::FilterMode;
use crate::source::BrowserOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Target
    pub username: String,
    pub base_url: String,
    pub advance_limit: u32,
    pub filter_mode: FilterMode,

    // Output
    pub output_dir: PathBuf,
    pub output_format: OutputFormat,

    // Browser
    pub chrome_path: Option<String>,
    pub headless: bool,
    pub page_timeout: Duration,
    pub initial_load_delay: Duration,
    pub advance_delay: Duration,

    // Offline replay
    pub replay_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `username_override` (typically the first CLI argument) takes precedence
    /// over `SCRAPE_USERNAME`.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env(username_override: Option<String>) -> Result<Self, ConfigError> {
        let username = match username_override.filter(|u| !u.is_empty()) {
            Some(username) => username,
            None => required_env("SCRAPE_USERNAME")?,
        };

        Ok(Self {
            // Target
            username,
            base_url: env_or_default("NITTER_BASE_URL", DEFAULT_BASE_URL),
            advance_limit: parse_env_u32("SCRAPE_ADVANCES", 20)?,
            filter_mode: parse_filter_mode(&env_or_default("SCRAPE_FILTER_MODE", "original"))?,

            // Output
            output_dir: PathBuf::from(env_or_default("OUTPUT_DIR", ".")),
            output_format: parse_output_format(&env_or_default("OUTPUT_FORMAT", "csv"))?,

            // Browser
            chrome_path: optional_env("CHROME_PATH"),
            headless: parse_env_bool("BROWSER_HEADLESS", true)?,
            page_timeout: Duration::from_secs(parse_env_u64("PAGE_TIMEOUT_SECS", 10)?),
            initial_load_delay: Duration::from_millis(parse_env_u64("INITIAL_LOAD_DELAY_MS", 5000)?),
            advance_delay: Duration::from_millis(parse_env_u64("ADVANCE_DELAY_MS", 3000)?),

            // Offline replay
            replay_dir: optional_env("REPLAY_DIR").map(PathBuf::from),
        })
    }

    /// Configuration with fast timings and no browser dependency, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            username: "testuser".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            advance_limit: 2,
            filter_mode: FilterMode::Original,
            output_dir: PathBuf::from("."),
            output_format: OutputFormat::Csv,
            chrome_path: None,
            headless: true,
            page_timeout: Duration::from_secs(1),
            initial_load_delay: Duration::ZERO,
            advance_delay: Duration::ZERO,
            replay_dir: None,
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "SCRAPE_USERNAME".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.username.contains('/') || self.username.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                name: "SCRAPE_USERNAME".to_string(),
                message: format!("'{}' is not a valid account name", self.username),
            });
        }
        if self.advance_limit == 0 {
            return Err(ConfigError::InvalidValue {
                name: "SCRAPE_ADVANCES".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "NITTER_BASE_URL".to_string(),
                message: format!("'{}' is not a valid URL", self.base_url),
            });
        }
        Ok(())
    }

    /// Timeline URL for the configured account.
    #[must_use]
    pub fn timeline_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.username)
    }

    /// Export file path, e.g. `./jack_tweets.csv`.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}_tweets.{}",
            self.username,
            self.output_format.extension()
        ))
    }

    #[must_use]
    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            chrome_path: self.chrome_path.clone(),
            headless: self.headless,
            page_timeout: self.page_timeout,
            initial_load_delay: self.initial_load_delay,
            advance_delay: self.advance_delay,
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

fn parse_filter_mode(value: &str) -> Result<FilterMode, ConfigError> {
    value.parse().map_err(|e: crate::models::FilterModeError| ConfigError::InvalidValue {
        name: "SCRAPE_FILTER_MODE".to_string(),
        message: e.to_string(),
    })
}

fn parse_output_format(value: &str) -> Result<OutputFormat, ConfigError> {
    match value.to_lowercase().as_str() {
        "csv" => Ok(OutputFormat::Csv),
        "json" => Ok(OutputFormat::Json),
        _ => Err(ConfigError::InvalidValue {
            name: "OUTPUT_FORMAT".to_string(),
            message: format!("must be 'csv' or 'json', got '{value}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_mode() {
        assert_eq!(parse_filter_mode("original").unwrap(), FilterMode::Original);
        assert_eq!(
            parse_filter_mode("ORIGINAL_AND_QUOTES").unwrap(),
            FilterMode::OriginalAndQuotes
        );
        assert_eq!(parse_filter_mode("all").unwrap(), FilterMode::All);
        assert!(matches!(
            parse_filter_mode("replies"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("csv").unwrap(), OutputFormat::Csv);
        assert_eq!(parse_output_format("JSON").unwrap(), OutputFormat::Json);
        assert!(parse_output_format("xml").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_env_bool("NONEXISTENT_VAR", true).unwrap());
        assert!(!parse_env_bool("NONEXISTENT_VAR", false).unwrap());
    }

    #[test]
    fn test_validate() {
        assert!(Config::for_testing().validate().is_ok());

        let zero = Config {
            advance_limit: 0,
            ..Config::for_testing()
        };
        assert!(zero.validate().is_err());

        let bad_user = Config {
            username: "a/b".to_string(),
            ..Config::for_testing()
        };
        assert!(bad_user.validate().is_err());

        let bad_url = Config {
            base_url: "not a url".to_string(),
            ..Config::for_testing()
        };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_paths() {
        let config = Config {
            username: "jack".to_string(),
            base_url: "https://nitter.example/".to_string(),
            output_dir: PathBuf::from("out"),
            output_format: OutputFormat::Json,
            ..Config::for_testing()
        };
        assert_eq!(config.timeline_url(), "https://nitter.example/jack");
        assert_eq!(config.output_path(), PathBuf::from("out/jack_tweets.json"));
    }
}
