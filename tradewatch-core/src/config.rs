//! Run context from the environment and tunables from an optional TOML file.
//!
//! The run context is read fresh on every tick and never validated: unset
//! variables become empty strings. The TOML file only carries operational
//! knobs (schedule, timeouts, mail endpoint), never credentials.

use crate::layout::ScratchLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable names.
pub mod keys {
    pub const ARCHIVE_URL: &str = "TRADES_ZIP_URL";
    pub const TRADER_NAME: &str = "TRADER_NAME";
    pub const FROM_EMAIL: &str = "FROM_EMAIL";
    pub const TO_EMAIL: &str = "TO_EMAIL";
    pub const PDF_BASE_URL: &str = "PDF_BASE_URL";
    pub const MAIL_API_KEY: &str = "SENDGRID_API_KEY";
    pub const TRADES_DIR: &str = "TRADES_DIR";
    pub const FETCH_DOCUMENTS: &str = "FETCH_DOCUMENTS";
}

pub const DEFAULT_TRADES_DIR: &str = "trades";
pub const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything one run needs to know, captured once at the start of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub archive_url: String,
    pub trader_name: String,
    pub from_email: String,
    pub to_email: String,
    pub pdf_base_url: String,
    pub mail_api_key: String,
    pub trades_dir: PathBuf,
    pub fetch_documents: bool,
}

impl RunContext {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a context from any key lookup; missing keys read as empty strings.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();

        let trades_dir = lookup(keys::TRADES_DIR)
            .filter(|dir| !dir.is_empty())
            .unwrap_or_else(|| DEFAULT_TRADES_DIR.to_string());

        Self {
            archive_url: get(keys::ARCHIVE_URL),
            trader_name: get(keys::TRADER_NAME),
            from_email: get(keys::FROM_EMAIL),
            to_email: get(keys::TO_EMAIL),
            pdf_base_url: get(keys::PDF_BASE_URL),
            mail_api_key: get(keys::MAIL_API_KEY),
            trades_dir: PathBuf::from(trades_dir),
            fetch_documents: is_truthy(&get(keys::FETCH_DOCUMENTS)),
        }
    }

    /// Scratch paths for this run, derived from the trades dir and archive URL.
    pub fn layout(&self) -> ScratchLayout {
        ScratchLayout::for_archive_url(&self.trades_dir, &self.archive_url)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Operational settings loaded from a TOML file. Every table is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub schedule: ScheduleConfig,
    pub fetch: FetchConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between scheduled ticks.
    pub interval_secs: u64,
    /// Fire a tick immediately instead of waiting one interval.
    pub run_on_startup: bool,
    /// A tick firing later than this after its slot is reported as past due.
    pub past_due_grace_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 2 * 60 * 60,
            run_on_startup: false,
            past_due_grace_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub api_url: String,
    /// Overall timeout for one send request.
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: SENDGRID_SEND_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl WatchConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: WatchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "schedule.interval_secs must be positive".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch.timeout_secs must be positive".into(),
            ));
        }
        if self.mail.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "mail.timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_keys_default_to_empty_strings() {
        let ctx = RunContext::from_lookup(|_| None);
        assert_eq!(ctx.archive_url, "");
        assert_eq!(ctx.trader_name, "");
        assert_eq!(ctx.mail_api_key, "");
        assert_eq!(ctx.trades_dir, PathBuf::from(DEFAULT_TRADES_DIR));
        assert!(!ctx.fetch_documents);
    }

    #[test]
    fn reads_every_key() {
        let ctx = RunContext::from_lookup(lookup_from(&[
            (keys::ARCHIVE_URL, "https://example.test/2025FD.zip"),
            (keys::TRADER_NAME, "Pelosi"),
            (keys::FROM_EMAIL, "bot@example.test"),
            (keys::TO_EMAIL, "me@example.test"),
            (keys::PDF_BASE_URL, "https://example.test/pdfs/"),
            (keys::MAIL_API_KEY, "SG.key"),
            (keys::TRADES_DIR, "/tmp/watch"),
            (keys::FETCH_DOCUMENTS, "true"),
        ]));
        assert_eq!(ctx.trader_name, "Pelosi");
        assert_eq!(ctx.to_email, "me@example.test");
        assert_eq!(ctx.trades_dir, PathBuf::from("/tmp/watch"));
        assert!(ctx.fetch_documents);
        assert!(ctx.layout().archive_path().ends_with("2025FD.zip"));
    }

    #[test]
    fn trader_name_is_not_trimmed_or_validated() {
        let ctx = RunContext::from_lookup(lookup_from(&[(keys::TRADER_NAME, " alice ")]));
        assert_eq!(ctx.trader_name, " alice ");
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = WatchConfig::from_toml("").unwrap();
        assert_eq!(config, WatchConfig::default());
        assert_eq!(config.schedule.interval_secs, 7200);
        assert_eq!(config.mail.api_url, SENDGRID_SEND_URL);
    }

    #[test]
    fn partial_toml_overrides_only_given_fields() {
        let config = WatchConfig::from_toml(
            r#"
[schedule]
interval_secs = 21600
run_on_startup = true

[fetch]
timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(config.schedule.interval_secs, 21600);
        assert!(config.schedule.run_on_startup);
        assert_eq!(config.schedule.past_due_grace_secs, 60);
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.connect_timeout_secs, 10);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = WatchConfig::from_toml("[schedule]\ninterval_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn mail_table_sets_endpoint_and_timeout() {
        let config = WatchConfig::from_toml(
            "[mail]\napi_url = \"http://localhost:3030/send\"\ntimeout_secs = 5\n",
        )
        .unwrap();
        assert_eq!(config.mail.api_url, "http://localhost:3030/send");
        assert_eq!(config.mail.timeout_secs, 5);

        let defaults = WatchConfig::from_toml("").unwrap();
        assert_eq!(defaults.mail.timeout_secs, 30);
    }

    #[test]
    fn zero_mail_timeout_is_rejected() {
        let err = WatchConfig::from_toml("[mail]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = WatchConfig::from_toml("[schedule\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
