//! Configuration management for the curl alert channel
//!
//! This module defines the main `Config` struct and its sub-structs. It uses
//! the `figment` crate to layer built-in defaults, an optional TOML file,
//! environment variables and command-line overrides.

use crate::cli::Cli;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Example delivery address shown when `curl_addr` is malformed.
pub const EXAMPLE_CURL_ADDR: &str =
    "http://ip:port/sms/getReport?content=message&mobilesStr=12345678xxx";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Settings for the curl channel itself.
    pub channel: ChannelConfig,
}

/// Settings for the curl channel.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChannelConfig {
    /// Delivery address template. When absent the channel runs in test mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curl_addr: Option<String>,
    /// Literal token in `curl_addr` replaced by the encoded message.
    pub message_placeholder: String,
    /// Literal token in `curl_addr` replaced by the joined phone numbers.
    pub receivers_placeholder: String,
    /// Program used to fetch the delivery address.
    pub program: String,
    /// Arguments passed before the address, e.g. `["-s", "--max-time", "10"]`.
    pub args: Vec<String>,
    /// Charset the message is converted to before percent-encoding.
    pub charset: String,
    /// Content longer than this many characters is truncated.
    pub max_content_chars: usize,
    /// Exact length of an accepted phone number.
    pub phone_length: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            curl_addr: None,
            message_placeholder: "message".to_string(),
            receivers_placeholder: "12345678xxx".to_string(),
            program: "curl".to_string(),
            args: vec!["-s".to_string()],
            charset: "UTF-8".to_string(),
            max_content_chars: 250,
            phone_length: 11,
        }
    }
}

impl ChannelConfig {
    /// Checks the settings that must hold regardless of `curl_addr`.
    ///
    /// A `curl_addr` missing its placeholders is not rejected here; the
    /// channel detects that when it sends.
    pub fn validate(&self) -> Result<()> {
        if self.message_placeholder.is_empty() || self.receivers_placeholder.is_empty() {
            bail!("channel placeholders must not be empty");
        }
        if self.message_placeholder == self.receivers_placeholder {
            bail!(
                "message and receivers placeholders must differ (both are '{}')",
                self.message_placeholder
            );
        }
        if self.program.trim().is_empty() {
            bail!("channel.program must not be empty");
        }
        if self.phone_length == 0 {
            bail!("channel.phone_length must be greater than zero");
        }
        if self.max_content_chars == 0 {
            bail!("channel.max_content_chars must be greater than zero");
        }
        Ok(())
    }
}

impl Config {
    /// Loads the configuration, layering defaults, the file named by
    /// `--config`, `CURL_ALERT_` environment variables and CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment
            // e.g. CURL_ALERT_CHANNEL__CURL_ADDR=http://...
            .merge(Env::prefixed("CURL_ALERT_").split("__"))
            .merge(cli.clone())
            .extract()?;
        config.channel.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            channel: ChannelConfig::default(),
        }
    }
}
