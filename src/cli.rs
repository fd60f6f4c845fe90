//! Command-Line Interface (CLI) argument parsing.
//!
//! The binary sends a single alert through the curl channel. Arguments
//! describe the alert; the few configuration flags are merged over the TOML
//! file and environment through the `Provider` impl below.

use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

use crate::core::{AlertData, AlertInfo};

/// Send an alert as an SMS through an HTTP gateway fetched with curl.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Alert title.
    #[arg(long, default_value = "")]
    pub title: String,

    /// Alert content.
    #[arg(long, default_value = "")]
    pub content: String,

    /// Comma-separated receiver addresses.
    #[arg(long, default_value = "")]
    pub receivers: String,

    /// Comma-separated carbon-copy addresses.
    #[arg(long, default_value = "")]
    pub receivers_cc: String,

    /// An address from the alert group, may be repeated.
    #[arg(long = "prop-receiver", value_name = "ADDR")]
    pub prop_receivers: Vec<String>,

    /// Delivery address template, overrides `channel.curl_addr`.
    #[arg(long, value_name = "URL")]
    pub curl_addr: Option<String>,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Builds the alert described by the arguments.
    pub fn alert_info(&self) -> AlertInfo {
        AlertInfo::new(AlertData {
            title: self.title.clone(),
            content: self.content.clone(),
            receivers: self.receivers.clone(),
            receivers_cc: self.receivers_cc.clone(),
        })
        .with_prop_receivers(self.prop_receivers.iter().cloned())
    }
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(addr) = &self.curl_addr {
            let mut channel = Dict::new();
            channel.insert("curl_addr".into(), Value::from(addr.clone()));
            dict.insert("channel".into(), Value::Dict(Tag::Default, channel));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
