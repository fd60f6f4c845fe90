//! Core domain types and service traits for the curl alert channel
//!
//! This module defines the alert data handed to the channel by the host,
//! the outcome reported back, and the trait contracts at the two seams of
//! the channel: the host-facing plugin contract and the process boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Property key holding the alert group's existing receiver addresses.
pub const RECEIVERS_PROP: &str = "receivers";

/// The alert event as produced by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AlertData {
    /// Short alert title, wrapped in brackets in the outgoing message
    pub title: String,
    /// Alert body, possibly long and containing quotes
    pub content: String,
    /// Comma-separated receiver addresses
    #[serde(default)]
    pub receivers: String,
    /// Comma-separated carbon-copy addresses
    #[serde(default)]
    pub receivers_cc: String,
}

/// An alert together with the channel-scoped property bag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AlertInfo {
    pub alert_data: AlertData,
    #[serde(default)]
    pub props: BTreeMap<String, Value>,
}

impl AlertInfo {
    /// Creates an `AlertInfo` with an empty property bag.
    pub fn new(alert_data: AlertData) -> Self {
        Self {
            alert_data,
            props: BTreeMap::new(),
        }
    }

    /// Sets the `receivers` property to the given addresses.
    pub fn with_prop_receivers<I, S>(mut self, receivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = receivers
            .into_iter()
            .map(|r| Value::String(r.into()))
            .collect();
        self.props.insert(RECEIVERS_PROP.to_string(), Value::Array(list));
        self
    }

    /// Returns the addresses stored under the `receivers` property.
    ///
    /// A missing or non-array property yields nothing, and non-string
    /// entries are skipped.
    pub fn prop_receivers(&self) -> Vec<String> {
        match self.props.get(RECEIVERS_PROP) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Display names of a plugin, one per supported locale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginName {
    pub english: String,
    pub chinese: String,
}

/// The result of one dispatch attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The channel delivered (or deliberately skipped) the message.
    Success { message: String },
    /// The channel refused to send; the caller can proceed normally.
    Failed { reason: String },
    /// The external process could not be run or read, so delivery is unknown.
    Indeterminate { reason: String },
}

impl DispatchOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn indeterminate(reason: impl Into<String>) -> Self {
        Self::Indeterminate {
            reason: reason.into(),
        }
    }

    /// `Some(true)` on success, `Some(false)` on failure, `None` when unknown.
    pub fn status(&self) -> Option<bool> {
        match self {
            Self::Success { .. } => Some(true),
            Self::Failed { .. } => Some(false),
            Self::Indeterminate { .. } => None,
        }
    }

    /// The message or reason carried by the outcome.
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message } => message,
            Self::Failed { reason } | Self::Indeterminate { reason } => reason,
        }
    }

    /// Converts the outcome into the cross-plugin result schema.
    ///
    /// Hosts expecting `{"status": "true"|"false", "message": ...}` get that
    /// map; an indeterminate outcome has no map at all.
    pub fn to_result_map(&self) -> Option<BTreeMap<String, String>> {
        let status = self.status()?;
        let mut map = BTreeMap::new();
        map.insert("status".to_string(), status.to_string());
        map.insert("message".to_string(), self.message().to_string());
        Some(map)
    }
}

/// Errors raised inside the channel before they are folded into an outcome.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("no command to run")]
    EmptyCommand,

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read output of `{program}`: {source}")]
    Read {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    #[error("message cannot be represented in {0}")]
    Unrepresentable(String),

    #[error("dispatch task failed: {0}")]
    Join(String),
}

// =============================================================================
// Service Traits
// =============================================================================

/// The contract a notification channel exposes to the dispatch host.
pub trait AlertPlugin: Send + Sync {
    /// Stable machine-readable identifier used for routing.
    fn id(&self) -> &str;

    /// Human-readable display names.
    fn name(&self) -> &PluginName;

    /// Sends one alert and reports what happened.
    ///
    /// This call blocks until any external delivery process has finished.
    fn process(&self, info: &AlertInfo) -> DispatchOutcome;
}

/// Runs an external command and captures its standard output.
pub trait CommandRunner: Send + Sync {
    /// Runs `argv[0]` with the remaining arguments.
    ///
    /// # Returns
    /// * `Ok(String)` with every stdout line followed by a newline
    /// * `Err` if the command is empty, cannot be started, or its output
    ///   cannot be read
    fn run(&self, argv: &[String]) -> Result<String, ChannelError>;
}
