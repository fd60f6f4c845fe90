//! An SMS channel that delivers alerts by fetching a gateway URL with curl.

use crate::command::{plan_command, CommandPlan, ProcessRunner};
use crate::config::{ChannelConfig, EXAMPLE_CURL_ADDR};
use crate::core::{AlertInfo, AlertPlugin, CommandRunner, DispatchOutcome, PluginName};
use crate::formatting::{encode_message, SmsTextFormatter, TextFormatter};
use crate::recipients::{join_phones, merge_receivers, resolve_phones, PhoneExtractor};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Reason reported when no address yields a phone number.
pub const NO_RECEIVER_MESSAGE: &str = "At least one receiver address required.";
/// Reason reported when the message cannot be percent-encoded.
pub const ENCODE_FAILED_MESSAGE: &str = "encode message failed.";

/// The `curl` alert plugin.
pub struct CurlAlertPlugin {
    name: PluginName,
    config: ChannelConfig,
    formatter: Box<dyn TextFormatter>,
    extractor: PhoneExtractor,
    runner: Arc<dyn CommandRunner>,
}

impl CurlAlertPlugin {
    /// Routing identifier of this channel.
    pub const ID: &'static str = "curl";

    /// Creates a plugin that runs its delivery command through `runner`.
    pub fn new(config: ChannelConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            name: PluginName {
                english: Self::ID.to_string(),
                chinese: Self::ID.to_string(),
            },
            formatter: Box::new(SmsTextFormatter::new(config.max_content_chars)),
            extractor: PhoneExtractor::new(config.phone_length),
            config,
            runner,
        }
    }

    /// Creates a plugin that spawns real child processes.
    pub fn with_process_runner(config: ChannelConfig) -> Self {
        Self::new(config, Arc::new(ProcessRunner))
    }

    /// Replaces the message formatter.
    pub fn with_formatter(mut self, formatter: Box<dyn TextFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    fn deliver(&self, encoded: &str, phones: &str) -> DispatchOutcome {
        let argv = match plan_command(&self.config, encoded, phones) {
            CommandPlan::Test(argv) => {
                info!(%encoded, %phones, "No curl_addr configured, testing only");
                argv
            }
            CommandPlan::Skip => {
                // Reported as success with an empty message, which hides the
                // misconfiguration from the host. Kept for compatibility.
                warn!(
                    curl_addr = self.config.curl_addr.as_deref().unwrap_or_default(),
                    example = EXAMPLE_CURL_ADDR,
                    "curl_addr format is wrong, message not sent"
                );
                return DispatchOutcome::success("");
            }
            CommandPlan::Invoke(argv) => argv,
        };

        match self.runner.run(&argv) {
            Ok(response) => {
                info!(response = %response.trim_end(), "Delivery command finished");
                DispatchOutcome::success(response)
            }
            Err(e) => {
                error!(error = %e, "Delivery command failed");
                DispatchOutcome::indeterminate(e.to_string())
            }
        }
    }
}

impl AlertPlugin for CurlAlertPlugin {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &PluginName {
        &self.name
    }

    #[instrument(skip_all, fields(plugin = "curl", title = %info.alert_data.title))]
    fn process(&self, info: &AlertInfo) -> DispatchOutcome {
        let alert = &info.alert_data;

        let receivers = merge_receivers(info);
        let phones = resolve_phones(&receivers, &self.extractor);
        if phones.is_empty() {
            warn!(content = %alert.content, "No receiver phone number, alert not sent");
            return DispatchOutcome::failed(NO_RECEIVER_MESSAGE);
        }
        let phones = join_phones(&phones);

        let message = self.formatter.format(alert);
        info!(%phones, sms = %message, "Message will be sent");

        let encoded = match encode_message(&message, &self.config.charset) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(error = %e, charset = %self.config.charset, "Failed to encode message");
                return DispatchOutcome::failed(ENCODE_FAILED_MESSAGE);
            }
        };

        self.deliver(&encoded, &phones)
    }
}
