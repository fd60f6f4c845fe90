// src/formatting.rs

use crate::core::{AlertData, ChannelError};
use encoding_rs::Encoding;
use url::form_urlencoded;

/// Marker appended to truncated content.
pub const ELLIPSIS: &str = "...";

/// A trait for formatting an alert into the text of a single message.
pub trait TextFormatter: Send + Sync {
    fn format(&self, alert: &AlertData) -> String;
}

/// Formats alerts as short SMS texts: `【title】content`.
///
/// Double quotes are removed from the content so the message cannot break
/// out of a quoted command-line argument, and long content is cut down to
/// keep gateways from rejecting the message.
pub struct SmsTextFormatter {
    max_content_chars: usize,
}

impl SmsTextFormatter {
    pub fn new(max_content_chars: usize) -> Self {
        Self { max_content_chars }
    }

    fn sanitize(&self, content: &str) -> String {
        let stripped: String = content.chars().filter(|&c| c != '"').collect();
        if stripped.chars().count() > self.max_content_chars {
            let mut truncated: String = stripped.chars().take(self.max_content_chars).collect();
            truncated.push_str(ELLIPSIS);
            truncated
        } else {
            stripped
        }
    }
}

impl Default for SmsTextFormatter {
    fn default() -> Self {
        Self::new(250)
    }
}

impl TextFormatter for SmsTextFormatter {
    fn format(&self, alert: &AlertData) -> String {
        format!("【{}】{}", alert.title, self.sanitize(&alert.content))
    }
}

/// Converts `message` to `charset` and percent-encodes the bytes.
///
/// Uses form encoding, so spaces become `+` and `*-._` are left as is.
pub fn encode_message(message: &str, charset: &str) -> Result<String, ChannelError> {
    let encoding = Encoding::for_label(charset.trim().as_bytes())
        .ok_or_else(|| ChannelError::UnsupportedCharset(charset.to_string()))?;
    // UTF-16 and "replacement" can only be decoded, never produced.
    if encoding.output_encoding() != encoding {
        return Err(ChannelError::UnsupportedCharset(charset.to_string()));
    }

    let (bytes, _, had_errors) = encoding.encode(message);
    if had_errors {
        return Err(ChannelError::Unrepresentable(encoding.name().to_string()));
    }
    Ok(form_urlencoded::byte_serialize(&bytes).collect())
}
