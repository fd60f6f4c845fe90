//! curl-alert - an SMS alert channel backed by an external fetch tool
//!
//! The library exposes the `curl` alert plugin, the seams it is built on
//! (plugin contract, command runner, formatter) and an async adapter for
//! hosts running on tokio.

pub mod cli;
pub mod command;
pub mod config;
pub mod core;
pub mod formatting;
pub mod logging;
pub mod notification;
pub mod recipients;

// Re-export core types for convenience
pub use crate::core::*;
pub use notification::{ChannelDispatcher, CurlAlertPlugin, Notifier};
