//! Notification channels and the glue that lets an async host drive them.
//!
//! `curl` holds the SMS channel that hands messages to an external fetch
//! tool. `dispatcher` runs any blocking `AlertPlugin` from async code.
pub mod curl;
pub mod dispatcher;

pub use curl::CurlAlertPlugin;
pub use dispatcher::{ChannelDispatcher, Notifier};
