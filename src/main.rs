//! curl-alert - send one alert through the curl SMS channel.
//!
//! Prints the legacy result map as JSON on stdout (`null` when the outcome is
//! indeterminate) and exits with 0 on success, 1 on a reported failure and 2
//! when delivery could not be determined.

use anyhow::Result;
use clap::Parser;
use curl_alert::{
    cli::Cli,
    config::Config,
    logging::init_logging,
    notification::{ChannelDispatcher, CurlAlertPlugin, Notifier},
};
use std::{process::ExitCode, sync::Arc};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            init_logging("info");
            error!("Failed to load configuration: {:#}", err);
            return Ok(ExitCode::from(3));
        }
    };
    init_logging(&config.log_level);

    info!(
        curl_addr = config.channel.curl_addr.as_deref().unwrap_or("<test mode>"),
        program = %config.channel.program,
        charset = %config.channel.charset,
        "curl-alert starting"
    );

    let plugin = Arc::new(CurlAlertPlugin::with_process_runner(config.channel.clone()));
    let dispatcher = ChannelDispatcher::new(plugin);

    let outcome = dispatcher.notify(cli.alert_info()).await;

    println!("{}", serde_json::to_string(&outcome.to_result_map())?);

    let code = match outcome.status() {
        Some(true) => 0,
        Some(false) => 1,
        None => 2,
    };
    Ok(ExitCode::from(code))
}
