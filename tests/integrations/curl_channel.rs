//! End-to-end behaviour of the curl channel against a mock command runner.

use curl_alert::{
    config::ChannelConfig,
    core::{AlertPlugin, DispatchOutcome},
    notification::curl::{CurlAlertPlugin, ENCODE_FAILED_MESSAGE, NO_RECEIVER_MESSAGE},
};
use std::sync::Arc;
use url::form_urlencoded;

#[path = "../helpers/mod.rs"]
mod helpers;
use helpers::{alert, mock_runner::MockRunner};

const GATEWAY: &str = "http://sms.local/send?content=message&mobiles=12345678xxx";

fn gateway_plugin(runner: &MockRunner) -> CurlAlertPlugin {
    let config = ChannelConfig {
        curl_addr: Some(GATEWAY.to_string()),
        ..Default::default()
    };
    CurlAlertPlugin::new(config, Arc::new(runner.clone()))
}

/// Decodes the `content` and `mobiles` query parameters of a rendered URL.
fn decode_url(url: &str) -> (String, String) {
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
    let mut content = String::new();
    let mut mobiles = String::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "content" => content = value.into_owned(),
            "mobiles" => mobiles = value.into_owned(),
            _ => {}
        }
    }
    (content, mobiles)
}

#[test]
fn test_spec_example_in_test_mode() {
    let runner = MockRunner::replying("Test\n");
    let plugin = CurlAlertPlugin::new(ChannelConfig::default(), Arc::new(runner.clone()));
    let content = "x".repeat(40);

    let outcome = plugin.process(&alert("13800000000@x.com,bad@x.com", "", &content));

    assert_eq!(outcome, DispatchOutcome::success("Test\n"));
    assert_eq!(runner.calls(), vec![vec!["echo".to_string(), "Test".to_string()]]);
}

#[test]
fn test_phone_set_merges_all_sources_without_duplicates() {
    let runner = MockRunner::replying("ok");
    let plugin = gateway_plugin(&runner);
    let info = alert(
        "13900000000@x.com,1390000000@x.com",
        "13800000000@y.com,13900000000@y.com",
        "hi",
    )
    .with_prop_receivers(["13700000000@corp.com", "13800000000@corp.com", "ops@corp.com"]);

    let outcome = plugin.process(&info);

    assert_eq!(outcome.status(), Some(true));
    let (_, mobiles) = decode_url(&runner.single_url());
    assert_eq!(mobiles, "13700000000/13800000000/13900000000");
}

#[test]
fn test_no_valid_phone_is_always_reported() {
    for content in ["", "short", "y".repeat(1000).as_str()] {
        let runner = MockRunner::replying("ok");
        let plugin = gateway_plugin(&runner);

        let outcome = plugin.process(&alert("alice@x.com", "bob@x.com,", content));

        assert_eq!(outcome, DispatchOutcome::failed(NO_RECEIVER_MESSAGE));
        assert_eq!(
            outcome.to_result_map().unwrap()["message"],
            "At least one receiver address required."
        );
        assert!(runner.calls().is_empty());
    }
}

#[test]
fn test_empty_receivers_is_reported() {
    let runner = MockRunner::replying("ok");
    let plugin = gateway_plugin(&runner);

    let outcome = plugin.process(&alert("", "", "hi"));

    assert_eq!(outcome.to_result_map().unwrap()["status"], "false");
}

#[test]
fn test_long_content_is_truncated_to_limit() {
    let runner = MockRunner::replying("ok");
    let plugin = gateway_plugin(&runner);
    let content = "告".repeat(300);

    plugin.process(&alert("13800000000@x.com", "", &content));

    let (message, _) = decode_url(&runner.single_url());
    assert_eq!(message, format!("【T】{}...", "告".repeat(250)));
}

#[test]
fn test_short_content_passes_through() {
    let runner = MockRunner::replying("ok");
    let plugin = gateway_plugin(&runner);
    let content = "CPU > 90% on host-1 & host-2; see https://grafana/d/abc?x=1";

    plugin.process(&alert("13800000000@x.com", "", content));

    let (message, _) = decode_url(&runner.single_url());
    assert_eq!(message, format!("【T】{}", content));
}

#[test]
fn test_quotes_are_removed_before_truncation_and_encoding() {
    let runner = MockRunner::replying("ok");
    let plugin = gateway_plugin(&runner);
    // 300 characters, 60 of them quotes: 240 remain, so nothing is cut.
    let content = "ab\"cd\"e".repeat(30) + &"z".repeat(90);
    assert_eq!(content.chars().count(), 300);

    plugin.process(&alert("13800000000@x.com", "", &content));

    let url = runner.single_url();
    assert!(!url.contains('"'));
    assert!(!url.contains("%22"));
    let (message, _) = decode_url(&url);
    assert_eq!(message, format!("【T】{}", content.replace('"', "")));
}

#[test]
fn test_malformed_address_skips_invocation() {
    for addr in [
        "http://sms.local/send?content=message",
        "http://sms.local/send?mobiles=12345678xxx",
        "http://sms.local/send",
    ] {
        let runner = MockRunner::replying("ok");
        let config = ChannelConfig {
            curl_addr: Some(addr.to_string()),
            ..Default::default()
        };
        let plugin = CurlAlertPlugin::new(config, Arc::new(runner.clone()));

        let outcome = plugin.process(&alert("13800000000@x.com", "", "hi"));

        assert_eq!(outcome, DispatchOutcome::success(""));
        assert!(runner.calls().is_empty());
    }
}

#[test]
fn test_spawn_failure_is_indeterminate() {
    let runner = MockRunner::failing_to_spawn();
    let plugin = gateway_plugin(&runner);

    let outcome = plugin.process(&alert("13800000000@x.com", "", "hi"));

    assert!(matches!(outcome, DispatchOutcome::Indeterminate { .. }));
    assert!(outcome.message().contains("No such file or directory"));
    assert!(outcome.to_result_map().is_none());
}

#[test]
fn test_gbk_gateway_receives_gbk_bytes() {
    let runner = MockRunner::replying("ok");
    let config = ChannelConfig {
        curl_addr: Some(GATEWAY.to_string()),
        charset: "GBK".to_string(),
        ..Default::default()
    };
    let plugin = CurlAlertPlugin::new(config, Arc::new(runner.clone()));

    plugin.process(&alert("13800000000@x.com", "", "ok"));

    assert_eq!(
        runner.single_url(),
        "http://sms.local/send?content=%A1%BET%A1%BFok&mobiles=13800000000"
    );
}

#[test]
fn test_unrepresentable_message_is_encode_failure() {
    let runner = MockRunner::replying("ok");
    let config = ChannelConfig {
        curl_addr: Some(GATEWAY.to_string()),
        charset: "windows-1252".to_string(),
        ..Default::default()
    };
    let plugin = CurlAlertPlugin::new(config, Arc::new(runner.clone()));

    let outcome = plugin.process(&alert("13800000000@x.com", "", "磁盘已满"));

    assert_eq!(outcome, DispatchOutcome::failed(ENCODE_FAILED_MESSAGE));
    assert!(runner.calls().is_empty());
}

#[cfg(unix)]
#[test]
fn test_test_mode_with_real_process() {
    let plugin = CurlAlertPlugin::with_process_runner(ChannelConfig::default());

    let outcome = plugin.process(&alert("13800000000@x.com", "", "hi"));

    assert_eq!(outcome, DispatchOutcome::success("Test\n"));
}

#[cfg(unix)]
#[test]
fn test_invoke_with_real_process_captures_output() {
    // `echo` stands in for curl and prints the rendered address.
    let config = ChannelConfig {
        curl_addr: Some(GATEWAY.to_string()),
        program: "echo".to_string(),
        args: vec![],
        ..Default::default()
    };
    let plugin = CurlAlertPlugin::with_process_runner(config);

    let outcome = plugin.process(&alert("13800000000@x.com", "", "a b"));

    assert_eq!(
        outcome,
        DispatchOutcome::success(
            "http://sms.local/send?content=%E3%80%90T%E3%80%91a+b&mobiles=13800000000\n"
        )
    );
}
