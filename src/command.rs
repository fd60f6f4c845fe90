//! Building and running the delivery command.
//!
//! The channel never talks to the network itself. It renders the configured
//! delivery address and hands an argument vector to a `CommandRunner`.

use crate::config::ChannelConfig;
use crate::core::{ChannelError, CommandRunner};
use std::io::{self, BufRead, BufReader};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// What the channel will do with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPlan {
    /// No delivery address configured: run a harmless echo instead.
    Test(Vec<String>),
    /// The delivery address lacks a placeholder: send nothing.
    Skip,
    /// Fetch the rendered delivery address.
    Invoke(Vec<String>),
}

/// Chooses the command for an encoded message and joined phone numbers.
pub fn plan_command(config: &ChannelConfig, encoded_message: &str, phones: &str) -> CommandPlan {
    let Some(address) = config.curl_addr.as_deref() else {
        return CommandPlan::Test(vec!["echo".to_string(), "Test".to_string()]);
    };

    if !address.contains(&config.message_placeholder)
        || !address.contains(&config.receivers_placeholder)
    {
        return CommandPlan::Skip;
    }

    let url = render_template(
        address,
        &[
            (config.message_placeholder.as_str(), encoded_message),
            (config.receivers_placeholder.as_str(), phones),
        ],
    );

    let mut argv = Vec::with_capacity(config.args.len() + 2);
    argv.push(config.program.clone());
    argv.extend(config.args.iter().cloned());
    argv.push(url);
    CommandPlan::Invoke(argv)
}

/// Replaces every placeholder occurrence in one left-to-right pass.
///
/// Substituted text is never scanned again, so a message that happens to
/// contain a placeholder token is inserted verbatim. Chained `replace` calls
/// would rewrite a receivers token inside the message with the phone list.
/// When two placeholders start at the same position the longer one wins.
pub fn render_template(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let next = substitutions
            .iter()
            .filter(|(placeholder, _)| !placeholder.is_empty())
            .filter_map(|&(placeholder, value)| {
                rest.find(placeholder).map(|idx| (idx, placeholder, value))
            })
            .min_by_key(|&(idx, placeholder, _)| (idx, std::cmp::Reverse(placeholder.len())));

        match next {
            Some((idx, placeholder, value)) => {
                out.push_str(&rest[..idx]);
                out.push_str(value);
                rest = &rest[idx + placeholder.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Runs commands as child processes of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, argv: &[String]) -> Result<String, ChannelError> {
        let (program, args) = argv.split_first().ok_or(ChannelError::EmptyCommand)?;
        debug!(%program, ?args, "Starting delivery command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ChannelError::Spawn {
                program: program.clone(),
                source,
            })?;

        let read_error = |source: io::Error| ChannelError::Read {
            program: program.clone(),
            source,
        };

        let output = match child.stdout.take() {
            Some(stdout) => read_lines(stdout),
            None => Err(io::Error::other("stdout was not captured")),
        };
        let output = match output {
            Ok(output) => output,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(read_error(e));
            }
        };

        let status = child.wait().map_err(read_error)?;
        if !status.success() {
            warn!(%program, %status, "Delivery command exited unsuccessfully");
        }
        Ok(output)
    }
}

/// Reads `reader` to the end, terminating every line with `\n`.
fn read_lines<R: io::Read>(reader: R) -> io::Result<String> {
    let mut reader = BufReader::new(reader);
    let mut output = String::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(output);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        output.push_str(&String::from_utf8_lossy(&line));
        output.push('\n');
    }
}
