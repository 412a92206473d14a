//! hookfmt - Forward JSON or plain text to Slack webhooks as readable YAML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hookfmt_core::{classify, Config, DisplayMode};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[cfg(feature = "delivery")]
use hookfmt_relay::adapter::FN_REQUEST_URL_HEADER;
#[cfg(feature = "delivery")]
use hookfmt_relay::{FnInvocation, InboundRequest, LambdaEvent, Relay, WebhookSink};

/// Slack webhook relay that turns JSON into annotated YAML
#[derive(Parser, Debug)]
#[command(name = "hookfmt")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to $HOOKFMT_CONFIG, then the platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Handle one serverless event and print the response
    #[cfg(feature = "delivery")]
    Invoke {
        /// Event file; reads stdin when omitted
        #[arg(long, value_name = "FILE")]
        event: Option<PathBuf>,

        /// Shape of the event
        #[arg(long, value_enum, default_value_t = Platform::Lambda)]
        platform: Platform,

        /// Request path and query for Fn invocations, e.g. "/?d=..."
        #[arg(long, value_name = "PATH")]
        url: Option<String>,
    },

    /// Forward a body to a webhook and print the response
    #[cfg(feature = "delivery")]
    Send {
        /// Destination webhook URL
        #[arg(short, long, value_name = "URL")]
        dest: String,

        /// Display mode for JSON bodies
        #[arg(short, long, value_parser = DisplayMode::from_str)]
        mode: Option<DisplayMode>,

        /// Body file; reads stdin when omitted
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Print the payload that would be sent, without sending it
    Render {
        /// Display mode for JSON bodies
        #[arg(short, long, value_parser = DisplayMode::from_str)]
        mode: Option<DisplayMode>,

        /// Body file; reads stdin when omitted
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[cfg(feature = "delivery")]
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Platform {
    /// API Gateway, Function URL or generic JSON event
    Lambda,
    /// Fn-style raw body with a request URL header
    Fn,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    log::debug!(
        "allowed destination domains: {}",
        config.destination.allowed_domains.join(", ")
    );

    match args.command {
        #[cfg(feature = "delivery")]
        Command::Invoke {
            event,
            platform,
            url,
        } => {
            let input = read_input(event.as_deref())?;
            let request = match platform {
                Platform::Lambda => {
                    let event = LambdaEvent::from_json(&input).context("Failed to parse event")?;
                    InboundRequest::from(event)
                }
                Platform::Fn => {
                    let mut invocation = FnInvocation::new(input);
                    if let Some(url) = url {
                        invocation = invocation.with_header(FN_REQUEST_URL_HEADER, url);
                    }
                    InboundRequest::from(invocation)
                }
            };
            respond(&config, &request)
        }
        #[cfg(feature = "delivery")]
        Command::Send { dest, mode, file } => {
            let body = read_input(file.as_deref())?;
            let mut request = InboundRequest::new(body).with_param("d", dest);
            if let Some(mode) = mode {
                request = request.with_param("mode", mode.as_str());
            }
            respond(&config, &request)
        }
        Command::Render { mode, file } => {
            let body = read_input(file.as_deref())?;
            let mode = mode.unwrap_or(config.defaults.mode);
            let payload = config
                .payload_builder()
                .build(&body, classify(&body), mode)
                .context("Failed to build payload")?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
    }
}

/// Run the relay and print its response; non-2xx responses fail the process.
#[cfg(feature = "delivery")]
fn respond(config: &Config, request: &InboundRequest) -> Result<()> {
    let relay = Relay::new(config, WebhookSink::new());
    let response = relay.handle(request);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        anyhow::bail!("request failed with HTTP {}", response.status_code);
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input: {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
