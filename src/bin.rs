//! Binary entry point for `support-triage-bot`.
//!
//! This module provides the command-line interface for support-triage-bot with options
//! for configuration file paths and logging verbosity.  By default it serves the A2A
//! endpoints; the `classify` subcommand triages a single message and prints the result.

use clap::{Parser, Subcommand};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use support_triage_bot::{
    base::{config::Config, types::Void},
    interaction::triage,
    runtime::Runtime,
};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Support-triage-bot – an urgency triage agent for Telex support channels.
///
/// Configuration can come from `config.toml` or `TRIAGE_BOT_*` environment variables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the bot will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export spans over OTLP (HTTP) in addition to logging them.
    #[arg(long)]
    otlp: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the A2A endpoints (the default).
    Serve,
    /// Triage a single message and print the formatted response.
    Classify {
        /// The support message to triage.
        message: String,
        /// Skip the LLM and use keyword matching only.
        #[arg(long)]
        offline: bool,
    },
}

/// Main entry point for the support-triage-bot binary.
///
/// Sets up logging based on verbosity, loads configuration, and runs the command.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer, if requested.

    let otel = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder()
            .with_simple_exporter(exporter)
            .build()
            .tracer("support-triage-bot");
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    let config = Config::load(args.config.as_deref())?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => support_triage_bot::start(config).await,
        Command::Classify { message, offline } => {
            support_triage_bot::install_crypto_provider();

            let runtime = if offline { Runtime::with_llm(config, None) } else { Runtime::new(config)? };
            let outcome = triage::run(&runtime.triage, &message).await?;

            println!("{} {}", outcome.formatted.visual_indicator, outcome.formatted.summary);
            println!("{}", outcome.formatted.telex_response);

            Ok(())
        }
    }
}
