//! SIG welcome bot CLI
//!
//! Handles one newly opened issue or merge request: finds the owning SIG,
//! mentions its maintainers and committers in a welcome comment and labels
//! the event with the SIG.

use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode as StdExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Args;
use cli::config::{ExitCode, ValidatedConfig, create_octocrab};
use cli::dry_run::DryRunWriter;
use cli::github::OctocrabClient;
use cli::output::WelcomeReport;
use sig_welcome_core::WelcomeHandler;

#[tokio::main]
async fn main() -> StdExitCode {
    // Parse command-line arguments
    let args = Args::parse();

    init_tracing(args.verbose, args.json);

    // Set up signal handling for graceful shutdown
    let terminated = Arc::new(AtomicBool::new(false));
    let terminated_clone = terminated.clone();

    tokio::spawn(async move {
        let ctrl_c = signal::ctrl_c();
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT, shutting down...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down...");
            }
        }

        terminated_clone.store(true, Ordering::SeqCst);
    });

    let exit_code = run(args, &terminated).await;

    // Check if we were terminated by signal
    if terminated.load(Ordering::SeqCst) {
        return StdExitCode::from(ExitCode::Terminated as u8);
    }

    StdExitCode::from(i32::from(exit_code) as u8)
}

/// Initialize tracing based on verbosity level.
fn init_tracing(verbosity: u8, json_output: bool) {
    // Don't output logs when using JSON output mode
    if json_output {
        return;
    }

    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["octocrab=warn", "hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// Handle the event described by the arguments.
async fn run(args: Args, terminated: &AtomicBool) -> ExitCode {
    let config = match ValidatedConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            let use_colors = !args.json && io::stderr().is_terminal();
            write_error(&mut io::stderr(), &e.to_string(), use_colors);
            return ExitCode::StartupFailure;
        }
    };

    let use_colors = !config.json_output && io::stdout().is_terminal();

    debug!("Validated configuration: {:?}", config);
    info!("Handling {} in {}", config.event.target, config.event.repo);

    let client = match create_octocrab(&args) {
        Ok(octocrab) => OctocrabClient::new(octocrab),
        Err(e) => {
            write_error(&mut io::stderr(), &e.to_string(), use_colors);
            return ExitCode::StartupFailure;
        }
    };

    if terminated.load(Ordering::SeqCst) {
        return ExitCode::Terminated;
    }

    let (result, planned) = if config.dry_run {
        let writer = DryRunWriter::new(&client);
        let handler = WelcomeHandler::new(&client, &writer, &config.bot_config);
        let result = handler.handle(&config.event).await;
        (result, writer.planned())
    } else {
        let handler = WelcomeHandler::new(&client, &client, &config.bot_config);
        (handler.handle(&config.event).await, Vec::new())
    };

    if let Err(e) = &result {
        error!("Failed to welcome {} in {}: {}", config.event.target, config.event.repo, e);
    }

    let report = WelcomeReport::new(&config.event, config.dry_run, &result, planned);
    let mut stdout = io::stdout().lock();
    let written = if config.json_output {
        report.write_json(&mut stdout)
    } else {
        report.write_human(&mut stdout, use_colors)
    };
    if let Err(e) = written {
        error!("Failed to write output: {}", e);
        return ExitCode::StartupFailure;
    }

    if report.is_success() {
        ExitCode::Success
    } else {
        ExitCode::WelcomeFailed
    }
}

/// Write an error message to the writer.
fn write_error<W: Write>(writer: &mut W, message: &str, use_colors: bool) {
    let mut output = cli::output::HumanOutput::new(writer, use_colors);
    let _ = output.write_error(message);
}
