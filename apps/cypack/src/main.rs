//! cypack - staged Cython builds with environment provisioning
//!
//! The CLI is the front end of the pipeline: it collects the three input
//! paths, starts the build worker, renders events, and sequences the
//! provisioning stage after the build worker's completion is observed.

mod cli;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use cypack_builder::{BuildContext, BuildWorker, Builder};
use cypack_config::{ColorChoice, Config};
use cypack_errors::Error;
use cypack_events::EventReceiver;
use cypack_provision::Provisioner;
use std::future::Future;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting cypack v{}", env!("CARGO_PKG_VERSION"));

    // Configuration precedence: file defaults, then environment, then CLI
    let mut config = Config::load_or_default(cli.global.config.as_deref())
        .await
        .map_err(CliError::Config)?;
    config.merge_env().map_err(CliError::Config)?;

    let colors_enabled = colors_enabled(&cli.global, &config);
    let mut handler = EventHandler::new(colors_enabled, cli.global.debug);
    let (event_sender, mut event_receiver) = cypack_events::channel();

    match cli.command {
        Commands::Build {
            source,
            output,
            entry,
            python,
            skip_install,
        } => {
            if let Some(python) = python {
                config.build.python = python;
            }
            let skip_install = skip_install || config.provision.skip_install;

            let context = BuildContext::new(source, output, entry)
                .with_event_sender(event_sender.clone());
            let builder = Builder::with_config(config.build.clone());

            // One build worker per run; a second start against the same
            // handle would be rejected as in-progress.
            let mut worker = BuildWorker::new();
            worker.start(builder, context)?;
            let report = drive(worker.wait(), &mut event_receiver, &mut handler).await?;

            if skip_install {
                info!("provisioning skipped by request");
            } else {
                let provisioner =
                    Provisioner::new(config.build.python.clone(), config.provision.clone())
                        .with_event_sender(event_sender.clone());
                drive(
                    provisioner.provision(&report.output_root),
                    &mut event_receiver,
                    &mut handler,
                )
                .await?;
            }
        }

        Commands::Provision { output, python } => {
            if let Some(python) = python {
                config.build.python = python;
            }
            let provisioner =
                Provisioner::new(config.build.python.clone(), config.provision.clone())
                    .with_event_sender(event_sender.clone());
            drive(
                provisioner.provision(&output),
                &mut event_receiver,
                &mut handler,
            )
            .await?;
        }
    }

    info!("Command completed successfully");
    Ok(())
}

/// Await a stage while rendering its events concurrently
async fn drive<T>(
    future: impl Future<Output = Result<T, Error>>,
    event_receiver: &mut EventReceiver,
    handler: &mut EventHandler,
) -> Result<T, CliError> {
    let mut future = Box::pin(future);

    loop {
        select! {
            // Stage completed
            result = &mut future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    handler.handle_event(&event);
                }
                return result.map_err(CliError::from);
            }

            // Event received
            event = event_receiver.recv() => {
                match event {
                    Some(event) => handler.handle_event(&event),
                    None => { /* Channel closed: keep waiting for the stage to finish */ }
                }
            }
        }
    }
}

fn colors_enabled(global: &GlobalArgs, config: &Config) -> bool {
    match global.color.unwrap_or(config.general.color) {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
    }
}

fn init_tracing(debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "info,cypack=debug,cypack_builder=debug,cypack_provision=debug"
    } else {
        "warn,cypack=warn"
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}
