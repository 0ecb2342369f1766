//! Command line interface definition

use clap::{Parser, Subcommand};
use cypack_config::ColorChoice;
use std::path::PathBuf;

/// cypack - staged Cython builds with environment provisioning
#[derive(Parser)]
#[command(name = "cypack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile a Python project tree into a distributable build")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build a project tree and provision its dependencies
    #[command(alias = "b")]
    Build {
        /// Project source directory
        #[arg(short, long, value_name = "DIR")]
        source: PathBuf,

        /// Output directory (destroyed and recreated)
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Entry point file, copied verbatim instead of compiled
        #[arg(short, long, value_name = "FILE")]
        entry: PathBuf,

        /// Python interpreter driving the toolchain
        #[arg(long, value_name = "PROGRAM")]
        python: Option<String>,

        /// Skip environment provisioning after the build
        #[arg(long)]
        skip_install: bool,
    },

    /// Provision an already-built output tree
    Provision {
        /// Output directory holding a finished build
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Python interpreter used to create the environment
        #[arg(long, value_name = "PROGRAM")]
        python: Option<String>,
    },
}
