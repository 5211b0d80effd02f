//! Protopack CLI
//!
//! Copyright 2025 Release Workshop Ltd
//! Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
//! See the LICENSE file in the project root for details.

mod commands;
mod error;
mod ops;
mod test_helpers;
mod utils;

use clap::{Parser, Subcommand};
use commands::{common_protos, generate};
use ops::session::SessionOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Protopack CLI - Build per-language packages from protocol buffer APIs
#[derive(Parser)]
#[command(name = "protopack")]
#[command(about = "Protopack CLI - Build per-language packages from protocol buffer APIs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build packages for one API version
    Generate {
        /// API as <name>/<version>, e.g. pubsub/v1
        #[arg(long, conflicts_with_all = ["name", "version"])]
        api: Option<String>,
        /// API name
        #[arg(long)]
        name: Option<String>,
        /// API version
        #[arg(long)]
        version: Option<String>,
        #[command(flatten)]
        session: SessionOptions,
    },
    /// Build the shared common protos packages
    CommonProtos {
        #[command(flatten)]
        session: SessionOptions,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Generate {
            api,
            name,
            version,
            session,
        } => {
            let opts = generate::Options {
                api,
                name,
                version,
                session,
            };
            generate::run(&opts)
        }
        Commands::CommonProtos { session } => {
            let opts = common_protos::Options { session };
            common_protos::run(&opts)
        }
    };

    std::process::exit(exit_code);
}
