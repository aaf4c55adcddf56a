mod cmd;
mod output;
mod signal;

use clap::{Parser, Subcommand};
use dwh_core::CancelToken;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dwh",
    about = "Bring the warehouse cluster and its trust role up, or tear them down",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: nearest dwh.yaml in this or a parent directory)
    #[arg(long, global = true, env = "DWH_CONFIG")]
    config: Option<PathBuf>,

    /// Output the report as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the trust role and cluster, and record the role id and endpoint
    Init,

    /// Delete the cluster, then detach and delete the trust role
    Cleanup,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = dwh_core::paths::resolve_config(cli.config.as_deref(), &cwd);

    let cancel = CancelToken::new();
    signal::cancel_on_ctrl_c(cancel.clone());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&config, cancel, cli.json),
        Commands::Cleanup => cmd::cleanup::run(&config, cancel, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
