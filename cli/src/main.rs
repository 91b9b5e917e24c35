//! ec2ctl - interactive controller for an EC2-hosted OpenVPN gateway

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ec2ctl_cli::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // The stdin reader can still be parked in the blocking pool; exit
    // without dropping the runtime.
    match cli.run().await {
        Ok(code) => std::process::exit(i32::from(code)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
