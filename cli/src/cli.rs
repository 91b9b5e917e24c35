//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::app::{self, AppContext, AppFlags};

/// Interactive controller for an EC2-hosted OpenVPN gateway
#[derive(Parser)]
#[command(name = "ec2ctl", version)]
pub struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    /// Log debug details to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the context and run the REPL.
    ///
    /// # Errors
    ///
    /// Returns an error if startup fails (configuration, key material,
    /// working directory) or operator input cannot be read.
    pub async fn run(self) -> Result<u8> {
        let flags = AppFlags {
            env_file: self.env_file,
            no_color: self.no_color,
        };
        let ctx = AppContext::new(&flags)?;
        app::run(ctx).await
    }
}
