use anyhow::Result;
use clap::{Parser, Subcommand};

use dbxcli::{commands, utils};

#[derive(Parser)]
#[clap(name = "dbxcli")]
#[clap(about = "A command line client for Dropbox")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Enable verbose logging
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a file
    #[clap(override_usage = "dbxcli get [OPTIONS] <source> [<destination>]")]
    Get {
        /// Download everything under directory
        #[clap(short = 'R', long)]
        recurse: bool,
        /// Remote source path, optionally followed by a local destination
        #[clap(value_name = "PATH")]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = utils::logging::init_logging(cli.verbose) {
        eprintln!("Warning: could not initialize logging: {e}");
    }

    let result = match cli.command {
        Commands::Get { recurse, paths } => {
            commands::get::get(&paths, recurse).map_err(|e| anyhow::anyhow!(e))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
