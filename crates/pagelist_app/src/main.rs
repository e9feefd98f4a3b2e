mod platform;
mod repository;
mod screens;

use std::path::PathBuf;

use clap::Parser;
use platform::LogDestination;

/// Browse paginated patient lists and chats backed by an in-memory clinic.
#[derive(Debug, Parser)]
#[command(name = "pagelist_app", version, about)]
struct Cli {
    /// Mirror warnings and errors to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding pagelist.ron (defaults to the working directory)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let config_dir = cli
        .config_dir
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let config = platform::load_config(&config_dir);

    platform::initialize_logging(if cli.verbose || config.log_to_terminal {
        LogDestination::Both
    } else {
        LogDestination::File
    });

    platform::run_app(config);
}
