//! Asset Palette command-line host.

use clap::Parser;

mod commands;
mod logging;

use commands::Cli;

fn main() {
    let cli = Cli::parse();

    let paths = match cli.paths() {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let _log_guard = match logging::init(&paths.logs_dir, cli.verbose) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {:#}", e);
            None
        }
    };

    if let Err(e) = cli.execute(&paths) {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
