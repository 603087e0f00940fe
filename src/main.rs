//! Jalsetu CLI entry point.

use clap::Parser;
use jalsetu::cli::{self, Cli, Commands, EXIT_ERROR};
use jalsetu::logging;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Validate(args) => cli::run_validate(args),
        Commands::Categories(args) => cli::run_categories(args),
        Commands::Init(args) => cli::run_init(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
