mod app;
mod cli;
mod config;
mod effects;
mod render;

use std::process::ExitCode;

use clap::Parser;
use client_logging::client_error;

fn main() -> ExitCode {
    let args = cli::CliArgs::parse();
    let config = config::ClientConfig::from_args(&args);
    client_logging::initialize(config.log_destination, config.log_level, &config.log_file);

    match app::run(args.command, &config) {
        Ok(code) => code,
        Err(err) => {
            client_error!("{:#}", err);
            eprintln!("mediafind: {err:#}");
            ExitCode::FAILURE
        }
    }
}
