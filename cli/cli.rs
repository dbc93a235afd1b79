mod cli_args;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::*;
use log;
use recon_core::AppError;
use std::process;

use cli_args::Cli;

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            // Usage and config problems are always shown, even with -q.
            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Config(_)) => 1,
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::Io(_)) => 2,
        Some(AppError::FileRead { .. }) => 2,
        Some(AppError::Glob(_)) => 2,
        Some(AppError::Fetch { .. }) => 3,
        Some(AppError::InvalidFunction(_)) => 4,
        Some(AppError::InvalidGatherResult(_)) => 4,
        Some(AppError::FunctionFailed { .. }) => 4,
        Some(AppError::Json(_)) => 4,
        Some(AppError::InvalidOptions { .. }) => 5,
        Some(AppError::InvalidArgument(_)) => 5,
        Some(AppError::FileWrite { .. }) => 6,
        Some(AppError::Clipboard(_)) => 6,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    if let Some(shell) = &cli.completion {
        log::debug!("Generating '{}' completions...", shell);
        return commands::completion::handle_completion(shell);
    }
    if cli.list {
        log::debug!("Listing collectors and commands...");
        return commands::list::handle_list_command(&cli.config);
    }
    commands::gather::handle_gather_command(&cli, quiet)
}
