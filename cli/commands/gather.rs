use anyhow::{Context, Result};
use clap::CommandFactory;
use recon_core::{
    AppError, CollectorRegistry, CommandDefinition, GatherScope, OptionsOrigin, ReconConfig,
    gather_information, standard_registry,
};

use crate::cli_args::{Cli, GatherOpts};
use crate::commands::load_config;
use crate::output;

pub fn handle_gather_command(cli: &Cli, quiet: bool) -> Result<()> {
    if prints_help(cli) {
        Cli::command().print_help()?;
        return Ok(());
    }

    let config = load_config(&cli.config)?;
    let registry = standard_registry(Vec::new()).context("Failed to build collector registry")?;

    let (mut definition, mut scope) = resolve_command(&config, cli.command.as_deref());
    apply_overrides(&mut definition, &mut scope, &cli.gather, &registry)?;
    log::debug!(
        "Gathering from {:?} with base dir {:?}",
        definition.gather.keys().collect::<Vec<_>>(),
        scope.config_base_dir
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let prompt = runtime
        .block_on(gather_information(registry.collectors(), &definition, &scope))
        .context("Failed to gather information")?;

    output::deliver_prompt(&prompt, &cli.output, quiet)
}

/// A bare `recon` with no command and no gathering or output options.
pub fn prints_help(cli: &Cli) -> bool {
    cli.command.is_none() && cli.gather.is_empty() && cli.output.is_empty()
}

/// The named command from config, or an empty ad-hoc command that the
/// command-line flags fill in.
pub fn resolve_command(
    config: &ReconConfig,
    name: Option<&str>,
) -> (CommandDefinition, GatherScope) {
    if let Some(name) = name {
        if let Some(found) = config.command_definition(name) {
            log::info!("Running configured command '{}'", name);
            return found;
        }
        log::warn!(
            "Command '{}' not found in config, running an ad-hoc command from flags",
            name
        );
    }
    (
        CommandDefinition::default(),
        GatherScope {
            config_base_dir: config.config_base_dir.clone(),
            ..GatherScope::default()
        },
    )
}

/// Replaces the command's directions and collector entries with whatever
/// was given on the command line.
pub fn apply_overrides(
    definition: &mut CommandDefinition,
    scope: &mut GatherScope,
    opts: &GatherOpts,
    registry: &CollectorRegistry,
) -> Result<()> {
    if let Some(prompt) = &opts.prompt {
        definition.directions = Some(prompt.clone());
    }
    let flags = [("files", opts.files.as_deref()), ("urls", opts.urls.as_deref())];
    for (collector_name, raw) in flags {
        let Some(raw) = raw else { continue };
        let collector = registry.get(collector_name).ok_or_else(|| {
            AppError::InvalidArgument(format!("No collector named '{}'", collector_name))
        })?;
        let value = collector.parse_options(raw).ok_or_else(|| {
            AppError::InvalidArgument(format!(
                "Collector '{}' cannot be configured from the command line",
                collector_name
            ))
        })?;
        log::debug!("Command-line options for '{}': {:?}", collector_name, value);
        definition.gather.insert(collector_name.to_string(), value);
        scope
            .origins
            .insert(collector_name.to_string(), OptionsOrigin::CommandLine);
    }
    Ok(())
}
