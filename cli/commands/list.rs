use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use recon_core::{CollectorRegistry, ReconConfig, standard_registry};

use crate::cli_args::ConfigOpts;
use crate::commands::load_config;

pub fn handle_list_command(opts: &ConfigOpts) -> Result<()> {
    let config = load_config(opts)?;
    let registry = standard_registry(Vec::new()).context("Failed to build collector registry")?;

    println!();
    println!("{}", " Collectors ".green().bold().underline());
    println!("{}", collectors_table(&registry));

    println!();
    println!("{}", " Commands ".green().bold().underline());
    if config.commands.is_empty() {
        println!("{}", "(No commands configured)".yellow());
    } else {
        println!("{}", commands_table(&config));
    }
    for path in &config.loaded_from {
        println!("{} {}", "Loaded from:".dimmed(), path.display().to_string().blue());
    }
    println!();
    Ok(())
}

fn collectors_table(registry: &CollectorRegistry) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::Green),
        Cell::new("Description").fg(Color::Green),
    ]);
    for (name, description) in registry.describe() {
        table.add_row(vec![Cell::new(name).fg(Color::Cyan), Cell::new(description)]);
    }
    table
}

fn commands_table(config: &ReconConfig) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Command").fg(Color::Green),
        Cell::new("Sources").fg(Color::Green),
        Cell::new("Directions").fg(Color::Green),
    ]);
    for (name, command) in &config.commands {
        let sources: Vec<&str> = command.gather.keys().map(String::as_str).collect();
        let directions = command.directions.as_deref().unwrap_or("-");
        table.add_row(vec![
            Cell::new(name).fg(Color::Cyan),
            Cell::new(sources.join(", ")),
            Cell::new(first_line(directions)).fg(Color::DarkGrey),
        ]);
    }
    table
}

fn first_line(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    if text.lines().nth(1).is_some() {
        format!("{}…", line)
    } else {
        line.to_string()
    }
}
