use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use recon_core::AppError;
use std::fs::{self, File};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use tiktoken_rs::cl100k_base;

use crate::cli_args::OutputOpts;

/// Size of a rendered prompt as reported after a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptStats {
    pub bytes: usize,
    pub bytes_readable: String,
    pub estimated_tokens: usize,
}

/// Sends the prompt to every requested sink. Standard output is also used
/// whenever it is not a terminal.
pub fn deliver_prompt(prompt: &str, opts: &OutputOpts, quiet: bool) -> Result<()> {
    let piped = !io::stdout().is_terminal();
    let mut delivered = false;

    if opts.clipboard {
        copy_to_clipboard(prompt).context("Failed to copy prompt to clipboard")?;
        delivered = true;
        if !quiet {
            eprintln!("{} Prompt copied to clipboard", "✅".green());
        }
    }

    if let Some(path) = &opts.output {
        write_to_file(path, prompt)?;
        delivered = true;
        if !quiet {
            eprintln!(
                "{} Prompt saved to: {}",
                "✅".green(),
                path.display().to_string().blue()
            );
        }
    }

    if opts.stdout || piped {
        write_to_stdout(prompt)?;
        delivered = true;
    }

    if !delivered {
        log::warn!("No output method detected or specified; use -c, -o <FILE> or --stdout");
    }

    if !quiet {
        match prompt_stats(prompt) {
            Ok(stats) => eprintln!(
                "{} {} {}",
                "Prompt:".green(),
                stats.bytes_readable.cyan(),
                format!("(~{} tokens)", stats.estimated_tokens).dimmed()
            ),
            Err(e) => log::warn!("Could not compute prompt statistics: {:#}", e),
        }
    }
    Ok(())
}

pub fn prompt_stats(prompt: &str) -> Result<PromptStats> {
    let bpe = cl100k_base().context("Failed to load cl100k tokenizer")?;
    let bytes = prompt.len();
    let bytes_readable = Byte::from_u128(bytes as u128)
        .unwrap_or_default()
        .get_appropriate_unit(UnitType::Binary)
        .to_string();
    Ok(PromptStats {
        bytes,
        bytes_readable,
        estimated_tokens: bpe.encode_ordinary(prompt).len(),
    })
}

fn copy_to_clipboard(content: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(content.to_string())
        .map_err(|e| AppError::Clipboard(e.to_string()))?;
    Ok(())
}

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    let write_err = |source: io::Error| AppError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let mut file = File::create(path).map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;
    Ok(())
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_with_newline(&mut handle, content).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn write_with_newline(writer: &mut impl Write, content: &str) -> io::Result<()> {
    writer.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        writer.write_all(b"\n")?;
    }
    Ok(())
}
