use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use recon_core::AppError;
use std::io;

use crate::cli_args::Cli;

pub fn parse_shell(shell_str: &str) -> Result<Shell> {
    match shell_str.to_lowercase().as_str() {
        "fish" => Ok(Shell::Fish),
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        _ => anyhow::bail!(AppError::InvalidArgument(format!(
            "Unsupported shell for completion: {}",
            shell_str
        ))),
    }
}

pub fn handle_completion(shell_str: &str) -> Result<()> {
    let shell = parse_shell(shell_str)?;
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    generate(shell, &mut command, bin_name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_shells() {
        assert_eq!(parse_shell("ZSH").unwrap(), Shell::Zsh);
        assert_eq!(parse_shell("fish").unwrap(), Shell::Fish);
    }

    #[test]
    fn unknown_shell_is_invalid_argument() {
        let err = parse_shell("tcsh").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn script_mentions_binary_name() {
        let mut command = Cli::command();
        let mut buf = Vec::new();
        generate(Shell::Bash, &mut command, "recon", &mut buf);
        assert!(String::from_utf8(buf).unwrap().contains("recon"));
    }
}
