use clap::{Args, Parser};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct GatherOpts {
    #[arg(
        short = 'p',
        long,
        help = "Directions appended after the gathered context (overrides the command's).",
        value_name = "TEXT",
        help_heading = "Gathering"
    )]
    pub prompt: Option<String>,

    #[arg(
        long,
        help = "Comma-separated files, directories or globs to include (prefix '!' to exclude).",
        value_name = "LIST",
        help_heading = "Gathering"
    )]
    pub files: Option<String>,

    #[arg(
        long,
        help = "Comma-separated URLs whose bodies are included.",
        value_name = "LIST",
        help_heading = "Gathering"
    )]
    pub urls: Option<String>,
}

impl GatherOpts {
    pub fn is_empty(&self) -> bool {
        self.prompt.is_none() && self.files.is_none() && self.urls.is_none()
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputOpts {
    #[arg(
        short = 'c',
        long,
        help = "Copy the prompt to the clipboard.",
        help_heading = "Output"
    )]
    pub clipboard: bool,

    #[arg(
        short = 'o',
        long,
        help = "Write the prompt to a file.",
        value_name = "FILE",
        help_heading = "Output"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Write the prompt to standard output (implied when piped).",
        help_heading = "Output"
    )]
    pub stdout: bool,
}

impl OutputOpts {
    pub fn is_empty(&self) -> bool {
        !self.clipboard && self.output.is_none() && !self.stdout
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOpts {
    #[arg(
        long,
        help = "Path of the project config file (default: nearest .recon.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help_heading = "Configuration"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Ignore every config file.",
        conflicts_with = "config",
        help_heading = "Configuration"
    )]
    pub no_config: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "recon",
    author,
    version,
    about = "Gather context from files, URLs, notes and functions into one prompt.",
    long_about = "recon runs a named command from .recon.toml (or an ad-hoc one built from flags), \ngathers every configured source concurrently and renders a single prompt \nfor an AI model, delivered to the clipboard, a file or stdout.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  recon code -c\n  recon --files src,README.md -p 'Explain this module' --stdout\n  recon review -o prompt.txt\n  recon --list"
)]
pub struct Cli {
    #[arg(
        value_name = "COMMAND",
        help = "Name of a command defined in .recon.toml."
    )]
    pub command: Option<String>,

    #[command(flatten)]
    pub gather: GatherOpts,

    #[command(flatten)]
    pub output: OutputOpts,

    #[command(flatten)]
    pub config: ConfigOpts,

    #[arg(
        short = 'l',
        long,
        help = "List available collectors and configured commands."
    )]
    pub list: bool,

    #[arg(
        long,
        help = "Print a shell completion script.",
        value_name = "SHELL",
        value_parser = ["bash", "zsh", "fish"]
    )]
    pub completion: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence informational messages and warnings.")]
    pub quiet: bool,
}
