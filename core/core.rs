pub mod collector;
pub mod collectors;
pub mod config;
pub mod error;
pub mod exclusions;
pub mod gather;
pub mod info;
pub mod prompt;

pub use collector::{
    Collector, CollectorRegistry, GatherContext, GatherFn, GatherValue, OptionsOrigin, PathSpec,
};
pub use collectors::{
    Fetch, FilesCollector, FunctionCollector, HttpFetcher, NotesCollector, UrlsCollector,
    standard_registry,
};
pub use config::{CONFIG_FILENAME, CommandConfig, ConfigFile, ReconConfig};
pub use error::{AppError, Result};
pub use exclusions::{default_exclusion_patterns, get_default_exclusions};
pub use info::GatheredInformation;
pub use prompt::{
    CommandDefinition, GatherScope, TASK_INTRO, gather_information, gather_records, render_prompt,
};
