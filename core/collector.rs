use crate::error::{AppError, Result};
use crate::info::GatheredInformation;
use async_trait::async_trait;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use log;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a collector's options came from. Only config-file options are
/// resolved against the config directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionsOrigin {
    ConfigFile,
    CommandLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatherContext {
    pub config_base_dir: Option<PathBuf>,
    pub options_origin: OptionsOrigin,
}

impl Default for GatherContext {
    fn default() -> Self {
        Self {
            config_base_dir: None,
            options_origin: OptionsOrigin::CommandLine,
        }
    }
}

impl GatherContext {
    /// Base directory to resolve against for options of the given origin.
    pub fn base_dir_for(&self, origin: OptionsOrigin) -> Option<&PathBuf> {
        match origin {
            OptionsOrigin::ConfigFile => self.config_base_dir.as_ref(),
            OptionsOrigin::CommandLine => None,
        }
    }
}

/// File path specification: a path or glob, `!`-prefixed for exclusions.
/// Entries without an explicit origin inherit the context's origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    pub path: String,
    pub origin: Option<OptionsOrigin>,
}

impl PathSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            origin: None,
        }
    }

    pub fn with_origin(path: impl Into<String>, origin: OptionsOrigin) -> Self {
        Self {
            path: path.into(),
            origin: Some(origin),
        }
    }

    pub fn is_exclusion(&self) -> bool {
        self.path.starts_with('!')
    }
}

/// Producer of gathered information whose output is validated at runtime.
pub type GatherFn = Arc<dyn Fn() -> BoxFuture<'static, Result<serde_json::Value>> + Send + Sync>;

/// Raw collector options as they come out of configuration or the CLI.
#[derive(Clone)]
pub enum GatherValue {
    Text(String),
    List(Vec<GatherValue>),
    Path(PathSpec),
    Function(GatherFn),
    Data(serde_json::Value),
}

impl GatherValue {
    pub fn function<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<serde_json::Value>> + Send + 'static,
    {
        GatherValue::Function(Arc::new(move || Box::pin(f())))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GatherValue::Text(_) => "text",
            GatherValue::List(_) => "list",
            GatherValue::Path(_) => "path",
            GatherValue::Function(_) => "function",
            GatherValue::Data(_) => "data",
        }
    }

    /// A list as-is, anything else as a one-element list.
    pub fn as_items(&self) -> Vec<&GatherValue> {
        match self {
            GatherValue::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }

    /// Text, or a list made only of text.
    pub fn to_string_list(&self, collector: &str) -> Result<Vec<String>> {
        self.as_items()
            .into_iter()
            .map(|item| match item {
                GatherValue::Text(s) => Ok(s.clone()),
                other => Err(AppError::invalid_options(
                    collector,
                    format!("expected text entries, got {}", other.kind()),
                )),
            })
            .collect()
    }
}

impl fmt::Debug for GatherValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatherValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            GatherValue::List(items) => f.debug_tuple("List").field(items).finish(),
            GatherValue::Path(spec) => f.debug_tuple("Path").field(spec).finish(),
            GatherValue::Function(_) => f.write_str("Function(<fn>)"),
            GatherValue::Data(value) => f.debug_tuple("Data").field(value).finish(),
        }
    }
}

impl From<&str> for GatherValue {
    fn from(value: &str) -> Self {
        GatherValue::Text(value.to_string())
    }
}

impl From<String> for GatherValue {
    fn from(value: String) -> Self {
        GatherValue::Text(value)
    }
}

impl<T: Into<GatherValue>> From<Vec<T>> for GatherValue {
    fn from(values: Vec<T>) -> Self {
        GatherValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<PathSpec> for GatherValue {
    fn from(spec: PathSpec) -> Self {
        GatherValue::Path(spec)
    }
}

/// A pluggable source of context, keyed by `name` in a command's `gather` map.
#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn gather(
        &self,
        options: &GatherValue,
        context: &GatherContext,
    ) -> Result<Vec<GatheredInformation>>;

    /// Converts a command-line flag value into options for `gather`.
    /// `None` means the collector is not configurable from the command line.
    fn parse_options(&self, _raw: &str) -> Option<GatherValue> {
        None
    }
}

/// Ordered set of active collectors with unique names.
#[derive(Clone, Default)]
pub struct CollectorRegistry {
    collectors: Vec<Arc<dyn Collector>>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, collector: Arc<dyn Collector>) -> Result<()> {
        if self.get(collector.name()).is_some() {
            return Err(AppError::Config(format!(
                "A collector named '{}' is already registered",
                collector.name()
            )));
        }
        log::trace!("Registered collector '{}'", collector.name());
        self.collectors.push(collector);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Collector>> {
        self.collectors.iter().find(|c| c.name() == name)
    }

    pub fn collectors(&self) -> &[Arc<dyn Collector>] {
        &self.collectors
    }

    pub fn names(&self) -> Vec<&str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    pub fn describe(&self) -> IndexMap<String, String> {
        self.collectors
            .iter()
            .map(|c| (c.name().to_string(), c.description().to_string()))
            .collect()
    }
}
