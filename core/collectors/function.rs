use crate::collector::{Collector, GatherContext, GatherFn, GatherValue};
use crate::error::{AppError, Result};
use crate::info::GatheredInformation;
use async_trait::async_trait;
use log;
use serde_json::Value;
use std::path::Path;
use tokio::process::Command;

pub const FUNCTION_COLLECTOR_NAME: &str = "function";

/// Runs user-supplied producers and validates what they return.
///
/// A producer is either a registered closure or, when configured from a file,
/// a shell command printing a JSON array of records on stdout.
#[derive(Debug, Default, Clone)]
pub struct FunctionCollector;

enum Producer<'a> {
    Callable(&'a GatherFn),
    Shell(&'a str),
}

impl FunctionCollector {
    pub fn new() -> Self {
        Self
    }

    pub async fn collect(
        &self,
        options: &GatherValue,
        context: &GatherContext,
    ) -> Result<Vec<GatheredInformation>> {
        let working_dir = context.base_dir_for(context.options_origin);
        let mut results = Vec::new();

        for (index, item) in options.as_items().into_iter().enumerate() {
            let producer = as_producer(item)?;
            let value = match producer {
                Producer::Callable(f) => {
                    log::debug!("Invoking gather function #{}", index);
                    (**f)().await?
                }
                Producer::Shell(command) => {
                    log::debug!("Running gather command #{}: {}", index, command);
                    run_shell_command(command, working_dir.map(|p| p.as_path())).await?
                }
            };
            let records = GatheredInformation::list_from_value(&value)?;
            log::trace!("Producer #{} returned {} records", index, records.len());
            results.extend(records);
        }

        Ok(results)
    }
}

#[async_trait]
impl Collector for FunctionCollector {
    fn name(&self) -> &str {
        FUNCTION_COLLECTOR_NAME
    }

    fn description(&self) -> &str {
        "Runs user-defined functions or commands that return gathered information"
    }

    async fn gather(
        &self,
        options: &GatherValue,
        context: &GatherContext,
    ) -> Result<Vec<GatheredInformation>> {
        self.collect(options, context).await
    }
}

fn as_producer(value: &GatherValue) -> Result<Producer<'_>> {
    match value {
        GatherValue::Function(f) => Ok(Producer::Callable(f)),
        GatherValue::Text(command) if !command.trim().is_empty() => Ok(Producer::Shell(command)),
        GatherValue::Text(_) => Err(AppError::InvalidFunction("empty command".to_string())),
        other => Err(AppError::InvalidFunction(format!(
            "expected a function or a command, got {}",
            other.kind()
        ))),
    }
}

async fn run_shell_command(command: &str, working_dir: Option<&Path>) -> Result<Value> {
    let mut cmd = if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    };
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    let output = cmd.output().await.map_err(|e| AppError::FunctionFailed {
        command: command.to_string(),
        reason: e.to_string(),
    })?;
    if !output.status.success() {
        return Err(AppError::FunctionFailed {
            command: command.to_string(),
            reason: format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).map_err(|e| {
        AppError::InvalidGatherResult(format!("output of '{}' is not valid JSON: {}", command, e))
    })
}
