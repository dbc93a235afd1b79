use crate::collector::{Collector, GatherContext, GatherValue, OptionsOrigin};
use crate::error::Result;
use crate::info::GatheredInformation;
use futures::future::try_join_all;
use indexmap::IndexMap;
use log;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

pub const TASK_INTRO: &str = "<task>Using the context gathered from the following sources, follow the directions given below:</task>";

/// What one invocation gathers, and what it asks for afterwards.
#[derive(Debug, Clone, Default)]
pub struct CommandDefinition {
    pub directions: Option<String>,
    pub gather: IndexMap<String, GatherValue>,
}

/// Context shared by every collector in one run. Collectors without a
/// recorded origin are treated as configured from the command line.
#[derive(Debug, Clone, Default)]
pub struct GatherScope {
    pub config_base_dir: Option<PathBuf>,
    pub origins: HashMap<String, OptionsOrigin>,
}

impl GatherScope {
    pub fn context_for(&self, collector: &str) -> GatherContext {
        GatherContext {
            config_base_dir: self.config_base_dir.clone(),
            options_origin: self
                .origins
                .get(collector)
                .copied()
                .unwrap_or(OptionsOrigin::CommandLine),
        }
    }
}

/// Runs every configured collector concurrently and flattens the results in
/// collector order. Collectors with no entry in `command.gather` are skipped.
pub async fn gather_records(
    collectors: &[Arc<dyn Collector>],
    command: &CommandDefinition,
    scope: &GatherScope,
) -> Result<Vec<GatheredInformation>> {
    for key in command.gather.keys() {
        if !collectors.iter().any(|c| c.name() == key) {
            log::warn!("No collector named '{}' is registered, ignoring its options", key);
        }
    }

    let per_collector = try_join_all(collectors.iter().map(|collector| async move {
        let name = collector.name();
        let Some(options) = command.gather.get(name) else {
            log::trace!("No options for collector '{}', skipping", name);
            return Ok(Vec::new());
        };
        let context = scope.context_for(name);
        log::debug!(
            "Gathering with '{}' (origin: {:?})",
            name,
            context.options_origin
        );
        let records = collector.gather(options, &context).await?;
        log::debug!("Collector '{}' produced {} records", name, records.len());
        Ok::<_, crate::error::AppError>(records)
    }))
    .await?;

    Ok(per_collector.into_iter().flatten().collect())
}

pub async fn gather_information(
    collectors: &[Arc<dyn Collector>],
    command: &CommandDefinition,
    scope: &GatherScope,
) -> Result<String> {
    let records = gather_records(collectors, command, scope).await?;
    log::info!("Rendering prompt from {} records", records.len());
    Ok(render_prompt(&records, command.directions.as_deref()))
}

pub fn render_prompt(records: &[GatheredInformation], directions: Option<&str>) -> String {
    let blocks: Vec<String> = records.iter().map(render_block).collect();
    let mut prompt = format!("{}\n\n{}", TASK_INTRO, blocks.join("\n\n"));
    if let Some(directions) = directions.filter(|d| !d.is_empty()) {
        prompt.push_str(&format!("\n\n<directions>\n{}\n</directions>", directions));
    }
    prompt.trim().to_string()
}

fn render_block(info: &GatheredInformation) -> String {
    let attrs: String = info
        .attrs
        .iter()
        .map(|(key, value)| format!(" {}=\"{}\"", key, value))
        .collect();
    format!(
        "<{tag}{attrs}>\n{content}\n</{tag}>",
        tag = info.tag,
        attrs = attrs,
        content = info.content
    )
}
