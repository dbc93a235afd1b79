use crate::collector::{Collector, GatherContext, GatherValue};
use crate::error::{AppError, Result};
use crate::info::GatheredInformation;
use async_trait::async_trait;

pub const NOTES_COLLECTOR_NAME: &str = "notes";

#[derive(Debug, Default, Clone)]
pub struct NotesCollector;

impl NotesCollector {
    pub fn new() -> Self {
        Self
    }

    pub fn collect(&self, notes: &str) -> Vec<GatheredInformation> {
        vec![GatheredInformation::new("notes", notes)]
    }
}

#[async_trait]
impl Collector for NotesCollector {
    fn name(&self) -> &str {
        NOTES_COLLECTOR_NAME
    }

    fn description(&self) -> &str {
        "Provides a set of notes as context for the user's directions"
    }

    async fn gather(
        &self,
        options: &GatherValue,
        _context: &GatherContext,
    ) -> Result<Vec<GatheredInformation>> {
        match options {
            GatherValue::Text(notes) => Ok(self.collect(notes)),
            other => Err(AppError::invalid_options(
                NOTES_COLLECTOR_NAME,
                format!("expected a single string, got {}", other.kind()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wraps_text_verbatim() {
        let records = NotesCollector::new()
            .gather(&GatherValue::from("  keep <spacing>\n"), &GatherContext::default())
            .await
            .unwrap();
        assert_eq!(records, vec![GatheredInformation::new("notes", "  keep <spacing>\n")]);
    }

    #[tokio::test]
    async fn lists_are_not_notes() {
        let err = NotesCollector::new()
            .gather(&GatherValue::from(vec!["a", "b"]), &GatherContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expected a single string, got list"));
    }
}
