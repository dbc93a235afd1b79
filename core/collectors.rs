use crate::collector::{Collector, CollectorRegistry};
use crate::error::Result;
use std::sync::Arc;

pub mod files;
pub mod function;
pub mod notes;
pub mod urls;

pub use files::FilesCollector;
pub use function::FunctionCollector;
pub use notes::NotesCollector;
pub use urls::{Fetch, HttpFetcher, UrlsCollector};

/// Built-in collectors in their standard order, with `extra` collectors
/// slotted between the network and the inline sources.
pub fn standard_registry(extra: Vec<Arc<dyn Collector>>) -> Result<CollectorRegistry> {
    let mut registry = CollectorRegistry::new();
    registry.register(Arc::new(FilesCollector::new()))?;
    registry.register(Arc::new(UrlsCollector::default()))?;
    for collector in extra {
        registry.register(collector)?;
    }
    registry.register(Arc::new(NotesCollector::new()))?;
    registry.register(Arc::new(FunctionCollector::new()))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_order() {
        let registry = standard_registry(Vec::new()).unwrap();
        assert_eq!(registry.names(), vec!["files", "urls", "notes", "function"]);
    }

    #[test]
    fn extra_collectors_cannot_shadow_builtins() {
        let result = standard_registry(vec![Arc::new(NotesCollector::new())]);
        assert!(result.is_err());
    }
}
