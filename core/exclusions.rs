use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Deserialize;

/// Built-in exclusion globs grouped by category, embedded at compile time.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct DefaultExclusions {
    pub groups: IndexMap<String, Vec<String>>,
}

impl DefaultExclusions {
    /// All patterns in declaration order, without duplicates.
    pub fn patterns(&self) -> Vec<String> {
        let mut seen = indexmap::IndexSet::new();
        for pattern in self.groups.values().flatten() {
            seen.insert(pattern.clone());
        }
        seen.into_iter().collect()
    }
}

static DEFAULT_EXCLUSIONS: Lazy<DefaultExclusions> = Lazy::new(|| {
    let yaml_content = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/data/default_exclusions.yaml"
    ));
    serde_yml::from_str(yaml_content).expect("Failed to parse embedded data/default_exclusions.yaml")
});

static DEFAULT_EXCLUSION_PATTERNS: Lazy<Vec<String>> =
    Lazy::new(|| DEFAULT_EXCLUSIONS.patterns());

pub fn get_default_exclusions() -> &'static DefaultExclusions {
    &DEFAULT_EXCLUSIONS
}

pub fn default_exclusion_patterns() -> &'static [String] {
    &DEFAULT_EXCLUSION_PATTERNS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_list_covers_required_categories() {
        let groups = &get_default_exclusions().groups;
        for category in [
            "version_control",
            "dependencies",
            "lockfiles",
            "logs",
            "build_output",
            "environment",
            "editor",
            "misc",
        ] {
            assert!(
                groups.get(category).is_some_and(|p| !p.is_empty()),
                "missing category {category}"
            );
        }
    }

    #[test]
    fn flattened_patterns_are_unique() {
        let patterns = default_exclusion_patterns();
        let unique: std::collections::HashSet<_> = patterns.iter().collect();
        assert_eq!(unique.len(), patterns.len());
        assert!(patterns.iter().any(|p| p == "**/.git/**"));
        assert!(patterns.iter().any(|p| p == "**/node_modules/**"));
    }
}
