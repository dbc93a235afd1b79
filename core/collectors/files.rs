use crate::collector::{Collector, GatherContext, GatherValue, OptionsOrigin, PathSpec};
use crate::error::{AppError, Result};
use crate::gather::{ExclusionMatcher, directory_glob, escapes_base, expand_glob, lexical_normalize};
use crate::info::GatheredInformation;
use async_trait::async_trait;
use futures::future::try_join_all;
use log;
use std::path::{Path, PathBuf};

pub const FILES_COLLECTOR_NAME: &str = "files";

/// Reads files, directories and glob matches into `<file name="...">` blocks.
#[derive(Debug, Default, Clone)]
pub struct FilesCollector;

/// An inclusion pattern after base-directory resolution.
#[derive(Debug, Clone)]
struct ResolvedPattern {
    original: String,
    path: PathBuf,
    joined_with_base: bool,
}

impl FilesCollector {
    pub fn new() -> Self {
        Self
    }

    pub fn specs_from_value(options: &GatherValue) -> Result<Vec<PathSpec>> {
        options
            .as_items()
            .into_iter()
            .map(|item| match item {
                GatherValue::Text(path) => Ok(PathSpec::new(path.clone())),
                GatherValue::Path(spec) => Ok(spec.clone()),
                other => Err(AppError::invalid_options(
                    FILES_COLLECTOR_NAME,
                    format!("expected paths or globs, got {}", other.kind()),
                )),
            })
            .collect()
    }

    pub async fn collect(
        &self,
        specs: &[PathSpec],
        context: &GatherContext,
    ) -> Result<Vec<GatheredInformation>> {
        let (inclusions, exclusions) = partition_specs(specs);
        log::debug!(
            "Files collector: {} inclusion and {} exclusion patterns",
            inclusions.len(),
            exclusions.len()
        );

        let resolved: Vec<ResolvedPattern> = inclusions
            .iter()
            .map(|spec| resolve_pattern(spec, context))
            .collect();
        let base_dir = if resolved.iter().any(|r| r.joined_with_base) {
            context.config_base_dir.clone()
        } else {
            None
        };

        let matcher = ExclusionMatcher::new(&exclusions, base_dir.as_deref())?;
        let per_pattern = try_join_all(
            resolved
                .iter()
                .map(|pattern| collect_pattern_paths(&pattern.path, &matcher)),
        )
        .await?;
        // The spec string is only shown verbatim when it named one literal file.
        let single_original = match (resolved.as_slice(), per_pattern.as_slice()) {
            ([only], [(_, PatternKind::File)]) => Some(only.original.as_str()),
            _ => None,
        };
        let file_paths: Vec<PathBuf> = per_pattern
            .into_iter()
            .flat_map(|(paths, _)| paths)
            .collect();
        log::info!("Reading {} files...", file_paths.len());

        let contents = try_join_all(file_paths.iter().map(|path| read_file(path))).await?;

        Ok(file_paths
            .iter()
            .zip(contents)
            .map(|(path, content)| {
                let name = display_name(path, base_dir.as_deref(), single_original);
                GatheredInformation::new("file", content).with_attr("name", name)
            })
            .collect())
    }
}

#[async_trait]
impl Collector for FilesCollector {
    fn name(&self) -> &str {
        FILES_COLLECTOR_NAME
    }

    fn description(&self) -> &str {
        "Gathers information from files"
    }

    async fn gather(
        &self,
        options: &GatherValue,
        context: &GatherContext,
    ) -> Result<Vec<GatheredInformation>> {
        let specs = Self::specs_from_value(options)?;
        self.collect(&specs, context).await
    }

    fn parse_options(&self, raw: &str) -> Option<GatherValue> {
        Some(GatherValue::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|path| GatherValue::Path(PathSpec::with_origin(path, OptionsOrigin::CommandLine)))
                .collect(),
        ))
    }
}

fn partition_specs(specs: &[PathSpec]) -> (Vec<PathSpec>, Vec<String>) {
    let mut inclusions = Vec::new();
    let mut exclusions = Vec::new();
    for spec in specs {
        match spec.path.strip_prefix('!') {
            Some(excluded) => exclusions.push(excluded.to_string()),
            None => inclusions.push(spec.clone()),
        }
    }
    (inclusions, exclusions)
}

fn resolve_pattern(spec: &PathSpec, context: &GatherContext) -> ResolvedPattern {
    let origin = spec.origin.unwrap_or(context.options_origin);
    match context.base_dir_for(origin) {
        Some(base) => ResolvedPattern {
            original: spec.path.clone(),
            path: base.join(&spec.path),
            joined_with_base: true,
        },
        None => ResolvedPattern {
            original: spec.path.clone(),
            path: PathBuf::from(&spec.path),
            joined_with_base: false,
        },
    }
}

/// How an inclusion pattern was interpreted once the filesystem was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    File,
    Directory,
    Glob,
}

async fn collect_pattern_paths(
    pattern: &Path,
    matcher: &ExclusionMatcher,
) -> Result<(Vec<PathBuf>, PatternKind)> {
    match tokio::fs::metadata(pattern).await {
        Ok(metadata) if metadata.is_dir() => {
            log::trace!("Expanding directory: {}", pattern.display());
            let paths = expand_glob(&directory_glob(pattern), matcher)?;
            Ok((paths, PatternKind::Directory))
        }
        Ok(_) => Ok((vec![pattern.to_path_buf()], PatternKind::File)),
        Err(e) => {
            log::trace!(
                "'{}' is not a literal path ({}), treating it as a glob",
                pattern.display(),
                e
            );
            let paths = expand_glob(&pattern.to_string_lossy(), matcher)?;
            Ok((paths, PatternKind::Glob))
        }
    }
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::FileRead {
            path: path.to_path_buf(),
            source,
        })
}

fn display_name(path: &Path, base_dir: Option<&Path>, single_original: Option<&str>) -> String {
    let Some(base) = base_dir else {
        return path.display().to_string();
    };
    if let Some(original) = single_original {
        return original.to_string();
    }
    let resolved = lexical_normalize(path);
    match pathdiff::diff_paths(&resolved, base) {
        Some(relative) if !escapes_base(&relative) => relative.display().to_string(),
        _ => resolved.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    fn config_context(base: &Path) -> GatherContext {
        GatherContext {
            config_base_dir: Some(base.to_path_buf()),
            options_origin: OptionsOrigin::ConfigFile,
        }
    }

    fn names(records: &[GatheredInformation]) -> Vec<&str> {
        records.iter().map(|r| r.attrs["name"].as_str()).collect()
    }

    #[test]
    fn has_name_and_description() {
        let collector = FilesCollector::new();
        assert_eq!(collector.name(), "files");
        assert_eq!(collector.description(), "Gathers information from files");
    }

    #[test]
    fn parse_options_splits_and_marks_command_line() {
        let parsed = FilesCollector::new()
            .parse_options("./docs, ./src/**/*.tsx,")
            .unwrap();
        let specs = FilesCollector::specs_from_value(&parsed).unwrap();
        assert_eq!(
            specs,
            vec![
                PathSpec::with_origin("./docs", OptionsOrigin::CommandLine),
                PathSpec::with_origin("./src/**/*.tsx", OptionsOrigin::CommandLine),
            ]
        );
    }

    #[tokio::test]
    async fn single_config_file_shows_original_spec() {
        let dir = fixture(&[("docs/file1.txt", "from the config dir")]);
        let specs = vec![PathSpec::new("./docs/file1.txt")];

        let records = FilesCollector::new()
            .collect(&specs, &config_context(dir.path()))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tag, "file");
        assert_eq!(names(&records), vec!["./docs/file1.txt"]);
        assert_eq!(records[0].content, "from the config dir");
    }

    #[tokio::test]
    async fn command_line_specs_ignore_config_dir() {
        // The test binary runs from the crate directory, which has a real Cargo.toml.
        let dir = fixture(&[("Cargo.toml", "decoy")]);
        let cli_spec = vec![PathSpec::with_origin("Cargo.toml", OptionsOrigin::CommandLine)];

        let records = FilesCollector::new()
            .collect(&cli_spec, &config_context(dir.path()))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(names(&records), vec!["Cargo.toml"]);
        assert!(records[0].content.contains("recon-core"));

        let config_spec = vec![PathSpec::new("Cargo.toml")];
        let records = FilesCollector::new()
            .collect(&config_spec, &config_context(dir.path()))
            .await
            .unwrap();
        assert_eq!(records[0].content, "decoy");
    }

    #[tokio::test]
    async fn negated_patterns_exclude_matches() {
        let dir = fixture(&[
            ("docs/file1.txt", "one"),
            ("docs/file2.txt", "two"),
            ("docs/secret.txt", "hidden"),
        ]);
        let specs = vec![PathSpec::new("docs/**"), PathSpec::new("!docs/secret.txt")];

        let records = FilesCollector::new()
            .collect(&specs, &config_context(dir.path()))
            .await
            .unwrap();

        assert_eq!(names(&records), vec!["docs/file1.txt", "docs/file2.txt"]);
        assert_eq!(records[1].content, "two");
    }

    #[tokio::test]
    async fn directories_expand_minus_builtin_exclusions() {
        let dir = fixture(&[
            ("project/src/main.rs", "fn main() {}"),
            ("project/README.md", "# readme"),
            ("project/node_modules/dep/index.js", "nope"),
            ("project/.git/HEAD", "ref"),
            ("project/.env", "SECRET=1"),
            ("project/package-lock.json", "{}"),
        ]);
        let specs = vec![PathSpec::new("project"), PathSpec::new("project/README.md")];

        let records = FilesCollector::new()
            .collect(&specs, &config_context(dir.path()))
            .await
            .unwrap();

        // No de-duplication: README.md arrives once per matching spec.
        assert_eq!(
            names(&records),
            vec!["project/README.md", "project/src/main.rs", "project/README.md"]
        );
    }

    #[tokio::test]
    async fn project_under_excluded_ancestor_keeps_its_files() {
        let dir = fixture(&[
            ("out/proj/src/lib.rs", "pub mod app;"),
            ("out/proj/src/main.rs", "fn main() {}"),
        ]);
        let base = dir.path().join("out/proj");

        for spec in ["src", "src/*.rs"] {
            let records = FilesCollector::new()
                .collect(&[PathSpec::new(spec)], &config_context(&base))
                .await
                .unwrap();
            assert_eq!(names(&records), vec!["src/lib.rs", "src/main.rs"], "spec {spec}");
        }

        let absolute = base.join("src").display().to_string();
        let records = FilesCollector::new()
            .collect(
                &[PathSpec::with_origin(absolute, OptionsOrigin::CommandLine)],
                &GatherContext::default(),
            )
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn single_directory_spec_shows_relative_names() {
        let dir = fixture(&[("src/lib.rs", "only file")]);
        let records = FilesCollector::new()
            .collect(&[PathSpec::new("src")], &config_context(dir.path()))
            .await
            .unwrap();
        assert_eq!(names(&records), vec!["src/lib.rs"]);

        let records = FilesCollector::new()
            .collect(&[PathSpec::new("src/*.rs")], &config_context(dir.path()))
            .await
            .unwrap();
        assert_eq!(names(&records), vec!["src/lib.rs"]);
    }

    #[tokio::test]
    async fn missing_literal_path_is_a_glob_with_no_matches() {
        let dir = fixture(&[("a.txt", "a")]);
        let specs = vec![PathSpec::new("does/not/exist.txt")];
        let records = FilesCollector::new()
            .collect(&specs, &config_context(dir.path()))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn glob_without_base_keeps_resolved_paths() {
        let dir = fixture(&[("notes/a.md", "a"), ("notes/b.md", "b"), ("notes/c.txt", "c")]);
        let pattern = format!("{}/notes/*.md", dir.path().display());
        let specs = vec![PathSpec::with_origin(pattern, OptionsOrigin::CommandLine)];

        let records = FilesCollector::new()
            .collect(&specs, &GatherContext::default())
            .await
            .unwrap();

        let expected: Vec<String> = ["a.md", "b.md"]
            .iter()
            .map(|f| dir.path().join("notes").join(f).display().to_string())
            .collect();
        assert_eq!(names(&records), expected);
    }

    #[tokio::test]
    async fn paths_escaping_the_base_fall_back_to_resolved_path() {
        let outer = fixture(&[("config/inside.txt", "in"), ("outside.txt", "out")]);
        let base = outer.path().join("config");
        let specs = vec![PathSpec::new("inside.txt"), PathSpec::new("../outside.txt")];

        let records = FilesCollector::new()
            .collect(&specs, &config_context(&base))
            .await
            .unwrap();

        assert_eq!(records[0].attrs["name"], "inside.txt");
        assert_eq!(
            records[1].attrs["name"],
            outer.path().join("outside.txt").display().to_string()
        );
    }

    #[tokio::test]
    async fn unreadable_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("binary.bin"), [0xff, 0xfe, 0x00, 0x81]).unwrap();
        let specs = vec![PathSpec::new("binary.bin")];

        let err = FilesCollector::new()
            .collect(&specs, &config_context(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FileRead { .. }));
    }

    #[tokio::test]
    async fn rejects_non_path_options() {
        let options = GatherValue::Data(serde_json::json!({ "depth": 2 }));
        let err = FilesCollector::new()
            .gather(&options, &GatherContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidOptions { .. }));
    }
}
