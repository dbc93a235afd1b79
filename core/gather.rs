use crate::error::{AppError, Result};
use crate::exclusions::default_exclusion_patterns;
use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use log;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Built-in exclusions plus caller-supplied ones.
///
/// Built-in globs only ever see a path relative to the project: the base
/// directory when the candidate lies under it, otherwise the root the walk
/// started from. Directories above the project never take part in matching.
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    builtin: GlobSet,
    caller: GlobSet,
    relative_to: Option<PathBuf>,
}

impl ExclusionMatcher {
    /// `relative_to` is the base directory patterns were resolved against, if
    /// any. Caller patterns are tested against the candidate as written and in
    /// its base-relative form, so `!docs/secret.txt` still applies to
    /// `/base/docs/secret.txt`.
    pub fn new(extra: &[String], relative_to: Option<&Path>) -> Result<Self> {
        let caller: Vec<String> = extra
            .iter()
            .map(|p| normalize_pattern(p))
            .filter(|p| !p.is_empty())
            .collect();
        Ok(Self {
            builtin: build_glob_set_from_vec(default_exclusion_patterns())?,
            caller: build_glob_set_from_vec(&caller)?,
            relative_to: relative_to.map(normalize_path),
        })
    }

    pub fn is_excluded(&self, path: &Path, is_dir: bool, walk_root: &Path) -> bool {
        let candidate = normalize_path(path);
        let base_relative = self
            .relative_to
            .as_deref()
            .and_then(|base| strip_root(&candidate, base));

        let project_relative = base_relative
            .clone()
            .or_else(|| strip_root(&candidate, &normalize_path(walk_root)));
        if let Some(relative) = &project_relative {
            if glob_set_matches(&self.builtin, relative, is_dir) {
                log::trace!(
                    "Path excluded by built-in pattern: {}",
                    candidate.display()
                );
                return true;
            }
        }

        if glob_set_matches(&self.caller, &candidate, is_dir)
            || base_relative
                .as_deref()
                .is_some_and(|relative| glob_set_matches(&self.caller, relative, is_dir))
        {
            log::trace!("Path excluded: {}", candidate.display());
            return true;
        }
        false
    }
}

fn glob_set_matches(set: &GlobSet, path: &Path, is_dir: bool) -> bool {
    set.is_match(path) || (is_dir && set.is_match(path.join("dummy_file_for_dir_match")))
}

/// `path` with the leading `root` removed; `.` is the root of every relative path.
fn strip_root(path: &Path, root: &Path) -> Option<PathBuf> {
    if root == Path::new(".") {
        return (!path.is_absolute()).then(|| path.to_path_buf());
    }
    path.strip_prefix(root).ok().map(Path::to_path_buf)
}

/// Expands `pattern` against the filesystem, returning matching regular files
/// sorted by path. A pattern with no match yields an empty list.
pub fn expand_glob(pattern: &str, exclusions: &ExclusionMatcher) -> Result<Vec<PathBuf>> {
    let normalized = normalize_pattern(pattern);
    if normalized.is_empty() {
        return Ok(Vec::new());
    }
    let matcher = compile_matcher(&normalized)?;
    let root = glob_root(&normalized);
    if !root.exists() {
        log::debug!(
            "Glob root '{}' for pattern '{}' does not exist, no matches.",
            root.display(),
            pattern
        );
        return Ok(Vec::new());
    }

    log::trace!(
        "Expanding glob '{}' from root '{}'",
        normalized,
        root.display()
    );
    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !exclusions.is_excluded(entry.path(), true, &root)
        });

    let mut matched = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Error walking '{}': {}", root.display(), e);
                continue;
            }
        };
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        let candidate = normalize_path(entry.path());
        if matcher.is_match(&candidate) && !exclusions.is_excluded(&candidate, false, &root) {
            log::trace!("Matched file: {}", candidate.display());
            matched.push(candidate);
        }
    }
    log::debug!("Glob '{}' matched {} files.", pattern, matched.len());
    Ok(matched)
}

/// Glob that selects every file below `dir`.
pub fn directory_glob(dir: &Path) -> String {
    let dir = dir.to_string_lossy();
    let trimmed = dir.trim_end_matches(&['/', '\\'] as &[char]);
    format!("{}/**/*", trimmed)
}

fn compile_matcher(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| AppError::Glob(format!("Invalid glob pattern \"{}\": {}", pattern, e)))
}

fn build_glob_set_from_vec(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern_str in patterns {
        let mut processed_pattern = pattern_str.trim().to_string();
        if processed_pattern.ends_with('/') && processed_pattern.len() > 1 {
            processed_pattern.push_str("**");
        }
        match GlobBuilder::new(&processed_pattern)
            .literal_separator(true)
            .build()
        {
            Ok(glob) => {
                log::trace!(
                    "Adding exclusion pattern: {} (processed as {})",
                    pattern_str,
                    processed_pattern
                );
                builder.add(glob);
            }
            Err(e) => {
                log::error!("Invalid glob pattern \"{}\": {}", pattern_str, e);
                return Err(AppError::Glob(format!(
                    "Invalid glob pattern \"{}\" (processed as \"{}\"): {}",
                    pattern_str, processed_pattern, e
                )));
            }
        }
    }
    builder.build().map_err(|e| {
        log::error!("Error building glob set: {}", e);
        AppError::Glob(e.to_string())
    })
}

/// Longest leading run of literal segments; the directory the walk starts in.
fn glob_root(pattern: &str) -> PathBuf {
    let mut root = PathBuf::new();
    if pattern.starts_with('/') {
        root.push("/");
    }
    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        if segment.contains(GLOB_META) {
            break;
        }
        root.push(segment);
    }
    if root.as_os_str().is_empty() {
        root.push(".");
    }
    root
}

/// Drops `.` segments so `./docs/*.md` and `docs/*.md` behave the same.
fn normalize_pattern(pattern: &str) -> String {
    let absolute = pattern.starts_with('/');
    let joined = pattern
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");
    match (absolute, pattern.ends_with('/') && !joined.is_empty()) {
        (true, true) => format!("/{}/", joined),
        (true, false) => format!("/{}", joined),
        (false, true) => format!("{}/", joined),
        (false, false) => joined,
    }
}

pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Resolves `.` and `..` segments without touching the filesystem.
pub(crate) fn lexical_normalize(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match resolved.components().next_back() {
                Some(Component::Normal(_)) => {
                    resolved.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => resolved.push(".."),
            },
            other => resolved.push(other.as_os_str()),
        }
    }
    if resolved.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        resolved
    }
}

pub(crate) fn escapes_base(relative: &Path) -> bool {
    matches!(relative.components().next(), Some(Component::ParentDir))
}
