use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into.
const ALWAYS_SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Patterns without `*` or `?` are literal paths relative to the root.
fn has_wildcard(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

fn warn(verbose: bool, message: std::fmt::Arguments<'_>) {
    if verbose {
        eprintln!("{} {}", "warning:".bold().yellow(), message);
    }
}

/// Source modules found under the include roots.
#[derive(Debug, Default)]
pub struct ScanFilesResult {
    /// Modules that take part in the build.
    pub files: BTreeSet<String>,
    /// Modules matched by an ignore pattern: tracked, but excluded from the build.
    pub ignored: BTreeSet<String>,
    pub skipped_count: usize,
}

/// Compiled `ignores` config. Globs are tried against both the absolute path
/// and the path relative to the root.
struct IgnoreSet<'a> {
    root: &'a Path,
    prefixes: Vec<PathBuf>,
    globs: Vec<Pattern>,
}

impl<'a> IgnoreSet<'a> {
    fn new(root: &'a Path, patterns: &[String], verbose: bool) -> Self {
        let mut set = Self {
            root,
            prefixes: Vec::new(),
            globs: Vec::new(),
        };
        for raw in patterns {
            if !has_wildcard(raw) {
                set.prefixes.push(root.join(raw));
                continue;
            }
            match Pattern::new(raw) {
                Ok(pattern) => set.globs.push(pattern),
                Err(e) => warn(verbose, format_args!("Invalid ignore pattern '{}': {}", raw, e)),
            }
        }
        set
    }

    fn matches(&self, path: &Path) -> bool {
        if self.prefixes.iter().any(|prefix| path.starts_with(prefix)) {
            return true;
        }
        let relative = path.strip_prefix(self.root).unwrap_or(path);
        self.globs
            .iter()
            .any(|glob| glob.matches_path(path) || glob.matches_path(relative))
    }
}

/// Directories to walk: the root itself when `includes` is empty, otherwise
/// every existing literal include and every directory a glob include expands to.
fn include_roots(root: &Path, includes: &[String], verbose: bool) -> Vec<PathBuf> {
    if includes.is_empty() {
        return vec![root.to_path_buf()];
    }

    let mut roots = Vec::new();
    for include in includes {
        let joined = root.join(include);
        if !has_wildcard(include) {
            if joined.exists() {
                roots.push(joined);
            } else {
                warn(
                    verbose,
                    format_args!("Include path does not exist: {}", joined.display()),
                );
            }
            continue;
        }
        match glob(&joined.to_string_lossy()) {
            Ok(paths) => roots.extend(paths.flatten().filter(|p| p.is_dir())),
            Err(e) => warn(verbose, format_args!("Invalid glob pattern '{}': {}", include, e)),
        }
    }
    roots
}

fn is_walkable(entry: &DirEntry, excluded_dirs: &[PathBuf]) -> bool {
    if excluded_dirs.iter().any(|dir| entry.path().starts_with(dir)) {
        return false;
    }
    !(entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| ALWAYS_SKIPPED_DIRS.contains(&name)))
}

/// Walk the include roots and sort source modules into built and ignored.
///
/// Overlapping includes are deduplicated. Unreadable entries are counted in
/// `skipped_count` and never abort the scan.
pub fn scan_files(
    root: &Path,
    includes: &[String],
    ignore_patterns: &[String],
    excluded_dirs: &[PathBuf],
    verbose: bool,
) -> ScanFilesResult {
    let ignores = IgnoreSet::new(root, ignore_patterns, verbose);
    let mut result = ScanFilesResult::default();

    for dir in include_roots(root, includes, verbose) {
        let walker = WalkDir::new(dir)
            .into_iter()
            .filter_entry(|entry| is_walkable(entry, excluded_dirs));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    result.skipped_count += 1;
                    warn(verbose, format_args!("Cannot access path: {}", e));
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_scannable_file(path) {
                continue;
            }

            let id = path.to_string_lossy().into_owned();
            if ignores.matches(path) {
                result.ignored.insert(id);
            } else {
                result.files.insert(id);
            }
        }
    }

    result
}

/// JS/TS source modules. Declaration files carry no runtime text.
pub fn is_scannable_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.ends_with(".d.ts") {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("tsx" | "ts" | "jsx" | "js" | "mjs" | "cjs" | "mts" | "cts")
    )
}
