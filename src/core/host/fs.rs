//! Filesystem host: a project directory is the module graph and an output
//! directory is the emitted bundle.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use walkdir::WalkDir;

use super::{
    AssetFile, BundleFile, ChunkFile, ModuleGraph, OutputBundle, OutputFile,
    file_scanner::scan_files,
};
use crate::core::collect::ModuleRecord;

/// Output files with these extensions are code chunks; everything else is an asset.
const CHUNK_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

/// Source modules discovered on disk.
///
/// Every scanned file is treated as loaded. Files matched by an ignore
/// pattern are reported as excluded from the build, and their text is not read.
#[derive(Debug, Default)]
pub struct FsModuleGraph {
    modules: BTreeMap<String, bool>,
    pub skipped_count: usize,
}

impl FsModuleGraph {
    pub fn scan(
        root: &Path,
        includes: &[String],
        ignores: &[String],
        excluded_dirs: &[PathBuf],
        verbose: bool,
    ) -> Self {
        let scanned = scan_files(root, includes, ignores, excluded_dirs, verbose);

        let mut modules = BTreeMap::new();
        for file in scanned.files {
            modules.insert(file, true);
        }
        for file in scanned.ignored {
            modules.insert(file, false);
        }

        Self {
            modules,
            skipped_count: scanned.skipped_count,
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleGraph for FsModuleGraph {
    fn module_ids(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    fn module_info(&self, id: &str) -> Option<ModuleRecord> {
        let included = *self.modules.get(id)?;
        let code = if included {
            // Unreadable text is reported as unavailable, not as an error
            fs::read_to_string(id).ok()
        } else {
            None
        };

        Some(ModuleRecord {
            id: id.to_string(),
            included,
            code,
        })
    }
}

/// A pending or applied asset replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetChange {
    pub file_name: String,
    pub original_size: usize,
    pub new_size: usize,
}

/// The files under an output directory.
///
/// File names are paths relative to the output directory with `/` separators.
/// Without `apply`, mutations only touch the in-memory view so a dry run can
/// report what would change.
pub struct FsBundle {
    out_dir: PathBuf,
    apply: bool,
    files: Vec<OutputFile>,
    changes: Vec<AssetChange>,
}

impl FsBundle {
    pub fn open(out_dir: &Path, apply: bool) -> Result<Self> {
        if !out_dir.is_dir() {
            bail!(
                "Output directory '{}' does not exist.\n\
                 Hint: Run your production build first, or set 'outDir' in the config.",
                out_dir.display()
            );
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(out_dir).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("Cannot read output directory: {}", out_dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let file_name = relative_file_name(out_dir, path);

            let is_chunk = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| CHUNK_EXTENSIONS.contains(&e));

            if is_chunk {
                let code = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read chunk: {}", path.display()))?;
                files.push(ChunkFile { file_name, code }.into());
            } else {
                let source = fs::read(path)
                    .with_context(|| format!("Failed to read asset: {}", path.display()))?;
                files.push(
                    AssetFile {
                        name: path.file_name().map(|n| n.to_string_lossy().to_string()),
                        file_name,
                        source,
                        ..Default::default()
                    }
                    .into(),
                );
            }
        }

        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            apply,
            files,
            changes: Vec::new(),
        })
    }

    pub fn changes(&self) -> &[AssetChange] {
        &self.changes
    }

    pub fn is_apply(&self) -> bool {
        self.apply
    }

    fn path_of(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }

    fn find_asset(&self, file_name: &str) -> Option<usize> {
        self.files
            .iter()
            .position(|f| matches!(f, OutputFile::Asset(a) if a.file_name == file_name))
    }
}

fn relative_file_name(out_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(out_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write through a sibling temp file and rename it over the target.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.csssweep-tmp", file_name));

    fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e).with_context(|| format!("Failed to replace: {}", path.display()));
    }
    Ok(())
}

impl OutputBundle for FsBundle {
    fn files(&self) -> Vec<OutputFile> {
        self.files.clone()
    }

    fn delete_asset(&mut self, file_name: &str) -> Result<Option<AssetFile>> {
        let Some(index) = self.find_asset(file_name) else {
            return Ok(None);
        };
        if self.apply {
            let path = self.path_of(file_name);
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete asset: {}", path.display()))?;
        }
        match self.files.remove(index) {
            OutputFile::Asset(asset) => Ok(Some(asset)),
            OutputFile::Chunk(_) => Ok(None),
        }
    }

    fn emit_asset(&mut self, asset: AssetFile) -> Result<()> {
        if self.apply {
            let path = self.path_of(&asset.file_name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            write_atomic(&path, &asset.source)?;
        }
        self.files.push(asset.into());
        Ok(())
    }

    /// Replaced in place on disk (temp file + rename) so the asset never
    /// disappears, even briefly.
    fn replace_asset(&mut self, file_name: &str, source: String) -> Result<bool> {
        let Some(index) = self.find_asset(file_name) else {
            return Ok(false);
        };

        if self.apply {
            write_atomic(&self.path_of(file_name), source.as_bytes())?;
        }

        let OutputFile::Asset(original) = self.files.remove(index) else {
            return Ok(false);
        };
        self.changes.push(AssetChange {
            file_name: file_name.to_string(),
            original_size: original.source.len(),
            new_size: source.len(),
        });
        self.files.insert(index, original.with_source(source).into());
        Ok(true)
    }
}

impl std::fmt::Debug for FsBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsBundle")
            .field("out_dir", &self.out_dir)
            .field("apply", &self.apply)
            .field(
                "files",
                &self.files.iter().map(|f| f.file_name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Warn about paths that could not be read while scanning.
pub fn report_skipped(graph: &FsModuleGraph, verbose: bool) {
    if graph.skipped_count > 0 {
        eprintln!(
            "{} {} path(s) skipped due to access errors{}",
            "warning:".bold().yellow(),
            graph.skipped_count,
            if verbose { "" } else { " (use -v for details)" }
        );
    }
}
