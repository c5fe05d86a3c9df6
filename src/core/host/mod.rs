//! The narrow contract between the purge pipeline and a host build tool.
//!
//! The host owns the module graph and the emitted bundle. The pipeline only
//! reads module text through [`ModuleGraph`] and mutates output through
//! [`OutputBundle`], so no host-internal data shapes leak into the core.
//!
//! ## Module Structure
//!
//! - `memory`: in-memory host used by library callers and tests
//! - `fs`: filesystem host (project directory + output directory)
//! - `file_scanner`: source file discovery for the filesystem host

pub mod file_scanner;
pub mod fs;
pub mod memory;

use std::borrow::Cow;

use anyhow::Result;
use enum_dispatch::enum_dispatch;

use crate::core::collect::ModuleRecord;

pub use fs::{FsBundle, FsModuleGraph};
pub use memory::{MemoryBundle, MemoryGraph};

/// Which kind of pass the host is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Interactive development server: the pipeline stays inactive.
    Serve,
    /// Production build: the pipeline runs after every other asset transform.
    Build,
}

/// Read access to the modules loaded during the build.
pub trait ModuleGraph {
    /// Ids of every module loaded during the build, in load order.
    fn module_ids(&self) -> Vec<String>;

    /// Inclusion status and final text for a tracked module.
    fn module_info(&self, id: &str) -> Option<ModuleRecord>;
}

/// Common view over emitted files.
#[enum_dispatch]
pub trait BundleFile {
    fn file_name(&self) -> &str;
}

/// An emitted non-code file (stylesheets, images, fonts...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetFile {
    pub file_name: String,
    pub name: Option<String>,
    pub original_file_name: Option<String>,
    pub need_code_reference: bool,
    pub source: Vec<u8>,
}

impl AssetFile {
    pub fn new(file_name: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            source: source.into(),
            ..Default::default()
        }
    }

    /// Lossy text, for display and tests.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.source)
    }

    /// The source as text, or `None` when it is not valid UTF-8.
    pub fn utf8_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.source).ok()
    }

    /// Same metadata, new content.
    pub fn with_source(self, source: impl Into<Vec<u8>>) -> Self {
        Self {
            source: source.into(),
            ..self
        }
    }
}

impl BundleFile for AssetFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// An emitted code chunk. Never purged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkFile {
    pub file_name: String,
    pub code: String,
}

impl BundleFile for ChunkFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[enum_dispatch(BundleFile)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFile {
    Asset(AssetFile),
    Chunk(ChunkFile),
}

impl OutputFile {
    pub fn as_asset(&self) -> Option<&AssetFile> {
        match self {
            Self::Asset(asset) => Some(asset),
            Self::Chunk(_) => None,
        }
    }
}

/// Mutable access to the emitted bundle.
pub trait OutputBundle {
    /// Every emitted file, assets and chunks alike.
    fn files(&self) -> Vec<OutputFile>;

    /// Remove an asset, returning it if it existed.
    fn delete_asset(&mut self, file_name: &str) -> Result<Option<AssetFile>>;

    /// Register a new asset.
    fn emit_asset(&mut self, asset: AssetFile) -> Result<()>;

    /// Swap an asset's content, keeping its metadata.
    ///
    /// Returns false (and changes nothing) when no such asset exists.
    fn replace_asset(&mut self, file_name: &str, source: String) -> Result<bool> {
        match self.delete_asset(file_name)? {
            Some(original) => {
                self.emit_asset(original.with_source(source))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
