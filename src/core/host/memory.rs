use anyhow::Result;

use super::{AssetFile, BundleFile, ChunkFile, ModuleGraph, OutputBundle, OutputFile};
use crate::core::collect::ModuleRecord;

/// Module graph held in memory, in load order.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    modules: Vec<ModuleRecord>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module: ModuleRecord) -> Self {
        self.add(module);
        self
    }

    pub fn add(&mut self, module: ModuleRecord) {
        self.modules.retain(|m| m.id != module.id);
        self.modules.push(module);
    }
}

impl ModuleGraph for MemoryGraph {
    fn module_ids(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.id.clone()).collect()
    }

    fn module_info(&self, id: &str) -> Option<ModuleRecord> {
        self.modules.iter().find(|m| m.id == id).cloned()
    }
}

/// Output bundle held in memory, in emit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryBundle {
    files: Vec<OutputFile>,
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, file_name: &str, source: &str) -> Self {
        self.files.push(AssetFile::new(file_name, source).into());
        self
    }

    pub fn with_chunk(mut self, file_name: &str, code: &str) -> Self {
        self.files.push(
            ChunkFile {
                file_name: file_name.to_string(),
                code: code.to_string(),
            }
            .into(),
        );
        self
    }

    pub fn get(&self, file_name: &str) -> Option<&OutputFile> {
        self.files.iter().find(|f| f.file_name() == file_name)
    }

    /// Text of an asset, if present.
    pub fn asset_text(&self, file_name: &str) -> Option<String> {
        self.get(file_name)
            .and_then(OutputFile::as_asset)
            .map(|a| a.text().into_owned())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl OutputBundle for MemoryBundle {
    fn files(&self) -> Vec<OutputFile> {
        self.files.clone()
    }

    fn delete_asset(&mut self, file_name: &str) -> Result<Option<AssetFile>> {
        let position = self
            .files
            .iter()
            .position(|f| matches!(f, OutputFile::Asset(a) if a.file_name == file_name));

        Ok(position.and_then(|index| match self.files.remove(index) {
            OutputFile::Asset(asset) => Some(asset),
            OutputFile::Chunk(_) => None,
        }))
    }

    fn emit_asset(&mut self, asset: AssetFile) -> Result<()> {
        self.files.push(asset.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::host::memory::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_graph_lookup() {
        let graph = MemoryGraph::new()
            .with_module(ModuleRecord::new("a.js", "a"))
            .with_module(ModuleRecord::excluded("b.js", "b"));

        assert_eq!(graph.module_ids(), vec!["a.js", "b.js"]);
        assert!(graph.module_info("a.js").unwrap().included);
        assert!(!graph.module_info("b.js").unwrap().included);
        assert!(graph.module_info("c.js").is_none());
    }

    #[test]
    fn test_graph_add_replaces_same_id() {
        let mut graph = MemoryGraph::new();
        graph.add(ModuleRecord::new("a.js", "one"));
        graph.add(ModuleRecord::new("a.js", "two"));

        assert_eq!(graph.module_ids().len(), 1);
        assert_eq!(graph.module_info("a.js").unwrap().code.as_deref(), Some("two"));
    }

    #[test]
    fn test_replace_asset() {
        let mut bundle = MemoryBundle::new()
            .with_asset("a.css", ".a{}")
            .with_chunk("a.js", "1");

        assert!(bundle.replace_asset("a.css", ".b{}".to_string()).unwrap());
        assert_eq!(bundle.asset_text("a.css").as_deref(), Some(".b{}"));
        assert_eq!(bundle.len(), 2);
    }

    #[test]
    fn test_replace_missing_asset_is_noop() {
        let mut bundle = MemoryBundle::new().with_asset("a.css", ".a{}");
        let before = bundle.clone();

        assert!(!bundle.replace_asset("missing.css", String::new()).unwrap());
        assert_eq!(bundle, before);
    }

    #[test]
    fn test_delete_never_removes_chunks() {
        let mut bundle = MemoryBundle::new().with_chunk("a.css", "not really css");
        assert!(bundle.delete_asset("a.css").unwrap().is_none());
        assert_eq!(bundle.len(), 1);
    }
}
