//! Phase 1: Collection - candidate selector tokens from source modules.
//!
//! Every included module is parsed once and walked in full. String literals,
//! identifiers and template segments are fed to the extractor and the
//! resulting tokens are merged into one ordered set.

pub mod scanner;
pub mod text_collector;
pub mod types;

pub use scanner::scan_modules;
pub use text_collector::collect_texts;
pub use types::*;
