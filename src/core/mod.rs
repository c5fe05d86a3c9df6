//! Core selector discovery and purge pipeline.
//!
//! ## Module Structure
//!
//! - `collect`: Phase 1, candidate tokens from parsed source modules
//! - `validate`: Phase 2, selector grammar and the discovered `SelectorSet`
//! - `safelist`: merges discovered selectors with user safelist entries
//! - `purge`: Phase 3, parallel purge of emitted CSS assets
//! - `engine`: the built-in rule-based purge engine
//! - `css`: stylesheet tree parsing and serialization
//! - `extract`: token extractors (default and user patterns)
//! - `parsers`: JS/TS/JSX module parsing
//! - `host`: module graph and output bundle contracts
//! - `context`: `SweepPipeline`, the stateful entry point tying phases together

pub mod collect;
pub mod context;
pub mod css;
pub mod engine;
pub mod extract;
pub mod host;
pub mod parsers;
pub mod purge;
pub mod safelist;
pub mod validate;

pub use context::{Discovery, SweepPipeline, SweepReport};
