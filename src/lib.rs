//! csssweep - remove unused CSS from build output
//!
//! csssweep scans the JavaScript and TypeScript modules of a project for
//! class names, ids and other selector-like tokens, then strips every rule
//! from the emitted CSS assets that nothing references. It is usable as a
//! CLI or as a library driven by a host build tool.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (commands, reporting, exit codes)
//! - `config`: Configuration file loading and parsing
//! - `core`: Discovery and purge pipeline (three phases)

pub mod cli;
pub mod config;
pub mod core;
