//! Source parsers.
//!
//! - `module`: JS/TS/JSX/TSX module parser (uses swc for AST generation)

pub mod module;
