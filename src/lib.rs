//! Hookshift core library.
//!
//! This crate compiles hook signature changes (old → new) into match and
//! replacement rules, applies them to plugin sources or to an external
//! analyzer's diagnostic stream, and reports the hits as location-tagged
//! diagnostics.
//!
//! High-level modules:
//! - `signature`: Method signature parsing with bracket-aware splitting.
//! - `template`: Replacement templates rendered against captured groups.
//! - `rule`: Rule compiler for migration and removal rules.
//! - `ruleset`: Immutable, ordered collection of compiled rules.
//! - `engine`: Text scanning and diagnostic-stream mapping.
//! - `report`: Severity filtering into `DiagnosticError` lists.
//! - `diagnostics`: External analyzer diagnostic trait and JSON loader.
//! - `scan` / `fix`: File-level runners (parallel per file).
//! - `config`: Discovery, effective configuration and hook file loading.
//! - `models`: Severity, match records, issues and hook file schema.
//! - `output`: Human/JSON printers.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `error`: Error types.
//! - `utils`: Console helpers.
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fix;
pub mod models;
pub mod output;
pub mod report;
pub mod rule;
pub mod ruleset;
pub mod scan;
pub mod signature;
pub mod template;
pub mod utils;
