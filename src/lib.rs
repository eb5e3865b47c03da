//! rulerun core library.
//!
//! This crate exposes programmatic APIs for discovering repository rule
//! checks, running them as isolated subprocesses, and resolving the YAML
//! configuration/suppression store.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Configuration store with folder overrides and suppressions.
//! - `registry`: Check discovery (filesystem scan or static registration).
//! - `executor`: Isolated subprocess execution with a bounded timeout.
//! - `runner`: Selection, sequential/parallel orchestration, exit codes.
//! - `models`: Descriptors, results, and run summaries.
//! - `output`: Table/markdown/plain/json report printers.
//! - `notify`: Fire-and-forget Slack/GitHub collaborators.
//! - `logger`: Explicit logger handle passed down from `main`.
pub mod cli;
pub mod config;
pub mod executor;
pub mod logger;
pub mod models;
pub mod notify;
pub mod output;
pub mod registry;
pub mod runner;
