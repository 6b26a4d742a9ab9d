//! Bedrock add-on merge engine
//!
//! Combines several Minecraft Bedrock add-on packages into one behavior pack
//! and one resource pack. This module exports the core components for the
//! CLI, for tests, and for embedding with custom merge strategies.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod fsutil;
pub mod hooks;
pub mod logging;
pub mod package;
pub mod report;
pub mod strategies;
pub mod synth;
pub mod tables;
pub mod types;
pub mod versions;

pub use config::MergeConfig;
pub use engine::{MergeRun, inspect};
pub use error::{MergeError, MergeResult};
pub use hooks::{HookContext, MergeHook, SubDirectory};
pub use report::MergeReport;
