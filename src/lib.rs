//! Cli for folding raw app and browser captures into one categorized daily
//! record. Reads whatever the collectors managed to write, normalizes the
//! three timestamp conventions they use, and turns the result into a json
//! record plus a markdown note.
//!

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod sources;
pub mod utils;
