//! Orchestration de chromascii : pipeline de conversion, mode lots et CLI.

pub mod batch;
pub mod cli;
pub mod output;
pub mod pipeline;
