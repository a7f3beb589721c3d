//! CLI library for testing purposes

pub mod config;
pub mod fill;
pub mod groups;
pub mod parse;

use thiserror::Error;

pub use config::{ConfigError, FillConfig};
pub use fill::{FillRequest, FillResult, run_fill};
pub use groups::{GroupsOutput, run_groups};
pub use parse::{ParseOutput, read_payload_source, run_parse};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Docfill(#[from] docfill::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template has numbered slots {0:?}; choose one with --slot")]
    SlotRequired(Vec<u32>),

    #[error("{0}")]
    Usage(String),
}
