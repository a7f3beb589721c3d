use std::path::Path;

use docfill::{Payload, Record, normalize::normalize, parse};
use serde::Serialize;

use crate::CliError;

#[derive(Debug, Serialize)]
pub struct ParseOutput {
    pub format: String,
    pub record: Record,
}

/// Reads the payload from `input` or `text` (exactly one must be given).
pub fn read_payload_source(input: Option<&Path>, text: Option<&str>) -> Result<String, CliError> {
    match (input, text) {
        (Some(path), None) => Ok(std::fs::read_to_string(path)?),
        (None, Some(text)) => Ok(text.to_string()),
        _ => Err(CliError::Usage(
            "Provide exactly one of --input or --text".to_string(),
        )),
    }
}

/// Detects the payload format and optionally expands field aliases.
pub fn run_parse(payload: &str, expand_aliases: bool) -> ParseOutput {
    let payload: Payload = parse(payload);
    let format = payload.format().to_string();
    let record = if expand_aliases {
        normalize(payload.record())
    } else {
        payload.into_record()
    };
    ParseOutput { format, record }
}
