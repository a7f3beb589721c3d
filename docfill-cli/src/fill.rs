use std::path::{Path, PathBuf};

use docfill::{
    FillOutcome, FillSession, SlotChoice, Template, render::TextRenderer, traits::Loader,
};

use crate::{CliError, config::FillConfig};

/// Inputs of `docfill fill`.
#[derive(Debug, Clone, Default)]
pub struct FillRequest {
    pub template: PathBuf,
    pub data: Vec<PathBuf>,
    pub slot: Option<SlotChoice>,
    pub config: FillConfig,
}

#[derive(Debug)]
pub struct FillResult {
    pub output: Vec<u8>,
    pub session: FillSession,
    /// Data files that matched no known payload format.
    pub skipped: Vec<PathBuf>,
}

/// Feeds every data file through one session, rendering after each fill.
///
/// `TextRenderer` neither escapes values nor joins split runs, so Word XML
/// templates are refused.
pub fn run_fill(request: &FillRequest) -> Result<FillResult, CliError> {
    let template = Template::read_from(&request.template)?;
    if template.is_word_xml() {
        return Err(CliError::Usage(format!(
            "{} is WordprocessingML; fill renders plain-text templates only",
            request.template.display()
        )));
    }
    let mut session = FillSession::with_options(request.config.session_options());
    session.load_template(template);
    if let Some(slot) = request.slot {
        session.choose_slot(slot);
    }

    let mut output: Option<Vec<u8>> = None;
    let mut skipped = Vec::new();
    for path in &request.data {
        let payload = std::fs::read_to_string(path)?;
        match session.receive_scan_payload(payload) {
            FillOutcome::Applied(report) => {
                log::info!(
                    "{}: {} key(s) filled, {} unresolved",
                    path.display(),
                    report.updated.len(),
                    report.unresolved.len()
                );
                output = Some(session.render(&TextRenderer)?);
            }
            FillOutcome::AwaitingSlot { indices } => {
                return Err(CliError::SlotRequired(indices));
            }
            FillOutcome::Unparsed { .. } => {
                log::warn!("{}: could not understand data, skipped", path.display());
                skipped.push(path.clone());
            }
            FillOutcome::Queued | FillOutcome::Empty => {}
        }
    }

    let output = match output {
        Some(output) => output,
        None => session.render(&TextRenderer)?,
    };
    Ok(FillResult {
        output,
        session,
        skipped,
    })
}

/// Writes `bytes` to `path`, creating parent directories.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
