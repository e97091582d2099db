use std::io::Read;
use std::path::Path;

use anyhow::Context;
use partscout_core::ExtractedRecord;
use partscout_extract::normalize::prepare;
use partscout_extract::{scan_candidates, OcrCandidates, TextOrigin};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct ExtractOutput {
    pub processed_text: String,
    pub data: ExtractedRecord,
    pub candidates: OcrCandidates,
}

pub(crate) fn extract_text(text: &str, origin: TextOrigin) -> ExtractOutput {
    let processed_text = prepare(text, origin).into_owned();
    ExtractOutput {
        data: partscout_extract::extract(&processed_text, origin),
        candidates: scan_candidates(&processed_text),
        processed_text,
    }
}

/// Reads text from `file` (stdin when `None`) and prints the extraction.
///
/// # Errors
///
/// Returns an error if the input cannot be read or the output cannot be
/// serialized.
pub(crate) fn run_extract(origin: TextOrigin, file: Option<&Path>) -> anyhow::Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let output = extract_text(&text, origin);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
