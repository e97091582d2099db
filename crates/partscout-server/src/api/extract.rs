use axum::{extract::rejection::JsonRejection, Json};
use partscout_core::ExtractedRecord;
use partscout_extract::normalize::prepare;
use partscout_extract::{extract as extract_record, scan_candidates, OcrCandidates, TextOrigin};
use serde::{Deserialize, Serialize};

use super::ApiError;

#[derive(Debug, Deserialize)]
pub(super) struct ExtractRequest {
    text: String,
    /// Defaults to OCR: the endpoint is the boundary for recognizer output.
    #[serde(default = "default_origin")]
    origin: TextOrigin,
}

fn default_origin() -> TextOrigin {
    TextOrigin::Ocr
}

#[derive(Debug, Serialize)]
pub(super) struct ExtractResponse {
    processed_text: String,
    data: ExtractedRecord,
    candidates: OcrCandidates,
}

pub(super) async fn extract(
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(request) = payload?;
    if request.text.trim().is_empty() {
        return Err(ApiError::bad_request("Text is required"));
    }

    let processed_text = prepare(&request.text, request.origin).into_owned();
    let data = extract_record(&processed_text, request.origin);
    let candidates = scan_candidates(&processed_text);

    tracing::debug!(
        origin = ?request.origin,
        part_numbers = candidates.part_numbers.len(),
        "text extracted"
    );

    Ok(Json(ExtractResponse {
        processed_text,
        data,
        candidates,
    }))
}
