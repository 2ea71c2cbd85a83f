//! Response normalization: raw Gemini payload to a typed [`KernelResponse`].
//!
//! Model output is untrusted text. It may arrive wrapped in markdown fences,
//! surrounded by prose, truncated, or not be JSON at all. The pipeline here is
//! a fixed two-stage cleanup (fence strip, then brace-span isolation) followed
//! by a plain serde_json parse with field-level defaults. The two stages are
//! deliberately redundant: either alone fails on some observed output shapes.
//! No repair beyond that (no brace balancing, no trailing-comma removal).

use crate::error::{KernelError, Result};
use crate::schemas::{KernelResponse, Recommendation};
use serde_json::Value;

/// Substituted when the reply parses but carries no string `summary`.
pub const FALLBACK_SUMMARY: &str = "Life Kernel could not generate a summary.";

/// Pull the primary text out of a generateContent payload
/// (`candidates[0].content.parts[0].text`).
pub fn candidate_text(payload: &Value) -> Option<&str> {
    payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str)
}

/// Normalize a full provider payload into a [`KernelResponse`].
pub fn normalize(payload: &Value) -> Result<KernelResponse> {
    normalize_text(candidate_text(payload).unwrap_or(""))
}

/// Normalize already-extracted model text into a [`KernelResponse`].
///
/// Every failure maps to a distinct [`KernelError`] variant; this function
/// never panics on any input.
pub fn normalize_text(text: &str) -> Result<KernelResponse> {
    if text.is_empty() {
        return Err(KernelError::EmptyUpstreamResponse);
    }

    let cleaned = isolate_object(strip_code_fence(text.trim()));
    let parsed: Value = serde_json::from_str(cleaned).map_err(|e| KernelError::MalformedJson {
        message: e.to_string(),
        text: cleaned.to_string(),
    })?;

    Ok(validate(&parsed))
}

/// Strip a leading triple-backtick fence (with any language tag) and the last
/// closing fence, when both are present and in order. Text without a leading
/// fence, or with a fence that never closes, passes through untouched.
pub fn strip_code_fence(text: &str) -> &str {
    if !text.starts_with("```") {
        return text;
    }
    if let (Some(first_newline), Some(last_fence)) = (text.find('\n'), text.rfind("```"))
        && last_fence > first_newline
    {
        return text[first_newline + 1..last_fence].trim();
    }
    text
}

/// Slice to the inclusive span from the first `{` through the last `}`, when
/// both exist in order. Discards prose the model wrapped around the object;
/// applied even after fence stripping.
pub fn isolate_object(text: &str) -> &str {
    if let (Some(first), Some(last)) = (text.find('{'), text.rfind('}'))
        && last > first
    {
        return &text[first..=last];
    }
    text
}

/// Field-by-field defensive validation of the parsed value. A wrong-typed
/// `summary` falls back to [`FALLBACK_SUMMARY`]; a wrong-typed
/// `recommendations` becomes empty; malformed array elements are dropped.
fn validate(parsed: &Value) -> KernelResponse {
    let summary = parsed
        .get("summary")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_SUMMARY.to_string());

    let recommendations = parsed
        .get("recommendations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let title = item.get("title")?.as_str()?;
                    let detail = item.get("detail")?.as_str()?;
                    Some(Recommendation {
                        title: title.to_string(),
                        detail: detail.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    KernelResponse {
        summary,
        recommendations,
    }
}
