//! Caller-facing types for the Life Kernel endpoint

use serde::{Deserialize, Serialize};

/// One actionable suggestion inside a kernel reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub detail: String,
}

/// Normalized result returned to callers.
///
/// `summary` is always present (a fixed fallback sentence substitutes for a
/// missing or non-string value); `recommendations` defaults to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelResponse {
    pub summary: String,
    pub recommendations: Vec<Recommendation>,
}
