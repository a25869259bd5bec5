//! # Model Reply Sanitizer
//!
//! Vision models are asked to answer with bare JSON but often wrap it in a
//! markdown code fence. This module turns such a reply into an [`Extraction`]
//! in two explicit stages, [`strip_markdown_fence`] and [`try_decode`], and then
//! runs the totals cross-check on the decoded record.
//!
//! Everything here is pure and synchronous: no I/O, no shared state.

use crate::constants::DEFAULT_SUM_TOLERANCE;
use crate::errors::DecodeError;
use crate::types::Extraction;
use crate::validation::{cross_check, SumCheck};
use serde_json::Value;

const FENCE: &str = "```";

/// Removes a surrounding markdown code fence, if any.
///
/// Handles a plain fence and a fence followed by a language tag such as
/// `json`. A reply that opens a fence but was cut off before closing it only
/// loses the opening marker. The interior is returned trimmed.
pub fn strip_markdown_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_open) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    let body = strip_language_tag(after_open);
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

/// Drops the info string right after an opening fence.
///
/// A tag is only recognised when whitespace follows it, or when it is `json`
/// glued directly to the payload (` ```json{"a":1}``` `).
fn strip_language_tag(text: &str) -> &str {
    let tag_len = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '.' | '-')))
        .unwrap_or(text.len());
    if tag_len == 0 {
        return text;
    }

    let (tag, rest) = text.split_at(tag_len);
    if rest.starts_with(char::is_whitespace) || tag.eq_ignore_ascii_case("json") {
        rest
    } else {
        text
    }
}

/// Decodes text as JSON, reporting failure as a value instead of panicking.
pub fn try_decode(text: &str) -> Result<Value, DecodeError> {
    Ok(serde_json::from_str(text)?)
}

/// Turns a raw model reply into the response returned to the client.
///
/// Invalid JSON yields [`Extraction::ParseFailure`] holding the fence-stripped
/// text. Decoded objects carrying both `itens` and `valor_total` are
/// cross-checked against `tolerance`; any other decoded value is passed
/// through untouched.
pub fn sanitize_and_validate(raw_text: &str, tolerance: f64) -> Extraction {
    let cleaned = strip_markdown_fence(raw_text);

    match try_decode(cleaned) {
        Ok(value) => {
            let check = match value.as_object() {
                Some(record) => cross_check(record, tolerance),
                None => SumCheck::Skipped,
            };
            Extraction::Record { value, check }
        }
        Err(error) => Extraction::ParseFailure {
            raw_response: cleaned.to_string(),
            error,
        },
    }
}

/// [`sanitize_and_validate`] with the default tolerance of one cent.
pub fn sanitize(raw_text: &str) -> Extraction {
    sanitize_and_validate(raw_text, DEFAULT_SUM_TOLERANCE)
}
