//! Extraction of the quote object embedded in free-form provider text.
//!
//! The object is taken as everything from the first `{` to the last `}`.
//! Surrounding prose is ignored; braces are not matched, so a reply carrying
//! two separate objects does not parse.

use serde::Deserialize;

use crate::error::GenerationError;

const UNKNOWN_AUTHOR: &str = "Unknown";
const UNKNOWN_WORK: &str = "Unknown Work";

/// Fields read from the provider's JSON, with defaults applied.
///
/// Any other keys in the object, such as `explanation`, are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotePayload {
    pub quote: String,
    pub author: String,
    pub work: String,
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    quote: Option<String>,
    author: Option<String>,
    work: Option<String>,
}

/// Slice from the first `{` through the last `}`, if both exist in order.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_quote_payload(text: &str) -> Result<QuotePayload, GenerationError> {
    let json = extract_json_object(text).ok_or(GenerationError::NoJson)?;
    let raw: RawPayload = serde_json::from_str(json)?;

    Ok(QuotePayload {
        quote: raw.quote.unwrap_or_default(),
        author: raw.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        work: raw.work.unwrap_or_else(|| UNKNOWN_WORK.to_string()),
    })
}
