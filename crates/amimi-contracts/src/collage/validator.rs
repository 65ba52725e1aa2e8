use serde_json::Value;

use crate::error::{IssueCollector, ValidationIssues};

use super::{EncodedImage, RawImageResponse};

/// Encoded payloads shorter than this are treated as truncated or placeholder output.
pub const MIN_IMAGE_CHARS: usize = 1024;

const SCOPE: &str = "Image";
const NO_IMAGE_DATA: &str = "no valid image data found in response";

/// One `inlineData` entry met while walking candidates and parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlinePayload<'a> {
    pub candidate: usize,
    pub part: usize,
    /// Empty when the entry had no usable `data` string.
    pub data: &'a str,
}

/// Lazily yields every inline-data entry, candidates first, then parts, in response order.
pub fn inline_payloads(response: &RawImageResponse) -> impl Iterator<Item = InlinePayload<'_>> {
    response
        .candidates()
        .iter()
        .enumerate()
        .flat_map(|(candidate, value)| {
            candidate_parts(value)
                .iter()
                .enumerate()
                .filter_map(move |(part, part_value)| {
                    let inline = part_value
                        .get("inlineData")
                        .or_else(|| part_value.get("inline_data"))
                        .filter(|inline| is_truthy(inline))?;
                    let data = inline
                        .get("data")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    Some(InlinePayload {
                        candidate,
                        part,
                        data,
                    })
                })
        })
}

/// `null`, `false`, `0` and `""` count as absent; any other value is an entry to inspect.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn candidate_parts(candidate: &Value) -> &[Value] {
    candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Picks the first non-empty inline payload and checks it is big enough to be real.
///
/// Empty payloads passed over on the way are reported even though the scan
/// continues past them, so a response with a good image behind an empty one
/// is still rejected.
pub fn validate_image_response(response: &RawImageResponse) -> Result<EncodedImage, ValidationIssues> {
    let mut issues = IssueCollector::default();
    if response.candidate_count() == 0 {
        issues.push("image response has no candidates");
    }

    let mut selected: Option<&str> = None;
    for payload in inline_payloads(response) {
        if payload.data.is_empty() {
            issues.push(format!(
                "image inline data exists but is empty (candidate {}, part {})",
                payload.candidate, payload.part
            ));
            continue;
        }
        selected = Some(payload.data);
        break;
    }

    match selected {
        Some(data) => issues.check(
            data.len() >= MIN_IMAGE_CHARS,
            format!(
                "image data is suspiciously small ({} < {MIN_IMAGE_CHARS} encoded characters)",
                data.len()
            ),
        ),
        None => issues.push(NO_IMAGE_DATA),
    }

    issues.finish(SCOPE)?;
    selected
        .map(|data| EncodedImage::validated(data.to_string()))
        .ok_or_else(|| ValidationIssues::new(SCOPE, vec![NO_IMAGE_DATA.to_string()]))
}
