//! Two-block model reply parsing.
//!
//! The completion endpoint is instructed to answer in two zones: a `WA_MSG:`
//! block with the text for the patient and a `CRM_ACTION:` block with one
//! JSON action record. The model does not always comply cleanly (markers
//! change case, the JSON arrives fenced or bare, bullets come and go), so
//! parsing is tolerant and every failure collapses to a benign default.

use recepta_core::{action::ActionRecord, error::RelayError};

/// Marker opening the human-reply zone.
pub const REPLY_MARKER: &str = "WA_MSG";
/// Marker opening the structured-action zone.
pub const ACTION_MARKER: &str = "CRM_ACTION";

/// A model reply split into its two blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    /// Flattened human-readable reply. Empty when no reply block was found,
    /// which callers treat as a valid no-op, not an error.
    pub message: String,
    /// The action record, `no_action` when absent or malformed.
    pub action: ActionRecord,
}

/// Split a raw model reply into message and action. Never fails.
pub fn parse_reply(raw: &str) -> ParsedReply {
    ParsedReply {
        message: extract_message(raw).unwrap_or_default(),
        action: extract_action(raw),
    }
}

/// Canned two-block reply substituted when the completion call fails.
///
/// Conforms to the same contract the parser expects, so the downstream
/// path never sees an unparseable reply; the error detail travels in the
/// action notes with double quotes flattened to keep the JSON valid.
pub fn fallback_reply(err: &RelayError) -> String {
    let notes = format!("erro LLM: {err}").replace('"', "'");
    let action = ActionRecord {
        notes: Some(notes),
        ..Default::default()
    };
    let action_json = serde_json::to_string(&action)
        .unwrap_or_else(|_| r#"{"intent":"no_action"}"#.to_string());
    format!(
        "WA_MSG:\n- Oi! Tivemos uma instabilidade agora. \
         Pode repetir sua mensagem, por favor?\n\nCRM_ACTION:\n{action_json}"
    )
}

/// Case-insensitive marker search. ASCII lowercasing preserves byte
/// offsets, so the returned index is valid in the original text.
fn find_ci(haystack: &str, marker: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&marker.to_ascii_lowercase())
}

/// Find a marker occurrence followed by optional whitespace and a colon,
/// returning the byte offset just past the colon. Occurrences without a
/// colon (the model talking about the marker in prose) are skipped.
fn after_marker(raw: &str, marker: &str) -> Option<usize> {
    let lower = raw.to_ascii_lowercase();
    let needle = marker.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lower[from..].find(&needle) {
        let tail_start = from + pos + needle.len();
        let tail = &raw[tail_start..];
        let trimmed = tail.trim_start();
        if trimmed.starts_with(':') {
            let colon = tail_start + (tail.len() - trimmed.len());
            return Some(colon + 1);
        }
        from = tail_start;
    }
    None
}

/// Capture the reply zone: everything after `WA_MSG:` up to the first blank
/// line or the action marker, with leading bullets stripped per line.
fn extract_message(raw: &str) -> Option<String> {
    let start = after_marker(raw, REPLY_MARKER)?;
    let after = &raw[start..];

    let end = match (after.find("\n\n"), find_ci(after, ACTION_MARKER)) {
        (Some(blank), Some(marker)) => blank.min(marker),
        (Some(blank), None) => blank,
        (None, Some(marker)) => marker,
        (None, None) => after.len(),
    };

    let lines: Vec<&str> = after[..end]
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            trimmed
                .strip_prefix('-')
                .map(str::trim_start)
                .unwrap_or(trimmed)
        })
        .filter(|line| !line.is_empty())
        .collect();

    Some(lines.join("\n"))
}

/// Capture and parse the action zone. Fenced code blocks need no special
/// handling: the object is located by brace scanning, and a ``` fence
/// contains no braces.
fn extract_action(raw: &str) -> ActionRecord {
    let Some(start) = after_marker(raw, ACTION_MARKER) else {
        return ActionRecord::default();
    };

    balanced_object(&raw[start..])
        .and_then(|json_text| serde_json::from_str(json_text).ok())
        .unwrap_or_default()
}

/// Slice out the first brace-balanced object, respecting JSON strings.
fn balanced_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in s[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
