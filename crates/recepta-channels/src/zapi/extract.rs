//! Tolerant extraction of sender and text from inbound webhook payloads.
//!
//! Webhook providers evolve payload shapes without notice, and the three
//! shapes seen in production (flat Z-API, nested Z-API, Meta Cloud API)
//! disagree on where the sender and the text live. Extraction probes an
//! ordered list of candidate paths and takes the first non-empty string;
//! a missing key or a wrong type is "no value", never an error. A dropped
//! message is less harmful than a crashed handler.

use serde_json::Value;

/// Result of interpreting one inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A genuine inbound text message.
    Message { sender: String, text: String },
    /// A message from a known sender carrying media the relay cannot read.
    Unsupported { sender: String },
    /// Not something to reply to (self-sent echo, status receipt, or
    /// missing fields). Replying to echoes would loop the bot on itself.
    Ignored(&'static str),
}

/// One step of a candidate path.
enum Seg {
    Key(&'static str),
    Idx(usize),
}

use Seg::{Idx, Key};

/// Candidate locations for the sender identifier, most common first.
/// The union of every shape observed across provider revisions.
const SENDER_PATHS: &[&[Seg]] = &[
    &[Key("phone")],
    &[Key("from")],
    &[Key("sender")],
    &[Key("chatId")],
    &[Key("message"), Key("from")],
    &[Key("data"), Key("from")],
    &[Key("contact"), Key("phone")],
    &[
        Key("entry"),
        Idx(0),
        Key("changes"),
        Idx(0),
        Key("value"),
        Key("messages"),
        Idx(0),
        Key("from"),
    ],
];

/// Candidate locations for the message text, most common first.
const TEXT_PATHS: &[&[Seg]] = &[
    &[Key("text")],
    &[Key("body")],
    &[Key("message")],
    &[Key("text"), Key("message")],
    &[Key("message"), Key("text")],
    &[Key("message"), Key("body")],
    &[Key("data"), Key("body")],
    &[
        Key("entry"),
        Idx(0),
        Key("changes"),
        Idx(0),
        Key("value"),
        Key("messages"),
        Idx(0),
        Key("text"),
        Key("body"),
    ],
];

/// Locations where providers put a "this is my own outbound message" flag.
const FROM_ME_PATHS: &[&[Seg]] = &[
    &[Key("fromMe")],
    &[Key("isFromMe")],
    &[Key("message"), Key("fromMe")],
    &[Key("data"), Key("fromMe")],
];

/// Locations where providers declare the message type.
const TYPE_PATHS: &[&[Seg]] = &[
    &[Key("type")],
    &[Key("message"), Key("type")],
    &[
        Key("entry"),
        Idx(0),
        Key("changes"),
        Idx(0),
        Key("value"),
        Key("messages"),
        Idx(0),
        Key("type"),
    ],
];

/// `type` values that mark delivery/read receipts rather than messages.
const STATUS_TYPES: &[&str] = &["delivery", "read", "message-status", "status", "receipt", "ack"];

/// `type` values for media the relay cannot turn into text.
const MEDIA_TYPES: &[&str] = &[
    "image", "audio", "video", "document", "sticker", "ptt", "location", "contact", "contacts",
    "reaction",
];

/// Interpret one inbound webhook payload. Never panics, never errors.
pub fn extract(payload: &Value) -> Extraction {
    if is_from_me(payload) {
        return Extraction::Ignored("self-sent message");
    }
    if is_status_notification(payload) {
        return Extraction::Ignored("status notification");
    }

    let sender = first_string(payload, SENDER_PATHS);
    if sender.is_empty() {
        return Extraction::Ignored("no sender found");
    }

    if let Some(kind) = declared_type(payload) {
        if MEDIA_TYPES.contains(&kind.as_str()) {
            return Extraction::Unsupported { sender };
        }
    }

    let text = first_string(payload, TEXT_PATHS);
    if text.is_empty() {
        return Extraction::Ignored("no text found");
    }

    Extraction::Message { sender, text }
}

/// Descend through a payload along one path. Any mismatch yields `None`.
fn lookup<'a>(payload: &'a Value, path: &[Seg]) -> Option<&'a Value> {
    path.iter().try_fold(payload, |value, seg| match seg {
        Key(k) => value.get(k),
        Idx(i) => value.get(i),
    })
}

/// The value at `path`, if it is a non-empty string after trimming.
fn string_at(payload: &Value, path: &[Seg]) -> Option<String> {
    let s = lookup(payload, path)?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// First candidate path yielding a non-empty string, or empty.
fn first_string(payload: &Value, paths: &[&[Seg]]) -> String {
    paths
        .iter()
        .find_map(|path| string_at(payload, path))
        .unwrap_or_default()
}

/// Truthiness of a flag field: boolean, "true"-ish string, or nonzero number.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

fn is_from_me(payload: &Value) -> bool {
    FROM_ME_PATHS
        .iter()
        .any(|path| lookup(payload, path).is_some_and(is_truthy))
}

fn is_status_notification(payload: &Value) -> bool {
    if let Some(kind) = declared_type(payload) {
        if STATUS_TYPES.contains(&kind.as_str()) {
            return true;
        }
    }
    // Z-API receipts carry an `ack` field; Meta receipts carry `statuses`
    // where messages would be.
    if payload.get("ack").is_some() {
        return true;
    }
    lookup(
        payload,
        &[
            Key("entry"),
            Idx(0),
            Key("changes"),
            Idx(0),
            Key("value"),
            Key("statuses"),
        ],
    )
    .is_some()
}

/// The declared message type, lowercased, if any candidate path has one.
fn declared_type(payload: &Value) -> Option<String> {
    TYPE_PATHS
        .iter()
        .find_map(|path| string_at(payload, path))
        .map(|s| s.to_ascii_lowercase())
}
