//! The structured half of the model's two-block reply.
//!
//! Every parsed reply carries an [`ActionRecord`] intended for downstream
//! CRM-style consumption. The record always has a valid intent: anything
//! the parser cannot make sense of collapses to [`Intent::NoAction`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Enumerated intents the model is allowed to emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CreateLead,
    ScheduleAppointment,
    UpdateLead,
    Reschedule,
    Cancel,
    HandoffHuman,
    SendReminder,
    #[default]
    NoAction,
}

/// Intent plus its intent-dependent parameters.
///
/// Unknown keys (e.g. `channel`) are preserved in `extra` rather than
/// rejected, since the model occasionally decorates the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(default)]
    pub intent: Intent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_slots: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
