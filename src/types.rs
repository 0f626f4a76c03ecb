//! Record types shared by every stage of the synchronizer.
//!
//! The on-disk layout follows field declaration order, so the order of fields
//! in these structs *is* the key order of `checklist_congregation.yaml`.
//! Keys a person added by hand are kept in `extra` and written back after the
//! known ones.

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

/// Status token for a member whose inclusion is complete.
pub const STATUS_COMPLETED: &str = "✅";
/// Status token for a member not yet included. New members start here.
pub const STATUS_PENDING: &str = "❌";
/// Status token for a member whose inclusion is in progress.
pub const STATUS_ONGOING: &str = "🕓";

pub const DEFAULT_ROLE: &str = "Undefined";
pub const DEFAULT_CONTACT: &str = "N/A";

/// The whole persisted checklist document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordStore {
    /// Descriptive fields (church, house, purpose...). Written once, never
    /// touched again.
    pub meta: Mapping,
    /// Status token → human meaning.
    pub status_legend: Mapping,
    /// Members in first-discovered order.
    pub members: Vec<MemberRecord>,
    /// Derived counts; recomputed from `members` on every run.
    pub summary: Summary,
    /// Append-only audit trail, one entry per run.
    pub update_log: Vec<LogEntry>,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// One member, matched against album folders by exact `name`.
///
/// Text fields accept any scalar a person might type (`contact: 0917...`,
/// `name: 2024`) and read it as text. A blank field gets the field default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberRecord {
    #[serde(deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(deserialize_with = "role_or_default")]
    pub role: String,
    #[serde(deserialize_with = "contact_or_default")]
    pub contact: String,
    #[serde(deserialize_with = "status_or_default")]
    pub status: String,
    #[serde(deserialize_with = "text_or_empty")]
    pub remarks: String,
    /// Replaced wholesale whenever the member's folder is scanned.
    #[serde(deserialize_with = "text_list")]
    pub images: Vec<String>,
    #[serde(deserialize_with = "text_or_empty")]
    pub added_at: String,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Default for MemberRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: DEFAULT_ROLE.to_string(),
            contact: DEFAULT_CONTACT.to_string(),
            status: STATUS_PENDING.to_string(),
            remarks: String::new(),
            images: Vec::new(),
            added_at: String::new(),
            extra: Mapping::new(),
        }
    }
}

impl MemberRecord {
    /// A freshly discovered member with the documented placeholder fields.
    pub fn discovered(name: &str, images: Vec<String>, now: &DateTime<Local>) -> Self {
        Self {
            name: name.to_string(),
            remarks: format!(
                "Auto-added from folder scan. {} image(s) found.",
                images.len()
            ),
            images,
            added_at: timestamp(now),
            ..Self::default()
        }
    }

    /// Status with surrounding whitespace removed, for counting.
    pub fn status_token(&self) -> &str {
        self.status.trim()
    }

    /// Check one hand-written field value the way decoding would, so a bad
    /// entry can be reported by field name. Unknown fields are always fine.
    pub fn check_field(field: &str, value: &Value) -> Result<(), String> {
        match field {
            "images" => scalar_list(value).map(drop),
            "name" | "role" | "contact" | "status" | "remarks" | "added_at" => {
                scalar_text(value).map(drop)
            }
            _ => Ok(()),
        }
    }
}

/// The text form of a scalar. `None` for null.
fn scalar_text(value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) => Err("expected text, found a sequence".into()),
        Value::Mapping(_) => Err("expected text, found a mapping".into()),
    }
}

/// A sequence of scalars as text. Null is an empty list.
fn scalar_list(value: &Value) -> Result<Vec<String>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .filter_map(|item| scalar_text(item).transpose())
            .collect(),
        Value::Tagged(tagged) => scalar_list(&tagged.value),
        _ => Err("expected a list of filenames".into()),
    }
}

fn text_or<'de, D: Deserializer<'de>>(de: D, default: &str) -> Result<String, D::Error> {
    let value = Value::deserialize(de)?;
    scalar_text(&value)
        .map(|text| text.unwrap_or_else(|| default.to_string()))
        .map_err(serde::de::Error::custom)
}

fn text_or_empty<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    text_or(de, "")
}

fn role_or_default<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    text_or(de, DEFAULT_ROLE)
}

fn contact_or_default<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    text_or(de, DEFAULT_CONTACT)
}

fn status_or_default<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    text_or(de, STATUS_PENDING)
}

fn text_list<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(de)?;
    scalar_list(&value).map_err(serde::de::Error::custom)
}

/// Aggregate counts by status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub total_members: usize,
    pub completed: usize,
    pub ongoing: usize,
    pub pending: usize,
    pub updated_at: String,
}

/// Audit record of one synchronizer run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    pub timestamp: String,
    pub scanned_folders: usize,
    pub added_members: Vec<String>,
    pub note: String,
}

/// Render a local time as `YYYY-MM-DD HH:MM:SS.ffffff`.
pub fn timestamp(now: &DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// Render a local date as `YYYY-MM-DD`.
pub fn datestamp(now: &DateTime<Local>) -> String {
    now.format("%Y-%m-%d").to_string()
}
