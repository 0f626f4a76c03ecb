//! Loading the checklist document and filling in its schema defaults.
//!
//! Loading is deliberately forgiving: a missing file is the normal first-run
//! condition and an unparseable one is reported rather than fatal. Both come
//! back as a [`Loaded`] variant so the caller decides what to do with them.
//!
//! Defaulting happens on the raw YAML mapping, before the typed decode, so a
//! key that is already present is never replaced no matter what it holds.

use crate::config::MetaDefaults;
use crate::types::{
    MemberRecord, RecordStore, STATUS_COMPLETED, STATUS_ONGOING, STATUS_PENDING, datestamp,
    timestamp,
};
use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Record file has an unusable `{key}` entry: {reason}")]
    Schema { key: String, reason: String },
}

/// Top-level keys in document order.
pub const TOP_LEVEL_KEYS: [&str; 5] = ["meta", "status_legend", "members", "summary", "update_log"];

/// What was found at the record path.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    /// No file yet.
    Missing,
    /// The file exists but is not a YAML mapping.
    Malformed { reason: String },
    /// The parsed top-level mapping, untouched. Empty files yield an empty mapping.
    Document(Mapping),
}

/// Read and parse the record file at `path`.
///
/// Only I/O failures other than "not found" are errors.
pub fn load_document(path: &Path) -> Result<Loaded, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "record file not found, starting a new one");
            return Ok(Loaded::Missing);
        }
        Err(e) => {
            return Err(StoreError::Io {
                path: path.display().to_string(),
                source: e,
            });
        }
    };

    let loaded = match serde_yaml::from_str::<Value>(&content) {
        Ok(Value::Mapping(map)) => Loaded::Document(map),
        Ok(Value::Null) => Loaded::Document(Mapping::new()),
        Ok(other) => Loaded::Malformed {
            reason: format!("top level is {}, expected a mapping", kind_of(&other)),
        },
        Err(e) => Loaded::Malformed {
            reason: e.to_string(),
        },
    };
    if let Loaded::Malformed { reason } = &loaded {
        warn!(path = %path.display(), %reason, "failed to parse record file, starting fresh");
    }
    Ok(loaded)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Values used for absent top-level keys. Built fresh for every load.
#[derive(Debug, Clone)]
pub struct StoreDefaults {
    pub meta: MetaDefaults,
    pub now: DateTime<Local>,
}

impl StoreDefaults {
    pub fn new(meta: &MetaDefaults, now: DateTime<Local>) -> Self {
        Self {
            meta: meta.clone(),
            now,
        }
    }

    fn value_for(&self, key: &str) -> Value {
        match key {
            "meta" => {
                let mut meta = Mapping::new();
                meta.insert("church".into(), self.meta.church.as_str().into());
                meta.insert("house".into(), self.meta.house.as_str().into());
                meta.insert("created_by".into(), self.meta.created_by.as_str().into());
                meta.insert("date_created".into(), datestamp(&self.now).into());
                meta.insert("purpose".into(), self.meta.purpose.as_str().into());
                Value::Mapping(meta)
            }
            "status_legend" => {
                let mut legend = Mapping::new();
                legend.insert(STATUS_COMPLETED.into(), "Completed / Included".into());
                legend.insert(STATUS_PENDING.into(), "Pending / Not Yet Included".into());
                legend.insert(STATUS_ONGOING.into(), "Ongoing / In Progress".into());
                Value::Mapping(legend)
            }
            "summary" => {
                let mut summary = Mapping::new();
                for count in ["total_members", "completed", "ongoing", "pending"] {
                    summary.insert(count.into(), 0.into());
                }
                summary.insert("updated_at".into(), timestamp(&self.now).into());
                Value::Mapping(summary)
            }
            _ => Value::Sequence(Vec::new()),
        }
    }
}

/// Insert the default for every absent top-level key.
///
/// Present keys are passed through untouched, even when they hold nonsense.
/// Applying this twice gives the same document as applying it once.
pub fn with_defaults(mut doc: Mapping, defaults: &StoreDefaults) -> Mapping {
    for key in TOP_LEVEL_KEYS {
        if !doc.contains_key(key) {
            doc.insert(key.into(), defaults.value_for(key));
        }
    }
    doc
}

impl RecordStore {
    /// Decode a defaulted document into typed records.
    ///
    /// Entries are decoded one at a time so an error names where it is:
    /// `members[3].contact`, `update_log[0]`. A `summary` that does not decode
    /// is replaced, since every run recomputes it anyway.
    pub fn from_document(mut doc: Mapping) -> Result<Self, StoreError> {
        for key in TOP_LEVEL_KEYS {
            if let Some(value) = doc.get(key) {
                check_shape(key, value)?;
            }
        }

        let meta = take_mapping(&mut doc, "meta");
        let status_legend = take_mapping(&mut doc, "status_legend");
        let members = take_sequence(&mut doc, "members")
            .into_iter()
            .enumerate()
            .map(|(i, value)| decode_member(i, value))
            .collect::<Result<Vec<_>, _>>()?;
        let summary = match doc.remove("summary") {
            Some(value) => serde_yaml::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "ignoring unreadable summary, it will be recomputed");
                Default::default()
            }),
            None => Default::default(),
        };
        let update_log = take_sequence(&mut doc, "update_log")
            .into_iter()
            .enumerate()
            .map(|(i, value)| decode_entry(format!("update_log[{i}]"), value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            meta,
            status_legend,
            members,
            summary,
            update_log,
            extra: doc,
        })
    }

    /// A brand-new store with every key defaulted.
    pub fn fresh(defaults: &StoreDefaults) -> Result<Self, StoreError> {
        Self::from_document(with_defaults(Mapping::new(), defaults))
    }
}

fn take_mapping(doc: &mut Mapping, key: &str) -> Mapping {
    match doc.remove(key) {
        Some(Value::Mapping(map)) => map,
        _ => Mapping::new(),
    }
}

fn take_sequence(doc: &mut Mapping, key: &str) -> Vec<Value> {
    match doc.remove(key) {
        Some(Value::Sequence(items)) => items,
        _ => Vec::new(),
    }
}

fn decode_entry<T: DeserializeOwned>(key: String, value: Value) -> Result<T, StoreError> {
    serde_yaml::from_value(value).map_err(|e| StoreError::Schema {
        key,
        reason: e.to_string(),
    })
}

fn decode_member(index: usize, value: Value) -> Result<MemberRecord, StoreError> {
    let Value::Mapping(fields) = &value else {
        return Err(StoreError::Schema {
            key: format!("members[{index}]"),
            reason: format!("expected a mapping, found {}", kind_of(&value)),
        });
    };
    for (field, field_value) in fields {
        let Some(field) = field.as_str() else {
            continue;
        };
        if let Err(reason) = MemberRecord::check_field(field, field_value) {
            return Err(StoreError::Schema {
                key: format!("members[{index}].{field}"),
                reason,
            });
        }
    }
    decode_entry(format!("members[{index}]"), value)
}

/// Name the offending key when a top-level value has the wrong shape, so the
/// error points at it instead of at a serde path.
fn check_shape(key: &str, value: &Value) -> Result<(), StoreError> {
    let expected_sequence = matches!(key, "members" | "update_log");
    let ok = if expected_sequence {
        value.is_sequence()
    } else {
        value.is_mapping()
    };
    if ok {
        Ok(())
    } else {
        Err(StoreError::Schema {
            key: key.to_string(),
            reason: format!(
                "expected {}, found {}",
                if expected_sequence {
                    "a sequence"
                } else {
                    "a mapping"
                },
                kind_of(value)
            ),
        })
    }
}
