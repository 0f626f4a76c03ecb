//! The load → scan → reconcile → persist pass behind `congregation-sync sync`.
//!
//! The store is moved through the stages as a plain value; nothing is shared
//! or global. A run either writes the whole updated document or fails before
//! writing anything.

use crate::config::SyncConfig;
use crate::persist::{self, PersistError};
use crate::reconcile::{self, Reconciled};
use crate::scan::{self, ScanError};
use crate::store::{self, Loaded, StoreDefaults, StoreError};
use crate::types::{RecordStore, Summary};
use chrono::{DateTime, Local};
use serde_yaml::Mapping;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("Failed to back up malformed record file to {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Compute everything but leave the record file untouched.
    pub dry_run: bool,
}

/// How the record file looked before this run.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// No record file existed.
    Fresh,
    /// An existing document was read.
    Existing,
    /// The file could not be parsed and was rebuilt from scratch.
    Recovered {
        reason: String,
        backup: Option<PathBuf>,
    },
}

/// What a run did, for display.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub record_file: PathBuf,
    pub load_state: LoadState,
    pub albums_missing: bool,
    pub scanned: usize,
    pub added: Vec<String>,
    pub summary: Summary,
    /// Present only for dry runs: the document that would have been written.
    pub rendered: Option<String>,
}

/// Run the synchronizer once.
pub fn run(
    config: &SyncConfig,
    options: SyncOptions,
    now: DateTime<Local>,
) -> Result<SyncReport, SyncError> {
    let path = &config.record_file;
    info!(record = %path.display(), albums = %config.albums_path.display(), "starting sync");

    let (doc, load_state) = match store::load_document(path)? {
        Loaded::Missing => (Mapping::new(), LoadState::Fresh),
        Loaded::Document(doc) => (doc, LoadState::Existing),
        Loaded::Malformed { reason } => {
            let backup = if config.backup_malformed && !options.dry_run {
                Some(backup_malformed(path, &now)?)
            } else {
                None
            };
            (Mapping::new(), LoadState::Recovered { reason, backup })
        }
    };

    let defaults = StoreDefaults::new(&config.meta, now);
    let store = RecordStore::from_document(store::with_defaults(doc, &defaults))?;

    let outcome = scan::scan(&config.albums_path)?;
    if outcome.folders.is_empty() {
        warn!("no album folders with images were found");
    } else {
        info!(folders = outcome.folders.len(), "scanned album folders");
    }

    let Reconciled { store, added } = reconcile::reconcile(store, &outcome.folders, &now);

    let rendered = if options.dry_run {
        Some(persist::render(&store)?)
    } else {
        persist::save(path, &store)?;
        info!(record = %path.display(), "saved record file");
        None
    };

    Ok(SyncReport {
        record_file: path.clone(),
        load_state,
        albums_missing: outcome.root_missing,
        scanned: outcome.folders.len(),
        added,
        summary: store.summary,
        rendered,
    })
}

/// Read the record file without writing anything, with the summary
/// recounted so it reflects the members as they stand.
///
/// A missing or unparseable file yields an empty store.
pub fn inspect(config: &SyncConfig, now: DateTime<Local>) -> Result<RecordStore, SyncError> {
    let doc = match store::load_document(&config.record_file)? {
        Loaded::Document(doc) => doc,
        Loaded::Missing | Loaded::Malformed { .. } => Mapping::new(),
    };
    let defaults = StoreDefaults::new(&config.meta, now);
    let mut store = RecordStore::from_document(store::with_defaults(doc, &defaults))?;
    reconcile::recompute_summary(&mut store, &now);
    Ok(store)
}

/// Copy the unreadable original next to itself before it gets replaced.
fn backup_malformed(path: &Path, now: &DateTime<Local>) -> Result<PathBuf, SyncError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let backup = path.with_file_name(format!(
        "{name}.malformed-{}",
        now.format("%Y%m%d%H%M%S")
    ));
    fs::copy(path, &backup).map_err(|source| SyncError::Backup {
        path: backup.clone(),
        source,
    })?;
    warn!(backup = %backup.display(), "kept a copy of the malformed record file");
    Ok(backup)
}
