//! Shared test utilities: fixed clock, album tree builders and store
//! constructors.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! add_album(tmp.path(), "Alice", &["01.jpg", "02.png"]);
//!
//! let outcome = scan(tmp.path()).unwrap();
//! assert_eq!(folder_names(&outcome), vec!["Alice"]);
//! ```

use chrono::{DateTime, Local, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::MetaDefaults;
use crate::scan::{ScanOutcome, ScannedFolder};
use crate::store::StoreDefaults;
use crate::types::{MemberRecord, RecordStore};

// =========================================================================
// Clock
// =========================================================================

/// 2025-03-09 14:05:07 local time.
pub fn fixed_now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap()
}

// =========================================================================
// Filesystem fixtures
// =========================================================================

/// Create `root/<name>/` holding one small file per entry in `files`.
pub fn add_album(root: &Path, name: &str, files: &[&str]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for file in files {
        fs::write(dir.join(file), "fake image").unwrap();
    }
    dir
}

// =========================================================================
// Store and scan values
// =========================================================================

/// A defaulted store with no members.
pub fn empty_store() -> RecordStore {
    RecordStore::fresh(&StoreDefaults::new(&MetaDefaults::default(), fixed_now())).unwrap()
}

pub fn member(name: &str, status: &str, images: &[&str]) -> MemberRecord {
    MemberRecord {
        name: name.to_string(),
        status: status.to_string(),
        images: images.iter().map(|s| s.to_string()).collect(),
        ..MemberRecord::default()
    }
}

pub fn folder(name: &str, images: &[&str]) -> ScannedFolder {
    ScannedFolder {
        name: name.to_string(),
        images: images.iter().map(|s| s.to_string()).collect(),
    }
}

// =========================================================================
// Extractors
// =========================================================================

pub fn member_names(store: &RecordStore) -> Vec<&str> {
    store.members.iter().map(|m| m.name.as_str()).collect()
}

pub fn folder_names(outcome: &ScanOutcome) -> Vec<&str> {
    outcome.folders.iter().map(|f| f.name.as_str()).collect()
}
