//! End-to-end runs of the synchronizer against a temp album tree.
//!
//! Each test drives `sync::run` the way the CLI does and reads the written
//! checklist back, so the stages are exercised together through real files.

use chrono::{DateTime, Duration, Local, TimeZone};
use congregation_sync::config::SyncConfig;
use congregation_sync::sync::{self, LoadState, SyncOptions};
use congregation_sync::types::RecordStore;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn start() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

fn setup() -> (TempDir, SyncConfig) {
    let tmp = TempDir::new().unwrap();
    let config = SyncConfig {
        albums_path: tmp.path().join("albums"),
        record_file: tmp.path().join("checklist_congregation.yaml"),
        ..SyncConfig::default()
    };
    (tmp, config)
}

fn album(config: &SyncConfig, name: &str, files: &[&str]) {
    let dir = config.albums_path.join(name);
    fs::create_dir_all(&dir).unwrap();
    for f in files {
        fs::write(dir.join(f), "fake image").unwrap();
    }
}

fn read_store(path: &Path) -> RecordStore {
    serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn sync_at(config: &SyncConfig, now: DateTime<Local>) -> sync::SyncReport {
    sync::run(config, SyncOptions::default(), now).unwrap()
}

#[test]
fn first_run_on_empty_store() {
    let (_tmp, config) = setup();
    album(&config, "Alice", &["a.jpg"]);
    album(&config, "Bob", &["b.png"]);

    let report = sync_at(&config, start());
    assert_eq!(report.load_state, LoadState::Fresh);

    let store = read_store(&config.record_file);
    assert_eq!(store.members.len(), 2);
    assert_eq!(store.summary.total_members, 2);
    assert_eq!(store.summary.pending, 2);
    assert_eq!(store.update_log.len(), 1);
    assert_eq!(store.update_log[0].added_members, vec!["Alice", "Bob"]);
    assert_eq!(store.meta["date_created"].as_str(), Some("2025-06-01"));
}

#[test]
fn second_run_without_changes_is_idempotent() {
    let (_tmp, config) = setup();
    album(&config, "Amy", &["1.jpg", "2.jpg"]);
    album(&config, "Zed", &["z.webp"]);

    sync_at(&config, start());
    let first = read_store(&config.record_file);
    let report = sync_at(&config, start() + Duration::hours(1));
    let second = read_store(&config.record_file);

    assert!(report.added.is_empty());
    assert_eq!(first.members, second.members);
    assert_eq!(first.meta, second.meta);
    assert_eq!(first.summary.total_members, second.summary.total_members);
    assert_eq!(first.summary.pending, second.summary.pending);
    assert_ne!(first.summary.updated_at, second.summary.updated_at);
    assert_eq!(second.update_log.len(), 2);
    assert_eq!(second.update_log[0], first.update_log[0]);
}

#[test]
fn rescan_replaces_image_list() {
    let (_tmp, config) = setup();
    album(&config, "Alice", &["a.jpg"]);
    sync_at(&config, start());

    fs::remove_file(config.albums_path.join("Alice").join("a.jpg")).unwrap();
    album(&config, "Alice", &["c.gif", "b.png"]);
    sync_at(&config, start());

    let store = read_store(&config.record_file);
    assert_eq!(store.members[0].images, vec!["b.png", "c.gif"]);
}

#[test]
fn deleted_folder_keeps_member_and_images() {
    let (_tmp, config) = setup();
    album(&config, "Alice", &["a.jpg"]);
    album(&config, "Bob", &["b.jpg"]);
    sync_at(&config, start());

    fs::remove_dir_all(config.albums_path.join("Alice")).unwrap();
    sync_at(&config, start());

    let store = read_store(&config.record_file);
    let alice = store.members.iter().find(|m| m.name == "Alice").unwrap();
    assert_eq!(alice.images, vec!["a.jpg"]);
    assert_eq!(store.summary.total_members, 2);
    assert_eq!(store.update_log[1].scanned_folders, 1);
}

#[test]
fn folder_without_images_never_becomes_member() {
    let (_tmp, config) = setup();
    album(&config, "Alice", &["a.jpg"]);
    album(&config, "Drafts", &["notes.txt"]);
    sync_at(&config, start());

    let store = read_store(&config.record_file);
    assert!(store.members.iter().all(|m| m.name != "Drafts"));
}

#[test]
fn members_keep_first_discovered_order() {
    let (_tmp, config) = setup();
    album(&config, "Zed", &["z.jpg"]);
    sync_at(&config, start());
    album(&config, "Amy", &["a.jpg"]);
    sync_at(&config, start());

    let store = read_store(&config.record_file);
    let names: Vec<&str> = store.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Zed", "Amy"]);
}

#[test]
fn hand_edits_survive_a_run() {
    let (_tmp, config) = setup();
    album(&config, "Alice", &["a.jpg"]);
    fs::write(
        &config.record_file,
        "\
meta:
  church: Hand Written Church
members:
- name: Alice
  role: Choir
  contact: '0917'
  status: ✅
  remarks: Joined 2019
  images: []
  added_at: '2019-01-01 00:00:00'
  birthday: June 4
summary:
  total_members: 99
parish_notes: keep me
",
    )
    .unwrap();

    let report = sync_at(&config, start());
    assert_eq!(report.load_state, LoadState::Existing);

    let store = read_store(&config.record_file);
    let alice = &store.members[0];
    assert_eq!(alice.role, "Choir");
    assert_eq!(alice.contact, "0917");
    assert_eq!(alice.remarks, "Joined 2019");
    assert_eq!(alice.images, vec!["a.jpg"]);
    assert_eq!(alice.extra["birthday"].as_str(), Some("June 4"));
    assert_eq!(store.meta["church"].as_str(), Some("Hand Written Church"));
    assert_eq!(store.summary.total_members, 1);
    assert_eq!(store.summary.completed, 1);
    assert_eq!(store.extra["parish_notes"].as_str(), Some("keep me"));
}

#[test]
fn written_file_is_spaced_and_unicode() {
    let (_tmp, config) = setup();
    album(&config, "Alice", &["a.jpg"]);
    album(&config, "Bob", &["b.jpg"]);
    sync_at(&config, start());

    let text = fs::read_to_string(&config.record_file).unwrap();
    assert!(text.starts_with("meta:"));
    assert!(text.contains("\n\n- name: Alice"));
    assert!(text.contains("\n\n- name: Bob"));
    assert!(text.contains('❌'));
    assert!(text.ends_with('\n'));
}

#[test]
fn unquoted_and_blank_fields_do_not_stop_a_run() {
    let (_tmp, config) = setup();
    album(&config, "2024", &["group.jpg"]);
    album(&config, "Bob", &["b.jpg"]);
    fs::write(
        &config.record_file,
        "\
members:
- name: 2024
  contact: 639171234567
- name: Bob
  contact:
  role:
",
    )
    .unwrap();

    let report = sync_at(&config, start());
    assert!(report.added.is_empty());

    let store = read_store(&config.record_file);
    assert_eq!(store.members.len(), 2);
    assert_eq!(store.members[0].name, "2024");
    assert_eq!(store.members[0].contact, "639171234567");
    assert_eq!(store.members[0].images, vec!["group.jpg"]);
    assert_eq!(store.members[1].contact, "N/A");
    assert_eq!(store.members[1].role, "Undefined");
    assert_eq!(store.members[1].images, vec!["b.jpg"]);
}
