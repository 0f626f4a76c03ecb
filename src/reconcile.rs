//! Merging a fresh scan into the record store.
//!
//! Matching is by exact folder name, so `John` and `john` are two members.
//! A member whose folder has disappeared is left exactly as it was, stale
//! image list included; the synchronizer never deletes members.

use crate::scan::ScannedFolder;
use crate::types::{
    LogEntry, MemberRecord, RecordStore, STATUS_COMPLETED, STATUS_ONGOING, STATUS_PENDING,
    timestamp,
};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use tracing::debug;

/// The store after a scan has been merged, plus who was new.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub store: RecordStore,
    /// Names of members created by this run, in scan order.
    pub added: Vec<String>,
}

/// Merge `scanned` into `store`, refresh the summary and log the run.
pub fn reconcile(
    mut store: RecordStore,
    scanned: &[ScannedFolder],
    now: &DateTime<Local>,
) -> Reconciled {
    let added = merge_members(&mut store.members, scanned, now);
    recompute_summary(&mut store, now);
    append_log(&mut store, &added, scanned.len(), now);
    Reconciled { store, added }
}

fn merge_members(
    members: &mut Vec<MemberRecord>,
    scanned: &[ScannedFolder],
    now: &DateTime<Local>,
) -> Vec<String> {
    // Later duplicates win, which matters only for hand-edited files.
    let mut by_name: HashMap<String, usize> = members
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name.clone(), i))
        .collect();
    let mut added = Vec::new();

    for folder in scanned {
        match by_name.get(&folder.name) {
            Some(&i) => {
                debug!(member = %folder.name, images = folder.images.len(), "refreshing images");
                members[i].images = folder.images.clone();
            }
            None => {
                debug!(member = %folder.name, "adding new member");
                members.push(MemberRecord::discovered(
                    &folder.name,
                    folder.images.clone(),
                    now,
                ));
                by_name.insert(folder.name.clone(), members.len() - 1);
                added.push(folder.name.clone());
            }
        }
    }
    added
}

/// Recount `summary` from scratch over `members`.
///
/// Statuses outside the three known tokens count toward the total only.
pub fn recompute_summary(store: &mut RecordStore, now: &DateTime<Local>) {
    let count = |token: &str| {
        store
            .members
            .iter()
            .filter(|m| m.status_token() == token)
            .count()
    };
    let completed = count(STATUS_COMPLETED);
    let ongoing = count(STATUS_ONGOING);
    let pending = count(STATUS_PENDING);

    let summary = &mut store.summary;
    summary.total_members = store.members.len();
    summary.completed = completed;
    summary.ongoing = ongoing;
    summary.pending = pending;
    summary.updated_at = timestamp(now);
}

fn append_log(store: &mut RecordStore, added: &[String], scanned: usize, now: &DateTime<Local>) {
    store.update_log.push(LogEntry {
        timestamp: timestamp(now),
        scanned_folders: scanned,
        added_members: added.to_vec(),
        note: format!(
            "Auto-scan completed: {} folders scanned, {} new members added.",
            scanned,
            added.len()
        ),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{empty_store, fixed_now, folder, member, member_names};

    #[test]
    fn first_run_adds_every_folder() {
        let scanned = vec![folder("Alice", &["a.jpg"]), folder("Bob", &["b.jpg"])];
        let result = reconcile(empty_store(), &scanned, &fixed_now());

        assert_eq!(result.added, vec!["Alice", "Bob"]);
        assert_eq!(member_names(&result.store), vec!["Alice", "Bob"]);
        assert_eq!(result.store.summary.total_members, 2);
        assert_eq!(result.store.summary.pending, 2);
        assert_eq!(result.store.update_log.len(), 1);
        assert_eq!(result.store.update_log[0].added_members, vec!["Alice", "Bob"]);
        assert_eq!(result.store.update_log[0].scanned_folders, 2);
    }

    #[test]
    fn rescan_replaces_images_without_union() {
        let mut store = empty_store();
        store.members.push(member("Alice", "✅", &["a.jpg"]));

        let scanned = vec![folder("Alice", &["b.png", "c.gif"])];
        let result = reconcile(store, &scanned, &fixed_now());

        assert!(result.added.is_empty());
        assert_eq!(result.store.members[0].images, vec!["b.png", "c.gif"]);
    }

    #[test]
    fn rescan_leaves_other_fields_alone() {
        let mut store = empty_store();
        let mut alice = member("Alice", "🕓", &["a.jpg"]);
        alice.role = "Usher".into();
        alice.remarks = "Hand note".into();
        alice.added_at = "2020-01-01 00:00:00.000000".into();
        store.members.push(alice.clone());

        let result = reconcile(store, &[folder("Alice", &["z.jpg"])], &fixed_now());
        let after = &result.store.members[0];
        assert_eq!(after.role, alice.role);
        assert_eq!(after.remarks, alice.remarks);
        assert_eq!(after.added_at, alice.added_at);
        assert_eq!(after.status, alice.status);
    }

    #[test]
    fn missing_folder_keeps_stale_images() {
        let mut store = empty_store();
        store.members.push(member("Gone", "❌", &["old.jpg"]));

        let result = reconcile(store, &[folder("Alice", &["a.jpg"])], &fixed_now());
        assert_eq!(member_names(&result.store), vec!["Gone", "Alice"]);
        assert_eq!(result.store.members[0].images, vec!["old.jpg"]);
    }

    #[test]
    fn case_differing_name_is_new_member() {
        let mut store = empty_store();
        store.members.push(member("John", "✅", &["1.jpg"]));

        let result = reconcile(store, &[folder("john", &["2.jpg"])], &fixed_now());
        assert_eq!(result.added, vec!["john"]);
        assert_eq!(result.store.members.len(), 2);
    }

    #[test]
    fn summary_counts_each_status() {
        let mut store = empty_store();
        store.members.push(member("A", "✅", &[]));
        store.members.push(member("B", " 🕓 ", &[]));
        store.members.push(member("C", "❌", &[]));
        store.members.push(member("D", "✅", &[]));
        store.members.push(member("E", "?", &[]));

        recompute_summary(&mut store, &fixed_now());
        let s = &store.summary;
        assert_eq!(s.total_members, 5);
        assert_eq!(s.completed, 2);
        assert_eq!(s.ongoing, 1);
        assert_eq!(s.pending, 1);
        assert_eq!(s.updated_at, "2025-03-09 14:05:07.000000");
    }

    #[test]
    fn summary_total_matches_members_for_known_statuses() {
        let mut store = empty_store();
        for (i, status) in ["✅", "❌", "🕓", "❌", "✅", "✅"].iter().enumerate() {
            store.members.push(member(&format!("m{i}"), status, &[]));
        }
        recompute_summary(&mut store, &fixed_now());
        let s = &store.summary;
        assert_eq!(s.total_members, store.members.len());
        assert_eq!(s.completed + s.ongoing + s.pending, s.total_members);
    }

    #[test]
    fn log_note_summarizes_counts() {
        let mut store = empty_store();
        store.members.push(member("Alice", "❌", &["a.jpg"]));
        let scanned = vec![folder("Alice", &["a.jpg"]), folder("Bob", &["b.jpg"])];

        let result = reconcile(store, &scanned, &fixed_now());
        assert_eq!(
            result.store.update_log[0].note,
            "Auto-scan completed: 2 folders scanned, 1 new members added."
        );
    }

    #[test]
    fn log_is_appended_not_replaced() {
        let first = reconcile(empty_store(), &[folder("A", &["a.jpg"])], &fixed_now());
        let second = reconcile(first.store, &[folder("A", &["a.jpg"])], &fixed_now());
        assert_eq!(second.store.update_log.len(), 2);
        assert!(second.store.update_log[1].added_members.is_empty());
    }
}
