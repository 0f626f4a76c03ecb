//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, tested) and
//! a `print_*` wrapper that writes them to stdout. Diagnostics go through
//! `tracing` on stderr instead.
//!
//! ## Sync
//!
//! ```text
//! Record: checklist_congregation.yaml (existing)
//! Scanned 3 folders with images
//! Added 1 new member
//!     001 Carol
//! Summary: 12 members (5 completed, 2 ongoing, 5 pending)
//! ```
//!
//! ## Status
//!
//! ```text
//! Ascend House — Shelter of Praise | Assembly of God
//! 001 ✅ Alice (3 images)
//! 002 ❌ Bob (1 image)
//! Summary: 2 members (1 completed, 0 ongoing, 1 pending)
//! ```

use crate::network::Network;
use crate::rename::RenamePlan;
use crate::sync::{LoadState, SyncReport};
use crate::types::{RecordStore, Summary};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn summary_line(summary: &Summary) -> String {
    format!(
        "Summary: {} ({} completed, {} ongoing, {} pending)",
        plural(summary.total_members, "member"),
        summary.completed,
        summary.ongoing,
        summary.pending
    )
}

// ============================================================================
// Sync
// ============================================================================

pub fn format_sync_report(report: &SyncReport) -> Vec<String> {
    let mut lines = Vec::new();

    let state = match &report.load_state {
        LoadState::Fresh => "new".to_string(),
        LoadState::Existing => "existing".to_string(),
        LoadState::Recovered { backup: Some(b), .. } => {
            format!("rebuilt, unreadable original kept at {}", b.display())
        }
        LoadState::Recovered { backup: None, .. } => "rebuilt, unreadable original dropped".to_string(),
    };
    lines.push(format!("Record: {} ({})", report.record_file.display(), state));

    if report.albums_missing {
        lines.push("Albums path does not exist".to_string());
    }
    lines.push(format!(
        "Scanned {} with images",
        plural(report.scanned, "folder")
    ));

    if report.added.is_empty() {
        lines.push("No new members".to_string());
    } else {
        lines.push(format!("Added {}", plural(report.added.len(), "new member")));
        for (i, name) in report.added.iter().enumerate() {
            lines.push(format!("    {} {}", format_index(i + 1), name));
        }
    }

    lines.push(summary_line(&report.summary));
    if report.rendered.is_some() {
        lines.push("Dry run: record file not written".to_string());
    }
    lines
}

pub fn print_sync_report(report: &SyncReport) {
    for line in format_sync_report(report) {
        println!("{}", line);
    }
    if let Some(text) = &report.rendered {
        println!();
        print!("{}", text);
    }
}

// ============================================================================
// Status
// ============================================================================

pub fn format_status(store: &RecordStore) -> Vec<String> {
    let mut lines = Vec::new();

    let meta_str = |key: &str| store.meta.get(key).and_then(|v| v.as_str());
    match (meta_str("house"), meta_str("church")) {
        (Some(house), Some(church)) => lines.push(format!("{house} — {church}")),
        (Some(one), None) | (None, Some(one)) => lines.push(one.to_string()),
        (None, None) => {}
    }

    for (i, m) in store.members.iter().enumerate() {
        lines.push(format!(
            "{} {} {} ({})",
            format_index(i + 1),
            m.status_token(),
            m.name,
            plural(m.images.len(), "image")
        ));
    }
    lines.push(summary_line(&store.summary));
    if let Some(last) = store.update_log.last() {
        lines.push(format!("Last scan: {}", last.timestamp));
    }
    lines
}

pub fn print_status(store: &RecordStore) {
    for line in format_status(store) {
        println!("{}", line);
    }
}

// ============================================================================
// Houses
// ============================================================================

pub fn format_houses(network: &Network) -> Vec<String> {
    if network.houses.is_empty() {
        return vec!["No houses yet".to_string()];
    }
    network
        .houses
        .iter()
        .enumerate()
        .map(|(i, h)| {
            format!(
                "{}. {} — Leader: {} | Members: {}",
                i + 1,
                h.house_name,
                h.leader,
                h.members.len()
            )
        })
        .collect()
}

pub fn print_houses(network: &Network) {
    for line in format_houses(network) {
        println!("{}", line);
    }
}

// ============================================================================
// Rename
// ============================================================================

pub fn format_rename_plan(plan: &RenamePlan) -> Vec<String> {
    let mut lines: Vec<String> = plan
        .renames
        .iter()
        .filter(|r| !r.is_noop())
        .map(|r| format!("{} → {}", r.from, r.to))
        .collect();
    let unchanged = plan.renames.iter().filter(|r| r.is_noop()).count();
    if unchanged > 0 {
        lines.push(format!("{} already named", plural(unchanged, "file")));
    }
    if lines.is_empty() {
        lines.push(format!("No matching images in {}", plan.dir.display()));
    }
    lines
}

pub fn print_rename_plan(plan: &RenamePlan) {
    for line in format_rename_plan(plan) {
        println!("{}", line);
    }
}
