//! # congregation-sync
//!
//! Record keeping for a congregation photo archive. The album tree is the
//! source of truth for *who has photos*; a YAML checklist records everything
//! a person adds by hand (role, contact, status) and is kept in step with the
//! tree on every run.
//!
//! # Architecture: One Pass, Four Stages
//!
//! ```text
//! 1. Load        checklist.yaml  →  RecordStore     (missing/unreadable → fresh)
//! 2. Scan        albums/         →  [ScannedFolder] (one level deep, sorted)
//! 3. Reconcile   store + scan    →  store'          (add, refresh, recount, log)
//! 4. Persist     store'          →  checklist.yaml  (schema key order, spaced)
//! ```
//!
//! Each stage is a function from values to values; the store is moved through
//! them rather than shared, so every stage is tested on its own without the
//! others. The run writes the record file once, at the end.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Stage 1: load the checklist, fill in absent top-level keys |
//! | [`scan`] | Stage 2: member folders and their images |
//! | [`reconcile`] | Stage 3: merge scan into store, recount summary, append log |
//! | [`persist`] | Stage 4: encode, space entries, atomic write |
//! | [`sync`] | Runs the four stages; read-only `inspect` for `status` |
//! | [`types`] | The record types and status tokens |
//! | [`network`] | House network YAML: add houses and members |
//! | [`rename`] | Sequential renaming of a folder of photos |
//! | [`config`] | `congregation.toml` loading, merging, validation |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Record Policy
//!
//! - Members are never removed. A member whose folder disappears keeps the
//!   image list from the last scan that saw it.
//! - An existing member's `images` is replaced by each scan, never merged.
//! - `summary` is always recomputed; hand edits to it do not survive a run.
//! - `update_log` only grows.
//! - Two runs at once against the same file are last-writer-wins. There is no
//!   locking; the tool is run by hand, one operator at a time.

pub mod config;
pub mod logging;
pub mod network;
pub mod output;
pub mod persist;
pub mod reconcile;
pub mod rename;
pub mod scan;
pub mod store;
pub mod sync;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
