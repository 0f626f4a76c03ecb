//! Sequential renaming of a folder of event photos.
//!
//! `rename photos/part_3 grandFellowship_part3_2025_` turns
//!
//! ```text
//! DSC_0412.JPG  IMG_0001.jpg  notes.txt  scan.png
//! ```
//!
//! into `grandFellowship_part3_2025_1.JPG`, `..._2.jpg`, `..._3.png` (files
//! sorted by name, extension text kept as-is, other files untouched).
//!
//! The whole plan is checked before anything moves: a target that already
//! exists and is not one of the files being renamed stops the run. Renames
//! then go through temporary names, so swapping names within the batch
//! (`b → a`, `a → b`) cannot overwrite a file. If a rename fails partway,
//! every file already moved is put back under its original name; any that
//! cannot be put back are listed in the error.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum RenameError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Base name must not contain a path separator: {0:?}")]
    InvalidBaseName(String),
    #[error("Rename target already exists and is not part of this batch: {0}")]
    TargetExists(PathBuf),
    #[error("Renaming {from} failed: {source}{}", stranded_note(.stranded))]
    Interrupted {
        from: String,
        #[source]
        source: io::Error,
        /// Files left where they are and the name each should have had.
        stranded: Vec<(PathBuf, PathBuf)>,
    },
}

fn stranded_note(stranded: &[(PathBuf, PathBuf)]) -> String {
    let mut note = String::new();
    if !stranded.is_empty() {
        note.push_str("; could not restore:");
        for (at, wanted) in stranded {
            note.push_str(&format!(" {} (was {})", at.display(), wanted.display()));
        }
    }
    note
}

/// One planned rename within a single directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

impl Rename {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub dir: PathBuf,
    pub renames: Vec<Rename>,
}

/// Work out the renames for `dir` without touching anything.
///
/// `extensions` are matched case-insensitively and have no leading dot.
/// Numbering starts at `start`.
pub fn plan_renames(
    dir: &Path,
    base_name: &str,
    extensions: &[String],
    start: u32,
) -> Result<RenamePlan, RenameError> {
    if base_name.contains(['/', '\\']) {
        return Err(RenameError::InvalidBaseName(base_name.to_string()));
    }
    if !dir.is_dir() {
        return Err(RenameError::NotADirectory(dir.to_path_buf()));
    }

    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let renames: Vec<Rename> = names
        .into_iter()
        .filter_map(|name| {
            let ext = matching_extension(&name, extensions)?;
            Some((name, ext))
        })
        .zip(start..)
        .map(|((from, ext), n)| Rename {
            to: format!("{base_name}{n}.{ext}"),
            from,
        })
        .collect();

    let sources: HashSet<&str> = renames.iter().map(|r| r.from.as_str()).collect();
    for r in &renames {
        let target = dir.join(&r.to);
        if !sources.contains(r.to.as_str()) && target.exists() {
            return Err(RenameError::TargetExists(target));
        }
    }

    Ok(RenamePlan {
        dir: dir.to_path_buf(),
        renames,
    })
}

/// The original extension text of `name` if it is one of `extensions`.
fn matching_extension(name: &str, extensions: &[String]) -> Option<String> {
    let ext = Path::new(name).extension()?.to_string_lossy().into_owned();
    extensions
        .iter()
        .any(|e| e.eq_ignore_ascii_case(&ext))
        .then_some(ext)
}

/// Carry out `plan`. Returns the number of files whose name changed.
///
/// On failure the directory is restored to its state before the call as far
/// as possible; see [`RenameError::Interrupted`].
pub fn apply(plan: &RenamePlan) -> Result<usize, RenameError> {
    let moving: Vec<&Rename> = plan.renames.iter().filter(|r| !r.is_noop()).collect();
    let pid = std::process::id();

    let staged: Vec<(PathBuf, &Rename)> = moving
        .iter()
        .enumerate()
        .map(|(i, r)| (plan.dir.join(format!(".rename-{pid}-{i}.tmp")), *r))
        .collect();

    for (done, (tmp, r)) in staged.iter().enumerate() {
        if let Err(source) = fs::rename(plan.dir.join(&r.from), tmp) {
            let stranded = roll_back(&plan.dir, &staged[..done], 0);
            return Err(RenameError::Interrupted {
                from: r.from.clone(),
                source,
                stranded,
            });
        }
    }
    for (done, (tmp, r)) in staged.iter().enumerate() {
        if let Err(source) = fs::rename(tmp, plan.dir.join(&r.to)) {
            let stranded = roll_back(&plan.dir, &staged, done);
            return Err(RenameError::Interrupted {
                from: r.from.clone(),
                source,
                stranded,
            });
        }
        debug!(from = %r.from, to = %r.to, "renamed");
    }
    Ok(staged.len())
}

/// Undo a partial [`apply`]. `staged` were all moved to their temp names and
/// the first `placed` of them then moved on to their targets. Returns the
/// files that could not be moved back.
fn roll_back(
    dir: &Path,
    staged: &[(PathBuf, &Rename)],
    placed: usize,
) -> Vec<(PathBuf, PathBuf)> {
    let mut stranded = Vec::new();
    let mut parked = Vec::new();
    for (i, (tmp, r)) in staged.iter().enumerate() {
        if i < placed {
            let target = dir.join(&r.to);
            if let Err(e) = fs::rename(&target, tmp) {
                warn!(file = %target.display(), error = %e, "could not undo rename");
                stranded.push((target, dir.join(&r.from)));
                continue;
            }
        }
        parked.push((tmp, r));
    }
    for (tmp, r) in parked {
        let original = dir.join(&r.from);
        if let Err(e) = fs::rename(tmp, &original) {
            warn!(file = %tmp.display(), error = %e, "could not undo rename");
            stranded.push((tmp.clone(), original));
        }
    }
    stranded
}
