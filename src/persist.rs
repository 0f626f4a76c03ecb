//! Writing YAML documents back to disk.
//!
//! Saving is three separate steps so each can be tested on its own:
//!
//! 1. [`encode`]: data to YAML text. Keys follow struct field order, unicode
//!    stays literal (`✅`, not `"\u2705"`), long lines are not wrapped.
//! 2. [`space_entries`]: a text pass that puts a blank line before every
//!    top-level list entry that is a mapping, so each member and each log
//!    entry stands on its own when the file is read in an editor.
//! 3. [`write_atomic`]: write to a sibling temp file, then rename over the
//!    target.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("YAML encode error: {0}")]
    Encode(#[from] serde_yaml::Error),
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn encode<T: Serialize>(value: &T) -> Result<String, PersistError> {
    Ok(serde_yaml::to_string(value)?)
}

/// Insert a blank line before each column-0 `- key: ...` line and make sure
/// the text ends with a newline.
pub fn space_entries(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut previous_blank = true;
    for line in text.lines() {
        if starts_mapping_entry(line) && !previous_blank {
            out.push('\n');
        }
        out.push_str(line);
        out.push('\n');
        previous_blank = line.trim().is_empty();
    }
    out
}

/// `- name: Alice` or `- added_members:`, but not `- a.jpg` or `- 'x: y'`.
fn starts_mapping_entry(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("- ") else {
        return false;
    };
    if rest.starts_with(['\'', '"', '-', '[', '{']) {
        return false;
    }
    match rest.find(':') {
        Some(i) => rest[i + 1..].is_empty() || rest[i + 1..].starts_with(' '),
        None => false,
    }
}

/// Replace `path` with `contents` via a temp file in the same directory.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), PersistError> {
    let io_err = |source: io::Error| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, contents).map_err(io_err)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(e));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp-{}", std::process::id()))
}

/// Encode, space and write `value` to `path`.
pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let text = render(value)?;
    write_atomic(path, &text)
}

/// The exact text [`save`] would write.
pub fn render<T: Serialize>(value: &T) -> Result<String, PersistError> {
    Ok(space_entries(&encode(value)?))
}
