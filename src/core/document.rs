//! Outline files on disk.
//!
//! Saves go through a sibling temp file and a rename, so a crash mid-write
//! leaves the previous outline intact.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

/// Where Ctrl+S writes when no `--outline` path was given.
pub const DEFAULT_OUTLINE_FILE: &str = "outline.txt";

#[derive(Debug)]
pub enum DocumentError {
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Read { path, source } => {
                write!(f, "could not read {}: {source}", path.display())
            }
            DocumentError::Write { path, source } => {
                write!(f, "could not write {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Read { source, .. } | DocumentError::Write { source, .. } => Some(source),
        }
    }
}

/// Reads an outline file. A missing file is `Ok(None)` so a new path can
/// be used as the save target.
pub fn load_outline(path: &Path) -> Result<Option<String>, DocumentError> {
    match fs::read_to_string(path) {
        Ok(text) => {
            info!("Loaded outline from {} ({} bytes)", path.display(), text.len());
            Ok(Some(text))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(DocumentError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `text` to `path` atomically.
pub fn save_outline(path: &Path, text: &str) -> Result<(), DocumentError> {
    let write_err = |source| DocumentError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, text).map_err(write_err)?;
    fs::rename(&tmp_path, path).map_err(write_err)?;

    info!("Saved outline to {} ({} bytes)", path.display(), text.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("takahashi-doc-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_save_then_load() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join("talk.txt");

        save_outline(&path, "- 高橋メソッド\n- 巨大な文字").unwrap();
        assert_eq!(
            load_outline(&path).unwrap().as_deref(),
            Some("- 高橋メソッド\n- 巨大な文字")
        );
        assert!(!dir.join("talk.txt.tmp").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_overwrites_and_creates_parents() {
        let dir = scratch_dir("overwrite");
        let path = dir.join("nested").join("talk.txt");

        save_outline(&path, "- old").unwrap();
        save_outline(&path, "- new").unwrap();
        assert_eq!(load_outline(&path).unwrap().as_deref(), Some("- new"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = scratch_dir("missing");
        assert!(load_outline(&dir.join("absent.txt")).unwrap().is_none());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_reading_a_directory_is_an_error() {
        let dir = scratch_dir("isdir");
        let err = load_outline(&dir).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
        assert!(err.to_string().starts_with("could not read"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
