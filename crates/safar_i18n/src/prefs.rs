use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Durable slot for the user's chosen locale tag.
///
/// The store treats everything here as best-effort: a read failure means
/// "nothing persisted", a write failure is logged and the in-memory locale
/// stands for the session. Implementations are called from background
/// threads and must be `Send + Sync`.
pub trait PreferenceStore: Send + Sync {
    /// Read the persisted locale tag, if any.
    fn load(&self) -> Result<Option<String>, PrefsError>;

    /// Persist the locale tag.
    fn save(&self, tag: &str) -> Result<(), PrefsError>;
}

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("preference io error: {0}")]
    Io(#[from] io::Error),

    #[error("preference record is malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefRecord {
    language: String,
}

/// File-backed preference store: a small TOML record (`language = "ur"`)
/// at a caller-supplied path, typically `language.toml` under the app's
/// data directory.
#[derive(Clone, Debug)]
pub struct FilePrefs {
    path: PathBuf,
}

impl FilePrefs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePrefs {
    fn load(&self) -> Result<Option<String>, PrefsError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: PrefRecord =
            toml::from_str(&raw).map_err(|e| PrefsError::Malformed(e.to_string()))?;
        if record.language.is_empty() {
            Ok(None)
        } else {
            Ok(Some(record.language))
        }
    }

    fn save(&self, tag: &str) -> Result<(), PrefsError> {
        let record = PrefRecord {
            language: tag.to_string(),
        };
        let raw = toml::to_string(&record).map_err(|e| PrefsError::Malformed(e.to_string()))?;
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = FilePrefs::new(dir.path().join("language.toml"));
        assert_eq!(prefs.load().unwrap(), None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = FilePrefs::new(dir.path().join("nested/language.toml"));
        prefs.save("ur").unwrap();
        assert_eq!(prefs.load().unwrap(), Some("ur".to_string()));
    }

    #[test]
    fn malformed_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("language.toml");
        std::fs::write(&path, "language = [1, 2]").unwrap();
        let err = FilePrefs::new(&path).load().unwrap_err();
        assert!(matches!(err, PrefsError::Malformed(_)));
    }

    #[test]
    fn empty_tag_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("language.toml");
        std::fs::write(&path, "language = \"\"").unwrap();
        assert_eq!(FilePrefs::new(&path).load().unwrap(), None);
    }
}
