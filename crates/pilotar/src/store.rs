//! Screenshot persistence.
//!
//! The driver core treats the store as write-only: captures are handed
//! over keyed by label and a handle comes back for the run report. What
//! "persisted" means is the store's business: dropped, held in memory,
//! or written to disk.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::channel::Screenshot;
use crate::result::PilotResult;

/// Reference to a persisted capture, carried by the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotHandle {
    /// Label the capture was keyed by
    pub label: String,
    /// Filesystem location, when the store wrote one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Base64-encoded bytes, when the store keeps them inline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded: Option<String>,
}

/// Write-only sink for diagnostic captures.
pub trait ScreenshotStore {
    /// Persist one capture under `label`.
    fn persist(&mut self, label: &str, shot: &Screenshot) -> PilotResult<ScreenshotHandle>;
}

/// Store that discards every capture.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl ScreenshotStore for NullStore {
    fn persist(&mut self, label: &str, _shot: &Screenshot) -> PilotResult<ScreenshotHandle> {
        Ok(ScreenshotHandle {
            label: label.to_string(),
            path: None,
            encoded: None,
        })
    }
}

/// Store that keeps captures in memory, base64-inlined into handles.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shots: Vec<(String, Screenshot)>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures persisted so far, oldest first.
    #[must_use]
    pub fn shots(&self) -> &[(String, Screenshot)] {
        &self.shots
    }

    /// Labels persisted so far, oldest first.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.shots.iter().map(|(label, _)| label.as_str()).collect()
    }
}

impl ScreenshotStore for MemoryStore {
    fn persist(&mut self, label: &str, shot: &Screenshot) -> PilotResult<ScreenshotHandle> {
        self.shots.push((label.to_string(), shot.clone()));
        Ok(ScreenshotHandle {
            label: label.to_string(),
            path: None,
            encoded: Some(shot.to_base64()),
        })
    }
}

/// Store that writes each capture as `<sanitized-label>.png` under a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Create a store rooted at `dir`; the directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn sanitize(label: &str) -> String {
        label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect()
    }
}

impl ScreenshotStore for DirStore {
    fn persist(&mut self, label: &str, shot: &Screenshot) -> PilotResult<ScreenshotHandle> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.png", Self::sanitize(label)));
        fs::write(&path, &shot.data)?;
        Ok(ScreenshotHandle {
            label: label.to_string(),
            path: Some(path),
            encoded: None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn capture() -> Screenshot {
        Screenshot::new(vec![0x89, 0x50, 0x4E, 0x47], 2, 2)
    }

    #[test]
    fn test_null_store_discards() {
        let handle = NullStore.persist("finished download", &capture()).unwrap();
        assert_eq!(handle.label, "finished download");
        assert!(handle.path.is_none());
        assert!(handle.encoded.is_none());
    }

    #[test]
    fn test_memory_store_keeps_captures_in_order() {
        let mut store = MemoryStore::new();
        store.persist("first", &capture()).unwrap();
        let handle = store.persist("second", &capture()).unwrap();
        assert_eq!(store.labels(), vec!["first", "second"]);
        assert_eq!(handle.encoded.as_deref(), Some("iVBORw=="));
    }

    #[test]
    fn test_dir_store_writes_sanitized_png() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(tmp.path().join("shots"));
        let handle = store.persist("installed game tab", &capture()).unwrap();
        let path = handle.path.unwrap();
        assert!(path.ends_with("installed-game-tab.png"));
        assert_eq!(fs::read(&path).unwrap(), capture().data);
    }

    #[test]
    fn test_handle_serialization_omits_empty_fields() {
        let handle = ScreenshotHandle {
            label: "x".to_string(),
            path: None,
            encoded: None,
        };
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, r#"{"label":"x"}"#);
    }
}
