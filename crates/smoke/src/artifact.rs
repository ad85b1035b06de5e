//! Screenshot artifact handling
//!
//! Artifacts use fixed names so reruns overwrite the previous capture
//! instead of piling up timestamped files.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SmokeResult;

/// Fixed artifact file names, in capture order
pub mod names {
    pub const LOADED: &str = "photowallet-1-loaded.png";
    pub const UI: &str = "photowallet-2-ui.png";
    pub const SETTINGS: &str = "photowallet-3-settings.png";
    pub const MOBILE: &str = "photowallet-4-mobile.png";
    pub const DESKTOP: &str = "photowallet-5-desktop.png";
    pub const VIEWER: &str = "photowallet-viewer.png";
    pub const ERROR: &str = "photowallet-error.png";
}

/// Writes screenshots into the configured artifact directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create the store, making sure the directory exists
    pub fn new(dir: impl Into<PathBuf>) -> SmokeResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write a PNG capture, replacing any previous file of the same name
    pub fn write(&self, name: &str, bytes: &[u8]) -> SmokeResult<PathBuf> {
        let path = self.path(name);
        std::fs::write(&path, bytes)?;
        debug!("Wrote artifact {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_file_under_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path()).unwrap();

        let path = store.write(names::LOADED, b"png bytes").unwrap();
        assert_eq!(path, tmp.path().join("photowallet-1-loaded.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"png bytes");
    }

    #[test]
    fn rerun_overwrites_previous_capture() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path()).unwrap();

        store.write(names::ERROR, b"first").unwrap();
        let path = store.write(names::ERROR, b"second").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"second");
    }

    #[test]
    fn new_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("shots").join("run");

        let store = ArtifactStore::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested);
    }
}
