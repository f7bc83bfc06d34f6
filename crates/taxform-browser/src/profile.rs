use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Chrome user-data directory for the login browser.
///
/// A persistent profile keeps cookies between runs so the site may remember
/// the session. A temporary one is removed when the manager is dropped.
pub struct ProfileManager {
    path: PathBuf,
    is_temporary: bool,
}

impl ProfileManager {
    /// `~/.taxform/chrome-profile`
    pub fn default_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".taxform").join("chrome-profile"))
            .ok_or_else(|| Error::Browser("could not determine home directory".to_string()))
    }

    pub fn temporary() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("taxform-profile-").tempdir()?;
        Ok(Self {
            path: dir.keep(),
            is_temporary: true,
        })
    }

    /// Use `path`, creating it if needed
    pub fn persistent(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;
        tracing::debug!("Using Chrome profile at {}", path.display());
        Ok(Self {
            path,
            is_temporary: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }
}

impl Drop for ProfileManager {
    fn drop(&mut self) {
        if self.is_temporary && self.path.exists() {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}
