use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Locates the Chrome binary used for the login bootstrap
pub struct ChromeFinder {
    custom_path: Option<PathBuf>,
}

impl ChromeFinder {
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// An explicit `--chrome-path` wins; otherwise the platform install locations are tried in order
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            return Self::validate(path);
        }

        let candidates = Self::default_paths();
        if let Some(found) = candidates.iter().find_map(|p| Self::validate(p).ok()) {
            tracing::debug!("Found Chrome at {}", found.display());
            return Ok(found);
        }

        Err(Error::Browser(format!(
            "Chrome not found. Checked: {}. Use --chrome-path to specify location.",
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    fn default_paths() -> Vec<PathBuf> {
        #[cfg(target_os = "macos")]
        return vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ];

        #[cfg(target_os = "linux")]
        return vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/snap/bin/chromium"),
        ];

        #[cfg(target_os = "windows")]
        return vec![
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        return vec![];
    }

    fn validate(path: &Path) -> Result<PathBuf> {
        if !path.is_file() {
            return Err(Error::Browser(format!(
                "Chrome not found at: {}",
                path.display()
            )));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(path)?.permissions().mode();
            if mode & 0o111 == 0 {
                return Err(Error::Browser(format!(
                    "Chrome binary not executable: {}",
                    path.display()
                )));
            }
        }

        Ok(path.to_path_buf())
    }
}
