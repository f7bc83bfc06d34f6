use crate::{Error, ProfileManager, Result};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

pub const DEFAULT_DEBUG_PORT: u16 = 9222;

/// Starts a visible Chrome that later commands can attach to
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    initial_url: Option<String>,
    debugging_port: u16,
}

impl ChromeLauncher {
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf) -> Self {
        Self {
            chrome_path,
            profile_path,
            initial_url: None,
            debugging_port: DEFAULT_DEBUG_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.debugging_port = port;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.initial_url = Some(url.into());
        self
    }

    /// Spawn Chrome detached from our stdio; the process outlives this command
    pub fn launch(&self) -> Result<Child> {
        let args = self.build_args();
        tracing::debug!("Launching {} {}", self.chrome_path.display(), args.join(" "));

        Command::new(&self.chrome_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))
    }

    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debugging_port),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-default-apps".to_string(),
            format!("--user-data-dir={}", self.profile_path.display()),
        ];

        args.push(match &self.initial_url {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => url.clone(),
            Some(url) => format!("https://{}", url),
            None => "about:blank".to_string(),
        });

        args
    }

    pub fn debugging_port(&self) -> u16 {
        self.debugging_port
    }
}

/// A Chrome we started, together with the profile it runs on.
///
/// Chrome on a persistent profile is left running when this is dropped.
/// Chrome on a temporary profile is killed first, so its user-data
/// directory is never removed from under a live browser.
pub struct LaunchedChrome {
    child: Child,
    profile: ProfileManager,
}

impl LaunchedChrome {
    pub fn new(child: Child, profile: ProfileManager) -> Self {
        Self { child, profile }
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn profile(&self) -> &ProfileManager {
        &self.profile
    }
}

impl Drop for LaunchedChrome {
    fn drop(&mut self) {
        if !self.profile.is_temporary() {
            return;
        }
        tracing::debug!("Stopping Chrome (pid {}) before removing its profile", self.child.id());
        if let Err(e) = self.child.kill() {
            tracing::debug!("Chrome already stopped: {}", e);
        }
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher() -> ChromeLauncher {
        ChromeLauncher::new(
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/tmp/taxform-profile"),
        )
    }

    #[test]
    fn test_args_enable_remote_debugging() {
        let args = launcher()
            .with_port(9333)
            .with_url("https://eservices.ird.gov.lk/Authentication/LoginPersonal")
            .build_args();

        assert!(args.contains(&"--remote-debugging-port=9333".to_string()));
        assert!(args.contains(&"--no-first-run".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/taxform-profile".to_string()));
        assert_eq!(
            args.last().unwrap(),
            "https://eservices.ird.gov.lk/Authentication/LoginPersonal"
        );
    }

    #[test]
    fn test_default_port_and_blank_page() {
        let launcher = launcher();
        let args = launcher.build_args();

        assert_eq!(launcher.debugging_port(), 9222);
        assert_eq!(args.last().unwrap(), "about:blank");
    }

    #[test]
    fn test_scheme_is_added() {
        let args = launcher().with_url("eservices.ird.gov.lk").build_args();
        assert_eq!(args.last().unwrap(), "https://eservices.ird.gov.lk");
    }

    #[test]
    fn test_launch_reports_missing_binary() {
        let launcher = ChromeLauncher::new(
            PathBuf::from("/nonexistent/chrome"),
            PathBuf::from("/tmp/taxform-profile"),
        );
        let err = launcher.launch().unwrap_err();
        assert!(err.to_string().contains("Failed to launch Chrome"));
    }

    #[cfg(unix)]
    fn is_running(pid: u32) -> bool {
        Command::new("kill")
            .args(["-0", &pid.to_string()])
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    #[cfg(unix)]
    #[test]
    fn test_temporary_profile_outlives_its_chrome() {
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let chrome = LaunchedChrome::new(child, ProfileManager::temporary().unwrap());
        let pid = chrome.pid();
        let path = chrome.profile().path().to_path_buf();
        assert!(is_running(pid));

        drop(chrome);

        assert!(!is_running(pid));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_chrome_on_persistent_profile_keeps_running() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profile = ProfileManager::persistent(temp_dir.path().join("profile")).unwrap();
        let path = profile.path().to_path_buf();
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let chrome = LaunchedChrome::new(child, profile);
        let pid = chrome.pid();

        drop(chrome);

        assert!(path.is_dir());
        assert!(is_running(pid));
        let _ = Command::new("kill").args(["-9", &pid.to_string()]).status();
    }
}
