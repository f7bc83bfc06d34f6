//! Chrome side of taxform: finding and launching Chrome for the login, and
//! driving an already logged-in Chrome over the DevTools protocol.

mod chrome_finder;
mod error;
mod launcher;
pub mod login;
mod page;
mod profile;
mod session;

pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use launcher::{ChromeLauncher, LaunchedChrome, DEFAULT_DEBUG_PORT};
pub use login::Credentials;
pub use page::CdpPage;
pub use profile::ProfileManager;
pub use session::CdpSession;
