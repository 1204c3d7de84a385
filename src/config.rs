//! Runtime configuration for the report assembler.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use log::{info, warn};

/// Title written into the PDF info dictionary when the report does not provide one.
pub const DEFAULT_TITLE: &str = "ESG Materiality Report";

const DEFAULT_USER_AGENT: &str = concat!("esg_report/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every assembly run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Upper bound for each remote image download. `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
    /// `User-Agent` header sent with image downloads.
    pub user_agent: String,
    /// Default document title.
    pub title: String,
    /// Adds an outline with one entry per page (requires the `bookmarks` feature).
    pub bookmarks: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            title: DEFAULT_TITLE.to_string(),
            bookmarks: false,
        }
    }
}

impl AssemblerConfig {
    /// Reads `ESG_REPORT_*` variables, keeping the default for unset or invalid values.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let fetch_timeout = try_load::<u64>("ESG_REPORT_FETCH_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            fetch_timeout,
            user_agent: var("ESG_REPORT_USER_AGENT").unwrap_or(defaults.user_agent),
            title: var("ESG_REPORT_TITLE").unwrap_or(defaults.title),
            bookmarks: try_load::<bool>("ESG_REPORT_BOOKMARKS").unwrap_or(defaults.bookmarks),
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.fetch_timeout = timeout.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_bookmarks(mut self, bookmarks: bool) -> Self {
        self.bookmarks = bookmarks;
        self
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn try_load<T: FromStr>(key: &str) -> Option<T>
where
    T::Err: Display,
{
    let raw = var(key)?;
    match raw.parse() {
        Ok(value) => {
            info!("{key} set to {raw}");
            Some(value)
        }
        Err(err) => {
            warn!("Invalid {key} value {raw:?}: {err}, using default");
            None
        }
    }
}
