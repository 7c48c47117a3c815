use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_DB_URL: &str = "sqlite:quiz.sqlite3";
pub const DEFAULT_SESSION_SIZE: usize = 10;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Where quiz questions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Remote question bank over HTTP.
    Http,
    /// Local `SQLite` question bank.
    #[default]
    Local,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Http => "http",
            SourceKind::Local => "local",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(SourceKind::Http),
            "local" => Ok(SourceKind::Local),
            other => Err(format!("unknown question source: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionSourceConfig {
    pub kind: SourceKind,
    pub api_url: String,
    pub db_url: String,
    pub session_size: usize,
    pub http_timeout: Duration,
}

impl Default for QuestionSourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            api_url: DEFAULT_API_URL.into(),
            db_url: DEFAULT_DB_URL.into(),
            session_size: DEFAULT_SESSION_SIZE,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl QuestionSourceConfig {
    /// Read `QUIZ_*` variables, falling back to defaults for missing or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let kind = lookup("QUIZ_SOURCE")
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.kind);
        let api_url = lookup("QUIZ_API_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.api_url);
        let db_url = lookup("QUIZ_DB_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.db_url);
        let session_size = lookup("QUIZ_SESSION_SIZE")
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(defaults.session_size);
        let http_timeout = lookup("QUIZ_HTTP_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(defaults.http_timeout, Duration::from_secs);

        Self {
            kind,
            api_url,
            db_url,
            session_size,
            http_timeout,
        }
    }
}
