use clap::builder::TypedValueParser as _;
use clap::{ArgAction, Parser};
use dotenvy::dotenv;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Contacts API endpoint used when `BASE_PATH` is not set.
pub const DEFAULT_BASE_PATH: &str = "https://www.google.com/m8/feeds/";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Path to the service account JSON key used to authorize requests.
    #[arg(short, long, env)]
    keyfile: Option<PathBuf>,

    /// Email address of the user the service account acts on behalf of
    /// (domain-wide delegation).
    #[arg(short, long, env)]
    subject: Option<String>,

    /// Owner of the contact feed: an email address or "default".
    #[arg(short, long, env, default_value = "default")]
    user_id: String,

    /// Feed projection, e.g. "full" or "thin".
    #[arg(short, long, env, default_value = "full")]
    projection: String,

    /// Full text query on contacts.
    #[arg(short, long, env)]
    query: Option<String>,

    /// Only return contacts in this group.
    #[arg(short, long, env)]
    group: Option<String>,

    /// Maximum number of entries to return.
    #[arg(short, long, env)]
    pub max_results: Option<u32>,

    /// Request the read-only contacts scope. Pass `false` for full access.
    #[arg(short, long, env, default_value_t = true, action = ArgAction::Set)]
    pub readonly: bool,

    /// The base URL of the Contacts API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_BASE_PATH)]
    base_path: String,

    /// Appended to the library's User-Agent header.
    #[arg(long, env)]
    user_agent: Option<String>,

    /// Seconds a single feed request may take before it is abandoned.
    #[arg(short, long, env, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn keyfile(&self) -> Option<&Path> {
        self.keyfile.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref().filter(|s| !s.is_empty())
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Returns the Contacts API base URL.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
