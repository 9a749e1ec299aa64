/// Runtime settings resolved from the environment.
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::source::DEFAULT_MAX_POSTS;

pub const DATA_DIR_VAR: &str = "PEAKHOURS_DATA_DIR";
pub const MAX_POSTS_VAR: &str = "PEAKHOURS_MAX_POSTS";
pub const FETCH_TIMEOUT_VAR: &str = "PEAKHOURS_FETCH_TIMEOUT_SECS";

const DEFAULT_DATA_DIR: &str = ".peakhours";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root for scrape dumps (`profiles/`) and logs (`logs/`)
    pub data_dir: PathBuf,
    /// Most posts analyzed per profile
    pub max_posts: usize,
    pub fetch_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            max_posts: DEFAULT_MAX_POSTS,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup. Unset or blank
    /// variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(dir) = get(DATA_DIR_VAR) {
            settings.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = get(MAX_POSTS_VAR) {
            let max_posts: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a positive integer, got '{}'", MAX_POSTS_VAR, raw))?;
            if max_posts == 0 {
                anyhow::bail!("{} must be at least 1", MAX_POSTS_VAR);
            }
            settings.max_posts = max_posts;
        }

        if let Some(raw) = get(FETCH_TIMEOUT_VAR) {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds, got '{}'", FETCH_TIMEOUT_VAR, raw))?;
            if secs == 0 {
                anyhow::bail!("{} must be at least 1", FETCH_TIMEOUT_VAR);
            }
            settings.fetch_timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.data_dir.join("profiles")
    }
}
