/// Timestamp sources.
///
/// A source turns a profile handle into raw post timestamps plus whatever
/// profile details it could find. Failures are classified into the three
/// kinds callers distinguish: not found, timed out, anything else.
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default number of posts kept per profile.
pub const DEFAULT_MAX_POSTS: usize = 50;

/// Raw data for one profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileBatch {
    pub display_name: Option<String>,
    pub profile_image: Option<String>,
    pub timestamps: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Profile missing, deleted or suspended
    #[error("{0}")]
    NotFound(String),

    /// Source did not answer in time
    #[error("{0}")]
    TimedOut(String),

    #[error("{0}")]
    Failed(String),
}

impl SourceError {
    /// Classify a free-form failure message.
    ///
    /// Scrapers usually only report a sentence; "not found" and "suspended"
    /// mean the profile is gone, "timed out" means the fetch gave up.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("not found") || lower.contains("suspended") {
            SourceError::NotFound(message.to_string())
        } else if lower.contains("timed out") {
            SourceError::TimedOut(message.to_string())
        } else {
            SourceError::Failed(message.to_string())
        }
    }
}

/// Anything that can supply raw timestamps for a profile.
#[allow(async_fn_in_trait)]
pub trait TimestampSource {
    /// Fetch at most `limit` raw timestamps for `identifier`.
    async fn fetch(&self, identifier: &str, limit: usize) -> Result<ProfileBatch, SourceError>;
}

/// One captured post in a scrape dump.
#[derive(Debug, Deserialize)]
struct DumpedPost {
    datetime: Option<String>,
}

/// On-disk scrape result for one profile.
#[derive(Debug, Deserialize)]
struct ScrapeDump {
    success: bool,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    profile_image: Option<String>,
    #[serde(default)]
    tweets: Vec<DumpedPost>,
    #[serde(default)]
    error: Option<String>,
}

/// Reads scrape results previously saved as `<root>/<identifier>.json`.
#[derive(Debug, Clone)]
pub struct ScrapeDumpSource {
    root: PathBuf,
}

impl ScrapeDumpSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dump_path(&self, identifier: &str) -> PathBuf {
        self.root.join(format!("{}.json", identifier))
    }

    /// Identifiers with a dump available, sorted.
    pub fn available_profiles(&self) -> std::io::Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut profiles = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    profiles.push(stem.to_string());
                }
            }
        }
        profiles.sort();
        Ok(profiles)
    }
}

impl TimestampSource for ScrapeDumpSource {
    async fn fetch(&self, identifier: &str, limit: usize) -> Result<ProfileBatch, SourceError> {
        // Handles are plain names; anything path-like cannot have a dump
        if identifier.contains(['/', '\\']) || identifier.starts_with('.') {
            return Err(SourceError::NotFound(format!(
                "User @{} not found or suspended",
                identifier
            )));
        }

        let path = self.dump_path(identifier);
        debug!("Reading scrape dump: {}", path.display());

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(format!(
                    "User @{} not found or suspended",
                    identifier
                )));
            }
            Err(e) => {
                return Err(SourceError::Failed(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let dump: ScrapeDump = serde_json::from_str(&content).map_err(|e| {
            SourceError::Failed(format!("Invalid scrape dump {}: {}", path.display(), e))
        })?;

        if !dump.success {
            let message = dump
                .error
                .unwrap_or_else(|| "Failed to scrape profile".to_string());
            warn!("Scrape of @{} had failed: {}", identifier, message);
            return Err(SourceError::classify(&message));
        }

        let raw: Vec<String> = dump.tweets.into_iter().filter_map(|t| t.datetime).collect();
        let timestamps = dedup_and_limit(raw, limit);
        info!(
            "Loaded {} timestamps for @{} from {}",
            timestamps.len(),
            identifier,
            path.display()
        );

        Ok(ProfileBatch {
            display_name: dump.display_name.filter(|n| !n.trim().is_empty()),
            profile_image: dump.profile_image.filter(|i| !i.is_empty()),
            timestamps,
        })
    }
}

/// Drop repeated timestamps (keeping first occurrences) and keep at most `limit`.
fn dedup_and_limit(raw: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter(|ts| seen.insert(ts.clone()))
        .take(limit)
        .collect()
}
