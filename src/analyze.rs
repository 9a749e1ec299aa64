/// Request handling: one identifier in, one summary (or classified error) out.
///
/// Demo requests go to the generator. Live requests fetch raw timestamps from
/// a `TimestampSource` under a timeout and aggregate whatever parses.
use rand::Rng;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::aggregate::{aggregate_raw, DataOrigin, Profile};
use crate::demo::generate_demo;
use crate::source::{SourceError, TimestampSource};
use crate::summary::ActivitySummary;
use crate::timestamps::format_timestamp_opt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub identifier: String,
    pub demo: bool,
}

/// Limits applied to a live fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub max_posts: usize,
    pub timeout: Duration,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("Username is required")]
    InvalidIdentifier,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    TimedOut(String),

    /// Source answered but nothing in it could be analyzed
    #[error("No posts found for @{0}")]
    NoData(String),

    #[error("Error: {0}")]
    Failed(String),
}

impl AnalyzeError {
    /// HTTP-style status for the error class.
    pub fn status_code(&self) -> u16 {
        match self {
            AnalyzeError::InvalidIdentifier => 400,
            AnalyzeError::NotFound(_) | AnalyzeError::NoData(_) => 404,
            AnalyzeError::TimedOut(_) => 504,
            AnalyzeError::Failed(_) => 500,
        }
    }
}

impl From<SourceError> for AnalyzeError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound(msg) => AnalyzeError::NotFound(msg),
            SourceError::TimedOut(msg) => AnalyzeError::TimedOut(msg),
            SourceError::Failed(msg) => AnalyzeError::Failed(msg),
        }
    }
}

/// Trim surrounding whitespace, then leading '@'s, from a handle. `None` if
/// nothing is left.
pub fn clean_identifier(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_start_matches('@');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Analyze one request.
///
/// `rng` only feeds the demo path; live requests never touch it.
pub async fn analyze<S, R>(
    request: &AnalyzeRequest,
    source: &S,
    limits: FetchLimits,
    rng: &mut R,
) -> Result<ActivitySummary, AnalyzeError>
where
    S: TimestampSource,
    R: Rng,
{
    let identifier =
        clean_identifier(&request.identifier).ok_or(AnalyzeError::InvalidIdentifier)?;

    if request.demo {
        info!("Generating demo activity for @{}", identifier);
        return Ok(generate_demo(&identifier, rng));
    }

    analyze_live(&identifier, source, limits).await
}

async fn analyze_live<S: TimestampSource>(
    identifier: &str,
    source: &S,
    limits: FetchLimits,
) -> Result<ActivitySummary, AnalyzeError> {
    info!(
        "Fetching up to {} timestamps for @{}",
        limits.max_posts, identifier
    );

    let batch = match tokio::time::timeout(
        limits.timeout,
        source.fetch(identifier, limits.max_posts),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            warn!(
                "Fetch for @{} exceeded {}s",
                identifier,
                limits.timeout.as_secs()
            );
            return Err(AnalyzeError::TimedOut(
                "Request timed out. The source may be slow or blocking requests.".to_string(),
            ));
        }
    };

    let aggregation = aggregate_raw(batch.timestamps.as_slice())
        .ok_or_else(|| AnalyzeError::NoData(identifier.to_string()))?;

    let mut profile = Profile::placeholder(identifier);
    if let Some(name) = batch.display_name {
        profile.display_name = name;
    }
    if let Some(image) = batch.profile_image {
        profile.profile_image = image;
    }

    let latest = format_timestamp_opt(aggregation.last_post_time.as_ref());
    let summary = aggregation.into_summary(&profile, DataOrigin::Scraped);
    info!(
        "Analyzed {} of {} timestamps for @{} (latest {})",
        summary.total_count,
        batch.timestamps.len(),
        identifier,
        latest
    );
    Ok(summary)
}
