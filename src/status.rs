/// Status report: what mode the tool runs in and which profiles it can read.
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::Settings;
use crate::source::ScrapeDumpSource;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub status: String,
    pub mode: String,
    pub message: String,
    pub demo_mode: bool,
    pub source_dir: PathBuf,
    pub profiles_available: Vec<String>,
    pub max_posts: usize,
    pub fetch_timeout_secs: u64,
}

/// Collect the status for the given settings and source directory.
pub fn check_status(settings: &Settings, source_dir: PathBuf) -> Result<StatusReport> {
    let source = ScrapeDumpSource::new(source_dir);
    let profiles_available = source
        .available_profiles()
        .with_context(|| format!("Failed to list {}", source.root().display()))?;

    Ok(StatusReport {
        status: "online".to_string(),
        mode: "scrape-dump".to_string(),
        message: "Reading captured scrape results, no API key required".to_string(),
        demo_mode: false,
        source_dir: source.root().to_path_buf(),
        profiles_available,
        max_posts: settings.max_posts,
        fetch_timeout_secs: settings.fetch_timeout.as_secs(),
    })
}

pub fn run(settings: &Settings, source_dir: PathBuf, as_json: bool) -> Result<()> {
    let report = check_status(settings, source_dir)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Status: {}", report.status);
    println!("  Mode: {}", report.mode);
    println!("  {}", report.message);
    println!("  Source directory: {}", report.source_dir.display());
    if !report.source_dir.exists() {
        println!("  [!] Source directory missing");
    }
    println!("  Max posts per profile: {}", report.max_posts);
    println!("  Fetch timeout: {}s", report.fetch_timeout_secs);

    if report.profiles_available.is_empty() {
        println!("  No profiles captured yet. Use --demo to try it out.");
    } else {
        println!("  Profiles ({}):", report.profiles_available.len());
        for profile in &report.profiles_available {
            println!("    - @{}", profile);
        }
    }

    Ok(())
}
