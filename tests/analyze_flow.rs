use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;

use peakhours::analyze::{analyze, AnalyzeError, AnalyzeRequest, FetchLimits};
use peakhours::renderer;
use peakhours::source::ScrapeDumpSource;
use peakhours::summary::ActivitySummary;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn limits() -> FetchLimits {
    FetchLimits {
        max_posts: 50,
        timeout: Duration::from_secs(30),
    }
}

fn request(identifier: &str, demo: bool) -> AnalyzeRequest {
    AnalyzeRequest {
        identifier: identifier.to_string(),
        demo,
    }
}

#[tokio::test]
async fn test_scrape_dump_matches_example_summary() {
    let source = ScrapeDumpSource::new(fixtures_dir().join("profiles"));
    let mut rng = StdRng::seed_from_u64(1);

    let summary = analyze(&request("@nightowl", false), &source, limits(), &mut rng)
        .await
        .unwrap();

    let expected =
        ActivitySummary::load_from_file(&fixtures_dir().join("example-summary.json")).unwrap();
    assert_eq!(summary, expected);
    summary.validate().unwrap();
}

#[tokio::test]
async fn test_unknown_profile_is_not_found() {
    let source = ScrapeDumpSource::new(fixtures_dir().join("profiles"));
    let mut rng = StdRng::seed_from_u64(1);

    let err = analyze(&request("nobody", false), &source, limits(), &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzeError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_demo_summary_renders() {
    // Demo requests never read the source directory
    let source = ScrapeDumpSource::new(fixtures_dir().join("missing"));
    let mut rng = StdRng::seed_from_u64(7);

    let summary = analyze(&request("anyone", true), &source, limits(), &mut rng)
        .await
        .unwrap();
    assert!(summary.is_demo);
    assert_eq!(summary.peak_hours.len(), 3);
    summary.validate().unwrap();

    let markdown = renderer::md::render(&summary).unwrap();
    assert!(markdown.contains("Demo data"));
    assert!(markdown.contains("*Times shown in UTC (demo mode).*"));
}

#[tokio::test]
async fn test_max_posts_limits_analyzed_entries() {
    let source = ScrapeDumpSource::new(fixtures_dir().join("profiles"));
    let mut rng = StdRng::seed_from_u64(1);
    let limits = FetchLimits {
        max_posts: 2,
        timeout: Duration::from_secs(30),
    };

    let summary = analyze(&request("nightowl", false), &source, limits, &mut rng)
        .await
        .unwrap();
    assert_eq!(summary.total_count, 2);
    assert_eq!(summary.hour_count(21), 1);
    assert_eq!(summary.hour_count(9), 1);
}
