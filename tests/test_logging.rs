use peakhours::logging;

#[test]
fn test_file_logging_writes_session() -> anyhow::Result<()> {
    let test_dir = tempfile::tempdir()?;
    let log_dir = test_dir.path().join("logs");

    let log_file = logging::init_file_logging(&log_dir, "peakhours analyze @nightowl")?;
    assert_eq!(log_file, log_dir.join(logging::LOG_FILE_NAME));

    tracing::info!("Test info message");
    tracing::warn!("Test warning message");

    // Give the appender a moment to flush
    std::thread::sleep(std::time::Duration::from_millis(100));

    assert!(log_file.exists());
    let contents = std::fs::read_to_string(&log_file)?;
    assert!(contents.contains("New session: peakhours analyze @nightowl"));
    assert!(contents.contains("Test warning message"));

    Ok(())
}
