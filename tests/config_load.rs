use fieldscribe::config::{self, EngineMode};
use tempfile::TempDir;

// Single test for the file loader so CONFIG_PATH is never set concurrently.
#[tokio::test]
async fn load_reads_the_file_named_by_config_path() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    tokio::fs::write(
        &config_path,
        "server:\n  port: 9000\nengine:\n  mode: demo_multilingual\n",
    )
    .await
    .unwrap();

    // SAFETY: no other thread in this test binary reads or writes the
    // environment while this test runs.
    unsafe { std::env::set_var("CONFIG_PATH", &config_path) };

    let config = config::load().await.unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.engine.mode, EngineMode::DemoMultilingual);

    // A nonexistent path is a load error, not a default
    unsafe { std::env::set_var("CONFIG_PATH", temp_dir.path().join("absent.yaml")) };
    assert!(config::load().await.is_err());

    unsafe { std::env::remove_var("CONFIG_PATH") };
}
