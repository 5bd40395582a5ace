//! Test utilities for Cura CLI tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Create a temporary directory for testing
pub fn temp_dir() -> Result<PathBuf, std::io::Error> {
    let temp = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = temp.join(format!("cura-test-{}-{}", std::process::id(), nanos));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Create a minimal config file for testing
pub fn create_test_config(dir: &Path, api_token: Option<&str>) -> Result<PathBuf, std::io::Error> {
    let config_path = dir.join(".cura").join("config.toml");
    fs::create_dir_all(config_path.parent().unwrap())?;

    let content = match api_token {
        Some(token) => format!(
            r#"api_token = "{token}"

base_url = "https://api.cura.health"
"#
        ),
        None => r#"base_url = "https://api.cura.health"
"#
        .to_string(),
    };

    fs::write(&config_path, content)?;
    Ok(config_path)
}
