//! On-disk config file shape tests.

mod common;

use std::fs;

use toml::Value;

#[test]
fn test_config_file_with_token_parses() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::temp_dir()?;
    let config_path = common::create_test_config(&dir, Some("tok-abc-123"))?;

    let raw = fs::read_to_string(&config_path)?;
    let parsed: toml::Table = raw.parse()?;

    assert_eq!(
        parsed.get("api_token").and_then(Value::as_str),
        Some("tok-abc-123")
    );
    assert_eq!(
        parsed.get("base_url").and_then(Value::as_str),
        Some("https://api.cura.health")
    );

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_config_file_without_token_parses() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::temp_dir()?;
    let config_path = common::create_test_config(&dir, None)?;

    let raw = fs::read_to_string(&config_path)?;
    let parsed: toml::Table = raw.parse()?;

    assert!(parsed.get("api_token").is_none());
    assert_eq!(
        parsed.get("base_url").and_then(Value::as_str),
        Some("https://api.cura.health")
    );

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_profile_sections_parse() -> Result<(), Box<dyn std::error::Error>> {
    let dir = common::temp_dir()?;
    let config_path = dir.join(".cura").join("config.toml");
    fs::create_dir_all(config_path.parent().unwrap())?;

    let content = r#"base_url = "https://api.cura.health"

[profiles.staging]
base_url = "https://staging.cura.health"
default_calendar = "on-call"
"#;
    fs::write(&config_path, content)?;

    let raw = fs::read_to_string(&config_path)?;
    let parsed: toml::Table = raw.parse()?;

    let staging = parsed
        .get("profiles")
        .and_then(|p| p.get("staging"))
        .expect("staging profile present");
    assert_eq!(
        staging.get("base_url").and_then(Value::as_str),
        Some("https://staging.cura.health")
    );
    assert_eq!(
        staging.get("default_calendar").and_then(Value::as_str),
        Some("on-call")
    );

    fs::remove_dir_all(&dir)?;
    Ok(())
}
