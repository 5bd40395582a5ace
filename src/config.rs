//! Configuration loading and defaults for cura-cli.

use std::collections::HashMap;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

// === Types ===

/// Raw retry configuration loaded from config files.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub enabled: Option<bool>,
    pub max_retries: Option<u32>,
    pub initial_delay: Option<f64>,
    pub max_delay: Option<f64>,
    pub exponential_base: Option<f64>,
}

/// Notification stream configuration loaded from config files.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NotificationConfig {
    pub enabled: Option<bool>,
    pub reconnect_delay: Option<f64>,
}

/// Resolved retry policy with defaults applied.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub max_retries: u32,
    pub initial_delay: f64,
    pub max_delay: f64,
    pub exponential_base: f64,
}

impl RetryPolicy {
    /// Compute the backoff delay for a retry attempt.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> std::time::Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay = self.initial_delay * self.exponential_base.powi(exponent);
        let delay = delay.min(self.max_delay);
        std::time::Duration::from_secs_f64(delay)
    }
}

/// Resolved CLI configuration, including defaults and environment overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub api_token: Option<String>,
    pub base_url: Option<String>,
    /// Calendar shown on startup (ID or exact name).
    pub default_calendar: Option<String>,
    /// First day shown in the schedule grid: "monday" or "sunday".
    pub week_start: Option<String>,
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub notifications: Option<NotificationConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    #[serde(flatten)]
    base: Config,
    profiles: Option<HashMap<String, Config>>,
}

// === Config Loading ===

impl Config {
    /// Load configuration from disk and merge with environment overrides.
    pub fn load(path: Option<PathBuf>, profile: Option<&str>) -> Result<Self> {
        let path = path.or_else(default_config_path);
        let mut config = if let Some(path) = path.as_ref() {
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                let parsed: ConfigFile = toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
                apply_profile(parsed, profile)?
            } else {
                Config::default()
            }
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Validate that critical config fields are well-formed.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref token) = self.api_token
            && token.trim().is_empty()
        {
            anyhow::bail!("api_token cannot be empty string");
        }
        if let Some(ref week_start) = self.week_start
            && !matches!(week_start.as_str(), "monday" | "sunday")
        {
            anyhow::bail!("week_start must be \"monday\" or \"sunday\", got \"{week_start}\"");
        }
        Ok(())
    }

    /// Return the backend base URL (normalized, no trailing slash).
    #[must_use]
    pub fn api_base_url(&self) -> String {
        let base = self
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.cura.health".to_string());
        base.trim_end_matches('/').to_string()
    }

    /// Whether the schedule grid starts on Sunday rather than Monday.
    #[must_use]
    pub fn week_starts_sunday(&self) -> bool {
        self.week_start.as_deref() == Some("sunday")
    }

    /// Resolve the effective retry policy with defaults applied.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy {
            enabled: true,
            max_retries: 3,
            initial_delay: 1.0,
            max_delay: 30.0,
            exponential_base: 2.0,
        };

        let Some(cfg) = &self.retry else {
            return defaults;
        };

        RetryPolicy {
            enabled: cfg.enabled.unwrap_or(defaults.enabled),
            max_retries: cfg.max_retries.unwrap_or(defaults.max_retries),
            initial_delay: cfg.initial_delay.unwrap_or(defaults.initial_delay),
            max_delay: cfg.max_delay.unwrap_or(defaults.max_delay),
            exponential_base: cfg.exponential_base.unwrap_or(defaults.exponential_base),
        }
    }

    /// Whether live notifications are enabled (default: yes).
    #[must_use]
    pub fn notifications_enabled(&self) -> bool {
        self.notifications
            .as_ref()
            .and_then(|n| n.enabled)
            .unwrap_or(true)
    }

    /// Delay before reconnecting a closed notification stream.
    #[must_use]
    pub fn notification_reconnect_delay(&self) -> std::time::Duration {
        let seconds = self
            .notifications
            .as_ref()
            .and_then(|n| n.reconnect_delay)
            .unwrap_or(5.0);
        std::time::Duration::from_secs_f64(seconds.max(0.1))
    }
}

// === Defaults ===

fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CURA_CONFIG_PATH")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".cura").join("config.toml"))
}

// === Environment Overrides ===

fn apply_env_overrides(config: &mut Config) {
    if let Ok(value) = std::env::var("CURA_API_TOKEN") {
        config.api_token = Some(value);
    }
    if let Ok(value) = std::env::var("CURA_BASE_URL") {
        config.base_url = Some(value);
    }
    if let Ok(value) = std::env::var("CURA_CALENDAR") {
        config.default_calendar = Some(value);
    }
}

fn apply_profile(config: ConfigFile, profile: Option<&str>) -> Result<Config> {
    if let Some(profile_name) = profile {
        let profiles = config.profiles.as_ref();
        match profiles.and_then(|profiles| profiles.get(profile_name)) {
            Some(override_cfg) => Ok(merge_config(config.base, override_cfg.clone())),
            None => {
                let available = profiles
                    .map(|profiles| {
                        let mut keys = profiles.keys().cloned().collect::<Vec<_>>();
                        keys.sort();
                        if keys.is_empty() {
                            "none".to_string()
                        } else {
                            keys.join(", ")
                        }
                    })
                    .unwrap_or_else(|| "none".to_string());
                anyhow::bail!(
                    "Profile '{}' not found. Available profiles: {}",
                    profile_name,
                    available
                )
            }
        }
    } else {
        Ok(config.base)
    }
}

fn merge_config(base: Config, override_cfg: Config) -> Config {
    Config {
        api_token: override_cfg.api_token.or(base.api_token),
        base_url: override_cfg.base_url.or(base.base_url),
        default_calendar: override_cfg.default_calendar.or(base.default_calendar),
        week_start: override_cfg.week_start.or(base.week_start),
        retry: override_cfg.retry.or(base.retry),
        notifications: override_cfg.notifications.or(base.notifications),
    }
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Save an API token to the config file. Creates the file if it doesn't exist.
pub fn save_api_token(api_token: &str) -> Result<PathBuf> {
    fn is_token_assignment(line: &str) -> bool {
        let trimmed = line.trim_start();
        trimmed
            .strip_prefix("api_token")
            .is_some_and(|rest| rest.trim_start().starts_with('='))
    }

    let config_path = default_config_path()
        .context("Failed to resolve config path: home directory not found.")?;

    ensure_parent_dir(&config_path)?;

    let content = if config_path.exists() {
        let existing = fs::read_to_string(&config_path)?;
        if existing.contains("api_token") {
            let mut result = String::new();
            for line in existing.lines() {
                if is_token_assignment(line) {
                    let _ = writeln!(result, "api_token = \"{api_token}\"");
                } else {
                    result.push_str(line);
                    result.push('\n');
                }
            }
            result
        } else {
            format!("api_token = \"{api_token}\"\n{existing}")
        }
    } else {
        format!(
            r#"# Cura CLI Configuration

api_token = "{api_token}"

# Backend base URL (default: https://api.cura.health)
# base_url = "https://api.cura.health"

# Calendar shown on startup (ID or exact name)
# default_calendar = "Dr. Osei"
"#
        )
    };

    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(config_path)
}

/// Check if an API token is configured (either in config or environment).
pub fn has_api_token(config: &Config) -> bool {
    config.api_token.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::ffi::OsString;
    use std::sync::{Mutex, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};

    struct EnvGuard {
        home: Option<OsString>,
        config_path: Option<OsString>,
        api_token: Option<OsString>,
    }

    impl EnvGuard {
        fn new(home: &Path) -> Self {
            let home_str = OsString::from(home.as_os_str());
            let config_path = home.join(".cura").join("config.toml");
            let config_str = OsString::from(config_path.as_os_str());
            let home_prev = env::var_os("HOME");
            let config_prev = env::var_os("CURA_CONFIG_PATH");
            let token_prev = env::var_os("CURA_API_TOKEN");
            // Safety: test-only environment mutation guarded by a global mutex.
            unsafe {
                env::set_var("HOME", &home_str);
                env::set_var("CURA_CONFIG_PATH", &config_str);
                env::remove_var("CURA_API_TOKEN");
            }
            Self {
                home: home_prev,
                config_path: config_prev,
                api_token: token_prev,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            // Safety: test-only environment mutation guarded by a global mutex.
            unsafe {
                match self.home.take() {
                    Some(value) => env::set_var("HOME", value),
                    None => env::remove_var("HOME"),
                }
                match self.config_path.take() {
                    Some(value) => env::set_var("CURA_CONFIG_PATH", value),
                    None => env::remove_var("CURA_CONFIG_PATH"),
                }
                match self.api_token.take() {
                    Some(value) => env::set_var("CURA_API_TOKEN", value),
                    None => env::remove_var("CURA_API_TOKEN"),
                }
            }
        }
    }

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn temp_home(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = env::temp_dir().join(format!("cura-cli-{tag}-{}-{}", std::process::id(), nanos));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn save_api_token_writes_config() -> Result<()> {
        let _lock = env_lock().lock().unwrap();
        let temp_root = temp_home("save-token");
        let _guard = EnvGuard::new(&temp_root);

        let path = save_api_token("test-token")?;
        let expected = temp_root.join(".cura").join("config.toml");
        assert_eq!(path, expected);

        let contents = fs::read_to_string(&path)?;
        assert!(contents.contains("api_token = \"test-token\""));
        Ok(())
    }

    #[test]
    fn save_api_token_replaces_existing() -> Result<()> {
        let _lock = env_lock().lock().unwrap();
        let temp_root = temp_home("replace-token");
        let _guard = EnvGuard::new(&temp_root);

        save_api_token("old-token")?;
        let path = save_api_token("new-token")?;

        let contents = fs::read_to_string(&path)?;
        assert!(contents.contains("api_token = \"new-token\""));
        assert!(!contents.contains("old-token"));
        Ok(())
    }

    #[test]
    fn load_applies_profile_overrides() -> Result<()> {
        let _lock = env_lock().lock().unwrap();
        let temp_root = temp_home("profiles");
        let _guard = EnvGuard::new(&temp_root);

        let config_path = temp_root.join(".cura").join("config.toml");
        ensure_parent_dir(&config_path)?;
        fs::write(
            &config_path,
            r#"base_url = "https://prod.cura.health"
default_calendar = "Dr. Osei"

[profiles.staging]
base_url = "https://staging.cura.health"
"#,
        )?;

        let config = Config::load(Some(config_path.clone()), Some("staging"))?;
        assert_eq!(config.api_base_url(), "https://staging.cura.health");
        // Profile keeps base values it does not override.
        assert_eq!(config.default_calendar.as_deref(), Some("Dr. Osei"));

        let missing = Config::load(Some(config_path), Some("nope"));
        assert!(missing.is_err());
        Ok(())
    }

    #[test]
    fn env_token_overrides_file() -> Result<()> {
        let _lock = env_lock().lock().unwrap();
        let temp_root = temp_home("env-token");
        let _guard = EnvGuard::new(&temp_root);

        let config_path = temp_root.join(".cura").join("config.toml");
        ensure_parent_dir(&config_path)?;
        fs::write(&config_path, "api_token = \"file-token\"\n")?;

        // Safety: test-only environment mutation guarded by a global mutex.
        unsafe {
            env::set_var("CURA_API_TOKEN", "env-token");
        }
        let config = Config::load(Some(config_path), None)?;
        assert_eq!(config.api_token.as_deref(), Some("env-token"));
        Ok(())
    }

    #[test]
    fn retry_policy_backoff_is_capped() {
        let policy = RetryPolicy {
            enabled: true,
            max_retries: 5,
            initial_delay: 1.0,
            max_delay: 4.0,
            exponential_base: 2.0,
        };
        assert_eq!(policy.delay_for_attempt(0).as_secs_f64(), 1.0);
        assert_eq!(policy.delay_for_attempt(1).as_secs_f64(), 2.0);
        assert_eq!(policy.delay_for_attempt(2).as_secs_f64(), 4.0);
        // Capped at max_delay.
        assert_eq!(policy.delay_for_attempt(6).as_secs_f64(), 4.0);
    }

    #[test]
    fn validate_rejects_bad_week_start() {
        let config = Config {
            week_start: Some("tuesday".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
