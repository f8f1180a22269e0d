use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "prepd.json";
pub const WORKSPACE_ENV: &str = "PREPD_WORKSPACE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    pub database_file: String,
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: "prepd.sqlite3".to_string(),
            key_prefix: "prepd".to_string(),
        }
    }
}

/// Award thresholds and badge presentation. These used to be constants
/// scattered across screens; everything that decides a badge reads them here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    pub quiz_pass_threshold: u8,
    pub quiz_excellence_threshold: u8,
    pub completion_badge: bool,
    pub pass_icon: String,
    pub excellence_icon: String,
    pub completion_icon: String,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            quiz_pass_threshold: 70,
            quiz_excellence_threshold: 90,
            completion_badge: true,
            pass_icon: "check-circle".to_string(),
            excellence_icon: "star".to_string(),
            completion_icon: "trophy".to_string(),
        }
    }
}

impl Policy {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.quiz_excellence_threshold > 100 {
            anyhow::bail!(
                "quizExcellenceThreshold must be at most 100, got {}",
                self.quiz_excellence_threshold
            );
        }
        if self.quiz_pass_threshold > self.quiz_excellence_threshold {
            anyhow::bail!(
                "quizPassThreshold ({}) must not exceed quizExcellenceThreshold ({})",
                self.quiz_pass_threshold,
                self.quiz_excellence_threshold
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicesConfig {
    pub weather_url: String,
    pub alerts_url: String,
    pub content_url: String,
    pub content_model: String,
    pub certificate_url: String,
    /// Name of the environment variable holding the content API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            weather_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            alerts_url: "https://alerts.prepd.local/v1/alerts".to_string(),
            content_url: "https://api.openai.com/v1/chat/completions".to_string(),
            content_model: "gpt-4o-mini".to_string(),
            certificate_url: "https://certificates.prepd.local/v1/certificates".to_string(),
            api_key_env: "PREPD_CONTENT_API_KEY".to_string(),
            timeout_secs: 10,
            retries: 1,
            retry_delay_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub storage: StorageConfig,
    pub policy: Policy,
    pub services: ServicesConfig,
}

pub fn config_path(workspace: &Path) -> PathBuf {
    workspace.join("config").join(CONFIG_FILE_NAME)
}

/// Reads `<workspace>/config/prepd.json`, writing the defaults first if the
/// file does not exist. Missing keys take their defaults.
pub fn load_or_init(workspace: &Path) -> anyhow::Result<Config> {
    let path = config_path(workspace);
    if path.exists() {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.to_string_lossy()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("config {} is invalid", path.to_string_lossy()))?;
        config.policy.validate()?;
        return Ok(config);
    }

    let config = Config::default();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let json = serde_json::to_string_pretty(&config).context("failed to serialize config")?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write config {}", path.to_string_lossy()))?;
    Ok(config)
}

pub fn workspace_from_env() -> Option<PathBuf> {
    std::env::var_os(WORKSPACE_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(prefix: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let p = std::env::temp_dir().join(format!("{prefix}-{nanos}"));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn writes_defaults_then_reads_partial_overrides() {
        let ws = temp_dir("prepd-config");
        let first = load_or_init(&ws).expect("init");
        assert_eq!(first, Config::default());
        assert!(config_path(&ws).is_file());

        std::fs::write(
            config_path(&ws),
            r#"{ "policy": { "quizPassThreshold": 60 } }"#,
        )
        .expect("write override");
        let cfg = load_or_init(&ws).expect("load");
        assert_eq!(cfg.policy.quiz_pass_threshold, 60);
        assert_eq!(cfg.policy.quiz_excellence_threshold, 90);
        assert_eq!(cfg.storage, StorageConfig::default());
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let ws = temp_dir("prepd-config-bad");
        std::fs::create_dir_all(ws.join("config")).expect("mkdir");
        std::fs::write(
            config_path(&ws),
            r#"{ "policy": { "quizPassThreshold": 95, "quizExcellenceThreshold": 90 } }"#,
        )
        .expect("write");
        assert!(load_or_init(&ws).is_err());
        let _ = std::fs::remove_dir_all(ws);
    }
}
