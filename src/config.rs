use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use serde_yaml;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bookmarks")]
#[command(about = "Runs the bookmarks service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bookmarks")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

pub const DEFAULT_BOOTSTRAP_KEY: &str = "CHANGE ME";
pub const DEFAULT_BOOTSTRAP_COMPANY: &str = "Wilcox Development Solutions";

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    database: String,
    port: i32,
    #[serde(default)]
    turso_url: Option<String>,
    #[serde(default)]
    turso_auth_token: Option<String>,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_seconds: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_sync_interval() -> u64 {
    60
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for App {
    fn default() -> Self {
        App {
            database: "bookmarks.db".to_string(),
            port: 8080,
            turso_url: None,
            turso_auth_token: None,
            sync_interval_seconds: default_sync_interval(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn get_port(&self) -> i32 {
        self.port
    }

    // `${TURSO_URL}` with the variable unset substitutes to "", which means
    // "not configured".
    pub fn turso_url(&self) -> Option<&str> {
        self.turso_url.as_deref().filter(|s| !s.is_empty())
    }

    pub fn turso_auth_token(&self) -> Option<&str> {
        self.turso_auth_token.as_deref().filter(|s| !s.is_empty())
    }
}

/// The API key record seeded by `/bootstrap`.
#[derive(Debug, Deserialize, Clone)]
pub struct Bootstrap {
    #[serde(default = "default_bootstrap_key")]
    pub key_value: String,
    #[serde(default = "default_bootstrap_company")]
    pub company: String,
}

fn default_bootstrap_key() -> String {
    DEFAULT_BOOTSTRAP_KEY.to_string()
}

fn default_bootstrap_company() -> String {
    DEFAULT_BOOTSTRAP_COMPANY.to_string()
}

impl Default for Bootstrap {
    fn default() -> Self {
        Bootstrap {
            key_value: default_bootstrap_key(),
            company: default_bootstrap_company(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    pub app: App,
    #[serde(default)]
    pub bootstrap: Bootstrap,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!("environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = Config::from_yaml("app:\n  database: bookmarks.db\n  port: 8080\n").unwrap();
        assert_eq!(cfg.app.get_db(), "bookmarks.db");
        assert_eq!(cfg.app.get_port(), 8080);
        assert_eq!(cfg.app.sync_interval_seconds, 60);
        assert_eq!(cfg.app.max_body_bytes, 1024 * 1024);
        assert_eq!(cfg.app.turso_url(), None);
        assert_eq!(cfg.bootstrap.key_value, "CHANGE ME");
        assert_eq!(cfg.bootstrap.company, "Wilcox Development Solutions");
    }

    #[test]
    fn test_env_default_substitution() {
        let yaml = r#"
app:
  database: ${BOOKMARKS_TEST_UNSET_DB:-fallback.db}
  port: ${BOOKMARKS_TEST_UNSET_PORT:-9090}
  turso_url: ${BOOKMARKS_TEST_UNSET_TURSO_URL}
bootstrap:
  key_value: secret
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.app.get_db(), "fallback.db");
        assert_eq!(cfg.app.get_port(), 9090);
        assert_eq!(cfg.app.turso_url(), None);
        assert_eq!(cfg.bootstrap.key_value, "secret");
        assert_eq!(cfg.bootstrap.company, "Wilcox Development Solutions");
    }

    #[test]
    fn test_unterminated_placeholder_is_left_alone() {
        let out = Config::substitute_env_vars("database: ${OOPS").unwrap();
        assert_eq!(out, "database: ${OOPS");
    }
}
