//! Configuration management

use std::{env, path::Path, path::PathBuf, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Environment files to load before processing config.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    /// Variables are set into the process environment for `{env.VAR}` resolution.
    #[serde(default)]
    pub env_files: Vec<String>,
    /// Server configuration
    pub server: ServerConfig,
    /// Job store configuration
    pub jobs: JobsConfig,
    /// Path-safety sandbox roots
    pub sandbox: SandboxConfig,
    /// Subprocess orchestrator configuration
    pub orchestrator: OrchestratorConfig,
    /// AI-CLI handler configuration
    pub ai_cli: AiCliConfig,
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!("config file not found: {}", p.display())));
            }
            figment = figment.merge(Yaml::file(p));
        }

        figment = figment.merge(Env::prefixed("GAEA_MCP_").split("__"));

        let mut config: Self = figment.extract().map_err(|e| Error::Config(e.to_string()))?;

        config.load_env_files();
        config.expand_env_vars();

        Ok(config)
    }

    /// Load environment files into the process environment.
    /// Supports ~ expansion. Files that don't exist are silently skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if path_str.starts_with('~') {
                if let Some(home) = dirs::home_dir() {
                    path_str.replacen('~', &home.display().to_string(), 1)
                } else {
                    path_str.clone()
                }
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => tracing::info!("loaded env file: {expanded}"),
                    Err(e) => tracing::warn!("failed to load env file {expanded}: {e}"),
                }
            } else {
                tracing::debug!("env file not found (skipped): {expanded}");
            }
        }
    }

    /// Expand `{env.VAR}` patterns in path-like config values.
    fn expand_env_vars(&mut self) {
        let re = Regex::new(r"\{env\.([A-Z_][A-Z0-9_]*)\}").unwrap();
        self.orchestrator.binary_path = Self::expand_string(&re, &self.orchestrator.binary_path);
        self.sandbox.project_root = Self::expand_string(&re, &self.sandbox.project_root);
        self.sandbox.asset_root = Self::expand_string(&re, &self.sandbox.asset_root);
        self.sandbox.output_root = Self::expand_string(&re, &self.sandbox.output_root);
        self.jobs.directory = Self::expand_string(&re, &self.jobs.directory);
    }

    fn expand_string(re: &Regex, value: &str) -> String {
        re.replace_all(value, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_default()
        })
        .into_owned()
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8900,
            request_timeout: Duration::from_secs(60),
            shutdown_timeout: Duration::from_secs(30),
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

/// Persistent job store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Directory holding one `<id>.job` file per job
    pub directory: String,
    /// Terminal jobs older than this are reaped
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,
    /// How often the reaper task scans for expired jobs
    #[serde(with = "humantime_serde")]
    pub reap_interval: Duration,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            directory: "jobs".to_string(),
            max_age: Duration::from_secs(24 * 3600),
            reap_interval: Duration::from_secs(3600),
        }
    }
}

/// Three named sandbox roots enforced by the path-safety gate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub project_root: String,
    pub asset_root: String,
    pub output_root: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            project_root: "projects".to_string(),
            asset_root: "assets".to_string(),
            output_root: "output".to_string(),
        }
    }
}

/// Subprocess orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Path to the external renderer binary
    pub binary_path: String,
    /// Default per-tool timeout
    #[serde(with = "humantime_serde")]
    pub default_timeout: Duration,
    /// Grace period between a graceful kill and a hard kill
    #[serde(with = "humantime_serde")]
    pub kill_grace_period: Duration,
    /// Concurrency cap override; 0 means derive from `max(1, cpu/2)`
    pub max_concurrent_jobs: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            binary_path: "Gaea.Swarm.exe".to_string(),
            default_timeout: Duration::from_secs(600),
            kill_grace_period: Duration::from_secs(5),
            max_concurrent_jobs: 0,
        }
    }
}

impl OrchestratorConfig {
    /// Resolve the effective concurrency cap: the configured override, or
    /// `max(1, cpu_count / 2)` when unset.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        if self.max_concurrent_jobs > 0 {
            return self.max_concurrent_jobs;
        }
        std::thread::available_parallelism()
            .map(|n| (n.get() / 2).max(1))
            .unwrap_or(1)
    }

    pub fn binary(&self) -> PathBuf {
        PathBuf::from(&self.binary_path)
    }
}

/// AI-CLI handler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiCliConfig {
    /// Number of prior exchanges kept in the rolling history ring buffer
    pub max_history: usize,
}

impl Default for AiCliConfig {
    fn default() -> Self {
        Self { max_history: 20 }
    }
}

/// Custom humantime serde module for Duration
pub mod humantime_serde {
    use std::time::Duration;

    use serde::{self, Deserialize, Deserializer, Serializer};

    /// # Errors
    /// Returns a serialization error if the serializer fails.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    /// # Errors
    /// Returns a deserialization error if the string cannot be parsed as a duration.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>().map(Duration::from_secs).map_err(serde::de::Error::custom)
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(serde::de::Error::custom)
        } else if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>().map(Duration::from_millis).map_err(serde::de::Error::custom)
        } else {
            s.parse::<u64>().map(Duration::from_secs).map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_env_files_sets_env_vars() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("test.env");
        let mut f = std::fs::File::create(&env_path).unwrap();
        writeln!(f, "GAEA_TEST_KEY_A=hello_from_env_file").unwrap();
        drop(f);

        let config = Config {
            env_files: vec![env_path.to_string_lossy().to_string()],
            ..Default::default()
        };
        config.load_env_files();

        assert_eq!(env::var("GAEA_TEST_KEY_A").unwrap(), "hello_from_env_file");
    }

    #[test]
    fn load_env_files_skips_missing() {
        let config = Config {
            env_files: vec!["/nonexistent/path/.env".to_string()],
            ..Default::default()
        };
        config.load_env_files();
    }

    #[test]
    fn effective_concurrency_is_at_least_one() {
        let cfg = OrchestratorConfig::default();
        assert!(cfg.effective_concurrency() >= 1);
    }

    #[test]
    fn effective_concurrency_honors_override() {
        let cfg = OrchestratorConfig {
            max_concurrent_jobs: 7,
            ..Default::default()
        };
        assert_eq!(cfg.effective_concurrency(), 7);
    }

    #[test]
    fn config_deserializes_from_yaml() {
        let yaml = r#"
server:
  host: "0.0.0.0"
  port: 9000
jobs:
  directory: "/var/gaea/jobs"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.jobs.directory, "/var/gaea/jobs");
    }
}
