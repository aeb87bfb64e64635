//! Configuration management for medeval
//!
//! Settings for the judge oracle, the subject system under test and batch
//! execution, loaded from `.medeval/config.toml` in the working directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{EvalError, Result};

/// Directory holding the configuration file
pub const CONFIG_DIR: &str = ".medeval";

/// Workspace-level evaluation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default)]
    pub judge: JudgeSettings,

    #[serde(default)]
    pub subject: SubjectSettings,

    #[serde(default)]
    pub run: RunSettings,
}

/// Oracle (judge) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeSettings {
    /// Model name sent to the Messages API
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Low temperature reduces score variance between runs
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_judge_timeout")]
    pub timeout_secs: u64,
}

/// Subject system (chatbot under test) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectSettings {
    /// HTTP endpoint accepting `{"question": ...}`
    #[serde(default = "default_subject_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_subject_timeout")]
    pub timeout_secs: u64,
}

/// Batch execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    /// Cases processed in parallel per stage (1 = sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Include the built-in curated cases
    #[serde(default = "default_include_curated")]
    pub include_curated: bool,

    /// Optional external corpus file (`{questions: [...]}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_corpus: Option<PathBuf>,
}

// Default value providers
fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_temperature() -> f32 {
    0.2
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_api_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_judge_timeout() -> u64 {
    120
}

fn default_subject_endpoint() -> String {
    "http://127.0.0.1:8000/chat".to_string()
}

fn default_subject_timeout() -> u64 {
    60
}

fn default_concurrency() -> usize {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("test_results")
}

fn default_include_curated() -> bool {
    true
}

impl EvalConfig {
    /// Load configuration from `.medeval/config.toml` or use defaults
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let config_path = Self::path(root);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&content)
                .map_err(|e| EvalError::Config(format!("Failed to parse config file: {}", e)))?;
            config.validate()?;
            tracing::debug!(path = %config_path.display(), "Loaded configuration");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Write default configuration to `.medeval/config.toml`
    pub fn write_default(root: &Path) -> Result<PathBuf> {
        let config_dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| EvalError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.run.concurrency == 0 {
            return Err(EvalError::Config(
                "run.concurrency must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.judge.temperature) {
            return Err(EvalError::Config(format!(
                "judge.temperature must be between 0 and 1, got {}",
                self.judge.temperature
            )));
        }
        Ok(())
    }
}

impl RunSettings {
    /// Resolve relative artifact and corpus paths against `root`
    ///
    /// Absolute paths are left alone.
    pub fn anchor(&mut self, root: &Path) {
        if self.output_dir.is_relative() {
            self.output_dir = root.join(&self.output_dir);
        }
        if let Some(corpus) = self.external_corpus.as_mut() {
            if corpus.is_relative() {
                *corpus = root.join(&*corpus);
            }
        }
    }
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
            api_url: default_api_url(),
            timeout_secs: default_judge_timeout(),
        }
    }
}

impl Default for SubjectSettings {
    fn default() -> Self {
        Self {
            endpoint: default_subject_endpoint(),
            timeout_secs: default_subject_timeout(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            output_dir: default_output_dir(),
            include_curated: default_include_curated(),
            external_corpus: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let config = EvalConfig::load_or_default(dir.path()).unwrap();

        assert_eq!(config.judge.max_tokens, 4000);
        assert_eq!(config.judge.temperature, 0.2);
        assert_eq!(config.run.concurrency, 1);
        assert_eq!(config.run.output_dir, PathBuf::from("test_results"));
        assert!(config.run.include_curated);
        assert!(config.run.external_corpus.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempdir().unwrap();
        let path = EvalConfig::write_default(dir.path()).unwrap();
        assert!(path.exists());

        let config = EvalConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.judge.api_key_env, "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        std::fs::write(
            EvalConfig::path(dir.path()),
            "[run]\nconcurrency = 4\nexternal_corpus = \"test_data/forum_test_cases.json\"\n",
        )
        .unwrap();

        let config = EvalConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.run.concurrency, 4);
        assert_eq!(
            config.run.external_corpus,
            Some(PathBuf::from("test_data/forum_test_cases.json"))
        );
        assert_eq!(config.judge.max_tokens, 4000);
    }

    #[test]
    fn test_anchor_joins_relative_paths() {
        let mut run = RunSettings {
            external_corpus: Some(PathBuf::from("test_data/forum.json")),
            ..RunSettings::default()
        };
        run.anchor(Path::new("/srv/project"));
        assert_eq!(run.output_dir, PathBuf::from("/srv/project/test_results"));
        assert_eq!(
            run.external_corpus,
            Some(PathBuf::from("/srv/project/test_data/forum.json"))
        );

        let mut absolute = RunSettings {
            output_dir: PathBuf::from("/var/results"),
            ..RunSettings::default()
        };
        absolute.anchor(Path::new("/srv/project"));
        assert_eq!(absolute.output_dir, PathBuf::from("/var/results"));
        assert!(absolute.external_corpus.is_none());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        std::fs::write(EvalConfig::path(dir.path()), "[run]\nconcurrency = 0\n").unwrap();

        let err = EvalConfig::load_or_default(dir.path()).unwrap_err();
        assert!(matches!(err, EvalError::Config(_)));
    }
}
