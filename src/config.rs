use serde::{Deserialize, Serialize};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub engine_config: EngineConfig,
    #[serde(default)]
    pub llm_config: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Pipeline knobs. Everything has a default so a config file only carrying
/// LLM credentials still boots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Budget for a single collaborator call, translation or mapping.
    #[serde(default = "default_llm_timeout_ms")]
    pub llm_timeout_ms: u64,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_llm_timeout_ms() -> u64 {
    8000
}

fn default_max_input_chars() -> usize {
    2000
}

fn default_max_context_chars() -> usize {
    500
}

fn default_provider() -> String {
    "openai_compatible".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        Self::parse(&content, path)
    }

    /// Parse config content, picking the format from the file extension.
    pub fn parse(content: &str, path: &str) -> Result<Self> {
        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            let config: Config = serde_json::from_str(content)
                .with_context(|| format!("parsing {path} as JSON"))?;
            Ok(config)
        } else {
            let config: Config = serde_yaml::from_str(content)
                .with_context(|| format!("parsing {path} as YAML"))?;
            Ok(config)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            system_config: SystemConfig::default(),
            engine_config: EngineConfig::default(),
            llm_config: LlmConfig::default(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            llm_timeout_ms: default_llm_timeout_ms(),
            max_input_chars: default_max_input_chars(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
        }
    }
}
