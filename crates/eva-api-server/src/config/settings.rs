use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config/settings";

/// Instruction sent ahead of every chat exchange unless overridden in config.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an EVA support assistant for crew members \
working outside a pressurized habitat. Answer concisely and operationally. Use the telemetry \
context you are given, call out any out-of-family readings, and when a situation sounds \
dangerous tell the crew member to follow the emergency return procedure and contact mission \
control. Never invent telemetry values.";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Unset means the request waits for the endpoint indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    pub max_tokens: usize,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            model: "llama-3.1-8b-instruct".to_string(),
            api_key: None,
            timeout_seconds: None,
            max_tokens: 512,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Sled,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    pub backend: BackendKind,
    /// Database directory, only read by the sled backend.
    pub path: String,
    pub max_messages: usize,
    /// How many trailing history entries are forwarded to the model.
    pub history_window: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Sled,
            path: "./data/conversations".to_string(),
            max_messages: 50,
            history_window: 10,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptsConfig {
    pub system_prompt: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server = ServerConfig::default();
        let llm = LlmConfig::default();
        let store = StoreConfig::default();

        let config = Config::builder()
            .set_default("server.host", server.host)?
            .set_default("server.port", i64::from(server.port))?
            .set_default("llm.base_url", llm.base_url)?
            .set_default("llm.model", llm.model)?
            .set_default("llm.max_tokens", llm.max_tokens as i64)?
            .set_default("llm.temperature", llm.temperature)?
            .set_default("llm.top_p", llm.top_p)?
            .set_default("store.backend", "sled")?
            .set_default("store.path", store.path)?
            .set_default("store.max_messages", store.max_messages as i64)?
            .set_default("store.history_window", store.history_window as i64)?
            .set_default("prompts.system_prompt", DEFAULT_SYSTEM_PROMPT)?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// The settings file that `load` picked up, if any.
    pub fn config_file() -> Option<PathBuf> {
        locate_config_file(Path::new("."))
    }
}

fn locate_config_file(base: &Path) -> Option<PathBuf> {
    let path = base.join(format!("{}.toml", CONFIG_FILE));
    path.is_file().then_some(path)
}
