pub mod settings;

pub use settings::{BackendKind, LlmConfig, PromptsConfig, ServerConfig, Settings, StoreConfig};
