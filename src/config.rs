//! Runtime configuration, read once from the environment in `main` and
//! passed down explicitly.

use std::path::PathBuf;
use std::time::Duration;

use homedir::my_home;

use crate::embedding::provider::{ProviderConfig, WireProtocol};

pub const DEFAULT_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_DIMENSION: usize = 1536;
pub const DEFAULT_CLEAR_LEN: usize = 192;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_API_KEY: &str = "ollama";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub provider: ProviderConfig,
    /// Expected embedding dimension, a hint only; the backfill probes
    /// the provider for the real value.
    pub dimension_hint: usize,
    /// None when CLEAR_EMBED_LEN is set but not a positive integer, so
    /// the clear command can refuse to run instead of guessing.
    pub clear_embed_len: Option<usize>,
}

impl Config {
    /// Reads every setting from the environment. Unset and empty
    /// values take the documented defaults; garbage numerics fall back
    /// to defaults too, except CLEAR_EMBED_LEN.
    pub fn from_env() -> Config {
        let data_dir = match env_nonempty("CEREBRO_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir(),
        };

        // The native protocol wins whenever an Ollama endpoint is
        // configured.
        let protocol = match env_nonempty("OLLAMA_BASE_URL") {
            Some(base_url) => WireProtocol::Native { base_url },
            None => WireProtocol::OpenAi {
                base_url: env_nonempty("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                api_key: env_nonempty("OPENAI_API_KEY")
                    .unwrap_or_else(|| DEFAULT_OPENAI_API_KEY.to_string()),
            },
        };

        let model = env_nonempty("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = env_nonempty("EMBEDDING_TIMEOUT_SECS")
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let dimension_hint = env_nonempty("EMBEDDING_DIM")
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_DIMENSION);

        let clear_embed_len = match env_nonempty("CLEAR_EMBED_LEN") {
            Some(raw) => raw.trim().parse().ok().filter(|len| *len > 0),
            None => Some(DEFAULT_CLEAR_LEN),
        };

        Config {
            data_dir,
            provider: ProviderConfig {
                protocol,
                model,
                timeout: Duration::from_secs(timeout_secs),
            },
            dimension_hint,
            clear_embed_len,
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn default_data_dir() -> PathBuf {
    match my_home() {
        Ok(Some(home)) => home.join(".local/share/cerebro"),
        _ => PathBuf::from("cerebro-data"),
    }
}
