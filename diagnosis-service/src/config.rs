use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use symptom_match::{DuplicateColumns, LoadOptions};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_ENRICH_TOP: usize = 3;
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    Ollama,
    OpenRouter,
}

impl FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openrouter" => Ok(Self::OpenRouter),
            other => Err(format!("unknown extractor '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Anything other than `pretty` selects JSON
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_FORMAT").ok().as_deref())
    }
}

/// Runtime configuration, read from the environment
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub load_options: LoadOptions,
    pub extractor: ExtractorKind,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub extraction_timeout: Duration,
    pub top_k: usize,
    pub enrich_top: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from("data"),
            load_options: LoadOptions::default(),
            extractor: ExtractorKind::Ollama,
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "deepseek-r1:7b".to_string(),
            openrouter_api_key: None,
            openrouter_model: "openai/gpt-4o-mini".to_string(),
            extraction_timeout: Duration::from_secs(DEFAULT_EXTRACTION_TIMEOUT_SECS),
            top_k: DEFAULT_TOP_K,
            enrich_top: DEFAULT_ENRICH_TOP,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let duplicate_columns = match get("DUPLICATE_COLUMNS").as_deref().map(str::trim) {
            Some("reject") => DuplicateColumns::Reject,
            Some("suffix") | None => DuplicateColumns::Suffix,
            Some(other) => {
                warn!(value = other, "unknown DUPLICATE_COLUMNS value, using suffix");
                DuplicateColumns::Suffix
            }
        };

        let load_options = LoadOptions {
            label_column: get("LABEL_COLUMN").unwrap_or(defaults.load_options.label_column),
            duplicate_columns,
            unique_advice_keys: parsed(&get, "STRICT_ADVICE_KEYS", false),
        };

        let extractor = match get("EXTRACTOR") {
            Some(value) => value.parse::<ExtractorKind>().unwrap_or_else(|e| {
                warn!(error = %e, "falling back to ollama extractor");
                ExtractorKind::Ollama
            }),
            None => defaults.extractor,
        };

        Self {
            port: parsed(&get, "PORT", defaults.port),
            data_dir: get("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            load_options,
            extractor,
            ollama_base_url: get("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            ollama_model: get("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openrouter_model: get("OPENROUTER_MODEL").unwrap_or(defaults.openrouter_model),
            extraction_timeout: Duration::from_secs(parsed(
                &get,
                "EXTRACTION_TIMEOUT_SECS",
                DEFAULT_EXTRACTION_TIMEOUT_SECS,
            )),
            top_k: parsed(&get, "TOP_K", defaults.top_k),
            enrich_top: parsed(&get, "ENRICH_TOP", defaults.enrich_top),
        }
    }
}

fn parsed<T: FromStr + Copy>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "invalid value, using default");
            default
        }),
        None => default,
    }
}
