use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::generation::RetryPolicy;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const MIN_FONT_SIZE: u16 = 12;
pub const MAX_FONT_SIZE: u16 = 28;

const MAX_ATTEMPTS: u32 = 10;
const MAX_RETRY_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub output: OutputConfig,
    pub history: HistoryConfig,
    pub window: WindowConfig,
    pub display: DisplayConfig,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub endpoint: String,
    pub model: String,
    /// Prefer `GEMINI_API_KEY`; this is only read when the variable is unset.
    pub api_key: Option<String>,
    pub thinking_budget: u32,
    pub attempts: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            thinking_budget: 0,
            attempts: 3,
            retry_delay_ms: 5_000,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig { dir: PathBuf::from(".") }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig { max_entries: 500 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 1100,
            height: 760,
            min_width: 640,
            min_height: 480,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub font: String,
    pub font_size: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            font: "Poppins".to_string(),
            font_size: 18,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = Self::get_config_path();

        if config_path.exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match Self::parse(&contents) {
                    Ok(config) => return config,
                    Err(e) => warn!(path = %config_path.display(), "Error parsing config.toml: {e}. Using defaults."),
                },
                Err(e) => warn!(path = %config_path.display(), "Error reading config.toml: {e}. Using defaults."),
            }
        } else if let Some(parent) = config_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        Config::default().sanitized()
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Config>(contents).map(Config::sanitized)
    }

    /// Clamps values that would otherwise make retries or history unbounded.
    fn sanitized(mut self) -> Self {
        self.gemini.attempts = self.gemini.attempts.clamp(1, MAX_ATTEMPTS);
        self.gemini.retry_delay_ms = self.gemini.retry_delay_ms.min(MAX_RETRY_DELAY_MS);
        self.gemini.timeout_secs = self.gemini.timeout_secs.max(1);
        self.history.max_entries = self.history.max_entries.max(1);
        self.display.font_size = self.display.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self
    }

    /// The environment wins over the file so keys never have to live on disk.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| self.gemini.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.gemini.attempts,
            delay: Duration::from_millis(self.gemini.retry_delay_ms),
        }
    }

    pub fn get_config_path() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config/tutor-me/config.toml")
        } else {
            PathBuf::from("config.toml")
        }
    }
}
