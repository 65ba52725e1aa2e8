use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderChoice {
    Gemini,
    Dryrun,
}

impl ProviderChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Dryrun => "dryrun",
        }
    }
}

impl fmt::Display for ProviderChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderChoice {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "dryrun" | "dry-run" | "offline" => Ok(Self::Dryrun),
            other => bail!("unknown provider '{other}' (expected gemini or dryrun)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub provider: ProviderChoice,
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    pub request_timeout_s: f64,
    pub transport_retries: usize,
    pub retry_backoff_s: f64,
}

/// `config.json` keys mirror the environment variable names.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(rename = "AMIMI_PROVIDER")]
    provider: Option<String>,
    #[serde(rename = "GEMINI_API_KEY")]
    api_key: Option<String>,
    #[serde(rename = "GEMINI_API_BASE")]
    api_base: Option<String>,
    #[serde(rename = "GEMINI_TEXT_MODEL")]
    text_model: Option<String>,
    #[serde(rename = "GEMINI_IMAGE_MODEL")]
    image_model: Option<String>,
    #[serde(rename = "AMIMI_REQUEST_TIMEOUT_S")]
    request_timeout_s: Option<f64>,
    #[serde(rename = "AMIMI_TRANSPORT_RETRIES")]
    transport_retries: Option<f64>,
    #[serde(rename = "AMIMI_RETRY_BACKOFF_S")]
    retry_backoff_s: Option<f64>,
}

impl EngineConfig {
    /// Environment first, then `config_path` (or `./config.json` when present), then defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => read_file_config(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                read_file_config(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => FileConfig::default(),
        };
        Self::resolve(&file, non_empty_env)
    }

    fn resolve(file: &FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pick = |keys: &[&str], file_value: &Option<String>| -> Option<String> {
            keys.iter()
                .find_map(|&key| env(key))
                .or_else(|| non_empty(file_value.as_deref()))
        };
        let number = |key: &str, file_value: Option<f64>| -> Result<Option<f64>> {
            match env(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .map(Some)
                    .with_context(|| format!("{key} must be a number, got '{raw}'")),
                None => Ok(file_value),
            }
        };

        let provider = match pick(&["AMIMI_PROVIDER"], &file.provider) {
            Some(raw) => raw.parse()?,
            None => ProviderChoice::Gemini,
        };
        Ok(Self {
            provider,
            api_key: pick(&["GEMINI_API_KEY", "GOOGLE_API_KEY"], &file.api_key),
            api_base: pick(&["GEMINI_API_BASE"], &file.api_base)
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            text_model: pick(&["GEMINI_TEXT_MODEL"], &file.text_model)
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: pick(&["GEMINI_IMAGE_MODEL"], &file.image_model)
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            request_timeout_s: clamp_setting(
                number("AMIMI_REQUEST_TIMEOUT_S", file.request_timeout_s)?,
                90.0,
                15.0,
                300.0,
            ),
            transport_retries: clamp_setting(
                number("AMIMI_TRANSPORT_RETRIES", file.transport_retries)?,
                2.0,
                0.0,
                4.0,
            )
            .round() as usize,
            retry_backoff_s: clamp_setting(
                number("AMIMI_RETRY_BACKOFF_S", file.retry_backoff_s)?,
                1.2,
                0.1,
                10.0,
            ),
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: ProviderChoice::Gemini,
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout_s: 90.0,
            transport_retries: 2,
            retry_backoff_s: 1.2,
        }
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn clamp_setting(value: Option<f64>, default: f64, min: f64, max: f64) -> f64 {
    match value {
        Some(value) if value.is_finite() => value.clamp(min, max),
        _ => default,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn non_empty_env(key: &str) -> Option<String> {
    non_empty(env::var(key).ok().as_deref())
}
