use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::chunk::{MAX_CHAPTERS, MIN_CHAPTERS, MIN_CHAPTER_LENGTH, TARGET_WORDS_PER_CHAPTER};
use crate::chapter::MAX_INPUT_CHARS;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub chaptering: ChapteringConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_reading_wpm")]
    pub reading_words_per_minute: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            reading_words_per_minute: default_reading_wpm(),
        }
    }
}

fn default_max_file_bytes() -> u64 {
    20 * 1024 * 1024
}
fn default_reading_wpm() -> usize {
    200
}

/// Tuning knobs for the AI chaptering engine and the fallback chunker.
#[derive(Debug, Deserialize, Clone)]
pub struct ChapteringConfig {
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default = "default_min_chapter_chars")]
    pub min_chapter_chars: usize,
    #[serde(default = "default_target_words")]
    pub target_words_per_chapter: usize,
    #[serde(default = "default_min_chapters")]
    pub min_chapters: usize,
    #[serde(default = "default_max_chapters")]
    pub max_chapters: usize,
}

impl Default for ChapteringConfig {
    fn default() -> Self {
        Self {
            max_input_chars: default_max_input_chars(),
            min_chapter_chars: default_min_chapter_chars(),
            target_words_per_chapter: default_target_words(),
            min_chapters: default_min_chapters(),
            max_chapters: default_max_chapters(),
        }
    }
}

fn default_max_input_chars() -> usize {
    MAX_INPUT_CHARS
}
fn default_min_chapter_chars() -> usize {
    MIN_CHAPTER_LENGTH
}
fn default_target_words() -> usize {
    TARGET_WORDS_PER_CHAPTER
}
fn default_min_chapters() -> usize {
    MIN_CHAPTERS
}
fn default_max_chapters() -> usize {
    MAX_CHAPTERS
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after the first call. `0` means a single attempt.
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

impl ModelConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// All-defaults configuration with the database in the working directory.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/courses.sqlite"),
            },
            ingest: IngestConfig::default(),
            chaptering: ChapteringConfig::default(),
            model: ModelConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.ingest.max_file_bytes == 0 {
        anyhow::bail!("ingest.max_file_bytes must be > 0");
    }
    if config.ingest.reading_words_per_minute == 0 {
        anyhow::bail!("ingest.reading_words_per_minute must be > 0");
    }

    let ch = &config.chaptering;
    if ch.max_input_chars == 0 || ch.min_chapter_chars == 0 || ch.target_words_per_chapter == 0 {
        anyhow::bail!("chaptering limits must be > 0");
    }
    if ch.min_chapters == 0 || ch.min_chapters > ch.max_chapters {
        anyhow::bail!("chaptering.min_chapters must be in [1, chaptering.max_chapters]");
    }

    match config.model.provider.as_str() {
        "disabled" | "gemini" | "openai" => {}
        other => anyhow::bail!(
            "Unknown model provider: '{}'. Must be disabled, gemini, or openai.",
            other
        ),
    }

    if config.model.is_enabled() && config.model.model.is_none() {
        anyhow::bail!(
            "model.model must be specified when provider is '{}'",
            config.model.provider
        );
    }

    Ok(())
}
