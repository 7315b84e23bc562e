use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `openai.api_key`
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenAI API settings for transcription and analysis
    pub openai: OpenAiConfig,

    /// Where artifacts are written
    pub storage: StorageConfig,

    /// Policy ceilings enforced by the pipeline
    pub limits: LimitsConfig,

    /// PDF rendering settings
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; `OPENAI_API_KEY` takes precedence
    pub api_key: String,

    /// Base URL of an OpenAI-compatible API
    pub api_base: String,

    /// Speech-to-text model
    pub whisper_model: String,

    /// Chat model used for analysis and report layout
    pub gpt_model: String,

    /// Sampling temperature for chat completions
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory; audio goes to `youtube/`, PDFs to `pdfs/`
    pub upload_dir: PathBuf,

    /// Keep downloaded audio after the conversion finishes
    pub keep_audio: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum audio file size in bytes
    pub max_file_size: u64,

    /// Maximum video duration in seconds
    pub max_video_duration: u64,

    /// Minimum trimmed transcript length in characters
    pub min_transcript_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// HTML-to-PDF command, invoked as `<engine> <input.html> <output.pdf>`
    pub engine: String,

    /// Text printed at the top of every page
    pub running_header: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            whisper_model: "whisper-1".to_string(),
            gpt_model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            keep_audio: false,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024,
            max_video_duration: 7200,
            min_transcript_chars: 50,
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            engine: "weasyprint".to_string(),
            running_header: "YouTube Video Analysis".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, the default location, or create a default file
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        let mut config = if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            serde_yaml::from_str(&content).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save(&config_path).await?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            config
        };

        config.apply_env();
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("yt-pdf").join("config.yaml"))
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.openai.api_key = key.trim().to_string();
            }
        }
    }

    /// Validate configuration before running a conversion
    pub fn validate(&self) -> Result<()> {
        if self.openai.api_key.is_empty() {
            anyhow::bail!(
                "OpenAI API key must be configured (set {} or openai.api_key)",
                API_KEY_ENV
            );
        }

        Url::parse(&self.openai.api_base)
            .with_context(|| format!("Invalid openai.api_base: {}", self.openai.api_base))?;

        if self.limits.max_file_size == 0 || self.limits.max_video_duration == 0 {
            anyhow::bail!("limits.max_file_size and limits.max_video_duration must be positive");
        }

        if self.pdf.engine.trim().is_empty() {
            anyhow::bail!("pdf.engine must name an HTML-to-PDF command");
        }

        Ok(())
    }

    /// Directory holding downloaded audio
    pub fn audio_dir(&self) -> PathBuf {
        self.storage.upload_dir.join("youtube")
    }

    /// Directory holding generated PDFs
    pub fn pdf_dir(&self) -> PathBuf {
        self.storage.upload_dir.join("pdfs")
    }

    /// Display current configuration
    pub fn display(&self) {
        let key = if self.openai.api_key.is_empty() {
            "(not set)"
        } else {
            "(set)"
        };

        println!("Current Configuration:");
        println!("  OpenAI API Key: {}", key);
        println!("  OpenAI API Base: {}", self.openai.api_base);
        println!("  Whisper Model: {}", self.openai.whisper_model);
        println!("  GPT Model: {}", self.openai.gpt_model);
        println!("  Upload Directory: {}", self.storage.upload_dir.display());
        println!("  Keep Audio: {}", self.storage.keep_audio);
        println!(
            "  Max File Size: {}",
            crate::utils::format_file_size(self.limits.max_file_size)
        );
        println!(
            "  Max Video Duration: {}",
            crate::utils::format_duration(Some(self.limits.max_video_duration))
        );
        println!("  PDF Engine: {}", self.pdf.engine);
    }
}
