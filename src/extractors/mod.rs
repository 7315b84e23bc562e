use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod youtube;

use crate::Result;

pub use youtube::YoutubeExtractor;

/// Accepted URL shapes: `youtube.com/watch?v=`, `youtu.be/` and `youtube.com/embed/`,
/// each with an optional scheme and `www.` prefix. Anything after the id is ignored.
static YOUTUBE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)[\w-]+",
    )
    .expect("YouTube URL pattern is valid")
});

/// Check whether `url` has one of the supported YouTube video URL shapes
pub fn is_valid_youtube_url(url: &str) -> bool {
    YOUTUBE_URL.is_match(url.trim())
}

/// Video chapter as reported by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub end_time: f64,
}

/// Video metadata extracted without downloading any media
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Duration in seconds
    pub duration: Option<u64>,
    pub uploader: Option<String>,
    /// Upload date as reported by the platform (`YYYYMMDD`)
    pub upload_date: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub thumbnail: Option<String>,
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl VideoMetadata {
    pub fn title_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(default)
    }

    pub fn uploader_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.uploader.as_deref().unwrap_or(default)
    }

    /// Base name shared by the audio and PDF artifacts of this video
    pub fn artifact_stem(&self) -> String {
        let title = crate::utils::sanitize_filename(self.title_or("video"));
        let id = crate::utils::sanitize_filename(self.id.as_deref().unwrap_or("unknown"));
        format!("{}_{}", title, id)
    }
}

/// Audio containers yt-dlp may leave behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFormat {
    Mp3,
    M4a,
    Wav,
    Webm,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Wav => "wav",
            AudioFormat::Webm => "webm",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "m4a" | "aac" => Some(AudioFormat::M4a),
            "wav" => Some(AudioFormat::Wav),
            "webm" => Some(AudioFormat::Webm),
            _ => None,
        }
    }

    /// Get MIME type for the format
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::M4a => "audio/mp4",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Webm => "audio/webm",
        }
    }
}

/// A downloaded audio file owned by one conversion
///
/// The file (and its scratch directory, if any) is removed when the artifact is
/// dropped unless [`AudioArtifact::persist`] was called.
#[derive(Debug)]
pub struct AudioArtifact {
    path: PathBuf,
    size: u64,
    scratch_dir: Option<PathBuf>,
    persist: bool,
}

impl AudioArtifact {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            scratch_dir: None,
            persist: false,
        }
    }

    /// Also remove `dir` on drop; it must contain nothing but this artifact
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn format(&self) -> AudioFormat {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(AudioFormat::from_extension)
            .unwrap_or(AudioFormat::Mp3)
    }

    /// Keep the file on disk after the artifact is dropped
    pub fn persist(&mut self) {
        self.persist = true;
    }

    /// Remove the file now
    pub fn discard(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.persist {
            return;
        }
        self.persist = true;

        if self.path.exists() {
            match fs_err::remove_file(&self.path) {
                Ok(()) => tracing::info!("Cleaned up audio file: {}", self.path.display()),
                Err(e) => tracing::warn!("Failed to cleanup audio file: {}", e),
            }
        }

        if let Some(dir) = self.scratch_dir.take() {
            if let Err(e) = fs_err::remove_dir_all(&dir) {
                tracing::warn!("Failed to remove scratch directory: {}", e);
            }
        }
    }
}

impl Drop for AudioArtifact {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Fetches video metadata for a URL without downloading media
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract_video_info(&self, url: &str) -> Result<VideoMetadata>;
}

/// Downloads the best audio stream of a video and normalizes it to MP3
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioAcquirer: Send + Sync {
    /// `metadata` is the result of a previous extraction, so implementations
    /// need not query the platform again for naming
    async fn download_audio(&self, url: &str, metadata: &VideoMetadata) -> Result<AudioArtifact>;
}
