use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use uuid::Uuid;

use super::{AudioArtifact, AudioAcquirer, AudioFormat, Chapter, MetadataExtractor, VideoMetadata};
use crate::Result;

/// Containers checked, in order, when yt-dlp did not leave an MP3 behind
const FALLBACK_FORMATS: [AudioFormat; 3] = [AudioFormat::Webm, AudioFormat::M4a, AudioFormat::Wav];

/// YouTube metadata extractor and audio downloader using yt-dlp and ffmpeg
pub struct YoutubeExtractor {
    yt_dlp_path: String,
    ffmpeg_path: String,
    audio_dir: PathBuf,
}

impl YoutubeExtractor {
    /// Downloads land in `<upload_dir>/youtube/<conversion>/`
    pub fn new(upload_dir: &Path) -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            audio_dir: upload_dir.join("youtube"),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> Result<bool> {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        Ok(matches!(output, Ok(output) if output.status.success()))
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", "--no-warnings", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        let json_str = String::from_utf8(output.stdout)?;
        let info: Value = serde_json::from_str(&json_str).context("yt-dlp returned invalid JSON")?;

        Ok(info)
    }

    /// Download the best audio stream into `dir` as `<stem>.<ext>`
    async fn download_best_audio(&self, url: &str, dir: &Path, stem: &str) -> Result<()> {
        let template = dir.join(format!("{}.%(ext)s", stem));
        tracing::debug!("Downloading audio for {} to {}", url, template.display());

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--output",
                &template.to_string_lossy(),
                "--format",
                "bestaudio/best",
                "--extract-audio",
                "--audio-format",
                "mp3",
                "--audio-quality",
                "192K",
                "--no-playlist",
                "--quiet",
                "--no-warnings",
                url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed to download audio: {}", error.trim());
        }

        Ok(())
    }

    /// Locate the downloaded file, converting any other container to MP3
    async fn normalize_to_mp3(&self, dir: &Path, stem: &str) -> Result<PathBuf> {
        let mp3_path = dir.join(format!("{}.{}", stem, AudioFormat::Mp3.as_str()));
        if mp3_path.exists() {
            return Ok(mp3_path);
        }

        for format in FALLBACK_FORMATS {
            let candidate = dir.join(format!("{}.{}", stem, format.as_str()));
            if candidate.exists() {
                self.convert_to_mp3(&candidate, &mp3_path).await?;
                tokio::fs::remove_file(&candidate).await?;
                return Ok(mp3_path);
            }
        }

        anyhow::bail!("Downloaded audio file not found")
    }

    /// Convert file to MP3 using ffmpeg
    async fn convert_to_mp3(&self, source_path: &Path, target_path: &Path) -> Result<()> {
        tracing::debug!("Converting {} to MP3", source_path.display());

        let output = Command::new(&self.ffmpeg_path)
            .args([
                "-i",
                &source_path.to_string_lossy(),
                "-vn",
                "-acodec",
                "libmp3lame",
                "-ab",
                "192k",
                "-y",
                &target_path.to_string_lossy(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to convert audio with ffmpeg: {}", error.trim());
        }

        Ok(())
    }
}

/// Map the yt-dlp `--dump-json` document onto [`VideoMetadata`]
pub fn parse_video_info(info: &Value) -> VideoMetadata {
    let text = |key: &str| info[key].as_str().map(|s| s.to_string());
    let count = |key: &str| info[key].as_u64();
    let strings = |key: &str| {
        info[key]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    };

    let chapters = info["chapters"]
        .as_array()
        .map(|chapters| {
            chapters
                .iter()
                .map(|chapter| Chapter {
                    title: Some(
                        chapter["title"]
                            .as_str()
                            .unwrap_or("Untitled Chapter")
                            .to_string(),
                    ),
                    start_time: chapter["start_time"].as_f64().unwrap_or(0.0),
                    end_time: chapter["end_time"].as_f64().unwrap_or(0.0),
                })
                .collect()
        })
        .unwrap_or_default();

    VideoMetadata {
        id: text("id"),
        title: text("title"),
        description: text("description"),
        duration: info["duration"].as_f64().map(|d| d.round() as u64),
        uploader: text("uploader"),
        upload_date: text("upload_date"),
        view_count: count("view_count"),
        like_count: count("like_count"),
        tags: strings("tags"),
        categories: strings("categories"),
        thumbnail: text("thumbnail"),
        webpage_url: text("webpage_url"),
        chapters,
    }
}

#[async_trait]
impl MetadataExtractor for YoutubeExtractor {
    async fn extract_video_info(&self, url: &str) -> Result<VideoMetadata> {
        if !self.check_availability().await? {
            anyhow::bail!("yt-dlp is not available. Please install it: https://github.com/yt-dlp/yt-dlp");
        }

        let info = self.get_video_info(url).await?;
        let metadata = parse_video_info(&info);

        tracing::info!(
            id = metadata.id.as_deref().unwrap_or("-"),
            duration = metadata.duration,
            chapters = metadata.chapters.len(),
            "Extracted video info: {}",
            metadata.title_or("untitled")
        );

        Ok(metadata)
    }
}

#[async_trait]
impl AudioAcquirer for YoutubeExtractor {
    async fn download_audio(&self, url: &str, metadata: &VideoMetadata) -> Result<AudioArtifact> {
        let scratch_dir = self.audio_dir.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&scratch_dir)
            .await
            .with_context(|| format!("Failed to create {}", scratch_dir.display()))?;

        let stem = metadata.artifact_stem();
        let downloaded = async {
            self.download_best_audio(url, &scratch_dir, &stem).await?;
            self.normalize_to_mp3(&scratch_dir, &stem).await
        }
        .await;

        let mp3_path = match downloaded {
            Ok(path) => path,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_dir_all(&scratch_dir).await {
                    tracing::warn!("Failed to remove {}: {}", scratch_dir.display(), cleanup);
                }
                return Err(e);
            }
        };

        let size = tokio::fs::metadata(&mp3_path).await?.len();
        tracing::info!("Downloaded audio: {} ({} bytes)", mp3_path.display(), size);

        Ok(AudioArtifact::new(mp3_path, size).with_scratch_dir(scratch_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_video_info() {
        let info = json!({
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "description": "The official video",
            "duration": 212,
            "uploader": "Rick Astley",
            "upload_date": "20091025",
            "view_count": 1_500_000_000u64,
            "like_count": 17_000_000u64,
            "tags": ["rick astley", "music"],
            "categories": ["Music"],
            "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
            "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "chapters": [
                {"title": "Intro", "start_time": 0.0, "end_time": 18.5},
                {"start_time": 18.5, "end_time": 212.0}
            ]
        });

        let metadata = parse_video_info(&info);

        assert_eq!(metadata.id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(metadata.duration, Some(212));
        assert_eq!(metadata.tags, vec!["rick astley", "music"]);
        assert_eq!(metadata.chapters.len(), 2);
        assert_eq!(metadata.chapters[0].title.as_deref(), Some("Intro"));
        assert_eq!(metadata.chapters[1].title.as_deref(), Some("Untitled Chapter"));
        assert_eq!(metadata.chapters[1].end_time, 212.0);
    }

    #[test]
    fn test_parse_video_info_tolerates_missing_fields() {
        let metadata = parse_video_info(&json!({"id": "abc", "duration": 59.6}));

        assert_eq!(metadata.duration, Some(60));
        assert!(metadata.title.is_none());
        assert!(metadata.tags.is_empty());
        assert!(metadata.chapters.is_empty());
    }

    #[tokio::test]
    async fn test_normalize_finds_existing_mp3() {
        let dir = tempfile::TempDir::new().unwrap();
        let extractor = YoutubeExtractor::new(dir.path());
        let mp3 = dir.path().join("clip_abc.mp3");
        fs_err::write(&mp3, b"ID3").unwrap();

        let found = extractor.normalize_to_mp3(dir.path(), "clip_abc").await.unwrap();
        assert_eq!(found, mp3);
    }

    #[tokio::test]
    async fn test_normalize_fails_without_download() {
        let dir = tempfile::TempDir::new().unwrap();
        let extractor = YoutubeExtractor::new(dir.path());

        let err = extractor.normalize_to_mp3(dir.path(), "missing").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
