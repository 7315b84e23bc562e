use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::extractors::is_valid_youtube_url;

#[derive(Parser)]
#[command(
    name = "ytpdf",
    about = "YT-PDF - turn YouTube videos into PDF notes using Whisper and GPT",
    version,
    long_about = "Downloads the audio of a YouTube video, transcribes it with Whisper, extracts summaries, concepts and actionable insights with a GPT model and renders them into a printable PDF document."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE", env = "YTPDF_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a YouTube video into a PDF report
    Convert {
        /// YouTube video URL (youtube.com/watch, youtu.be or youtube.com/embed)
        #[arg(value_name = "URL", value_parser = parse_youtube_url)]
        url: String,

        /// Output format of the conversion result
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Keep the downloaded audio file after the conversion
        #[arg(long)]
        keep_audio: bool,
    },

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// Check that yt-dlp, ffmpeg and the PDF engine are installed
    Check,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable summary
    Text,
    /// The response envelope as JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

fn parse_youtube_url(value: &str) -> Result<String, String> {
    let url = value.trim();
    if is_valid_youtube_url(url) {
        Ok(url.to_string())
    } else {
        Err("URL must be a valid YouTube video URL".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_accepts_youtube_url() {
        let cli = Cli::try_parse_from([
            "ytpdf",
            "convert",
            "https://youtu.be/dQw4w9WgXcQ",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Convert { url, format, keep_audio } => {
                assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
                assert_eq!(format, OutputFormat::Json);
                assert!(!keep_audio);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_convert_rejects_foreign_url() {
        let err = Cli::try_parse_from(["ytpdf", "convert", "https://vimeo.com/12345"])
            .err()
            .unwrap();

        assert!(err.to_string().contains("URL must be a valid YouTube video URL"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ytpdf", "check", "--verbose", "--json-logs"]).unwrap();

        assert!(cli.verbose);
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Commands::Check));
    }
}
