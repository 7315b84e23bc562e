use tokio::process::Command;

/// Maximum length of a sanitized filename stem
const MAX_FILENAME_CHARS: usize = 100;

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Size in megabytes (10^6 bytes), rounded to two decimals
pub fn bytes_to_mb(bytes: u64) -> f64 {
    round2(bytes as f64 / 1_000_000.0)
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a video duration as `1h 2m 3s`; missing or zero durations are `Unknown`
pub fn format_duration(seconds: Option<u64>) -> String {
    let total_seconds = match seconds {
        Some(s) if s > 0 => s,
        _ => return "Unknown".to_string(),
    };
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Format a chapter offset as `MM:SS`, or `HH:MM:SS` past the first hour
pub fn format_timestamp(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }

    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Sanitize filename for safe filesystem usage
///
/// Reserved characters become `_`, runs of `_` collapse to one, leading and
/// trailing `_` are stripped and the result is capped at 100 characters.
pub fn sanitize_filename(filename: &str) -> String {
    let mut sanitized = String::with_capacity(filename.len());

    for c in filename.chars() {
        let c = match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        };
        if c == '_' && sanitized.ends_with('_') {
            continue;
        }
        sanitized.push(c);
    }

    sanitized
        .trim_matches('_')
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect()
}

/// Truncate to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Check if the current environment has required tools
pub async fn check_dependencies(pdf_engine: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required for YouTube metadata and audio extraction".to_string());
    }

    if !check_command_available("ffmpeg").await {
        missing.push("ffmpeg - required to normalize audio to MP3".to_string());
    }

    if !check_command_available(pdf_engine).await {
        missing.push(format!("{} - required to render PDF documents", pdf_engine));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1048576), "1.0 MB");
    }

    #[test]
    fn test_bytes_to_mb() {
        assert_eq!(bytes_to_mb(1_024_000), 1.02);
        assert_eq!(bytes_to_mb(0), 0.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Some(30)), "30s");
        assert_eq!(format_duration(Some(90)), "1m 30s");
        assert_eq!(format_duration(Some(3661)), "1h 1m 1s");
        assert_eq!(format_duration(Some(0)), "Unknown");
        assert_eq!(format_duration(None), "Unknown");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(75.9), "01:15");
        assert_eq!(format_timestamp(3725.0), "01:02:05");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("What is Rust? A/B test"), "What is Rust_ A_B test");
        assert_eq!(sanitize_filename("<<title>>"), "title");
        assert_eq!(sanitize_filename("a::b"), "a_b");
        assert_eq!(sanitize_filename(&"x".repeat(150)).len(), 100);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 500), "short");
    }
}
