use clap::Parser;

use crate::model::MediaType;
use crate::youtube::watch_url;

/// Submit videos to the processing backend and follow the job.
#[derive(Debug, Parser)]
#[command(name = "yt_processor", version)]
pub struct Cli {
    /// Video URL to submit right away
    #[arg(long, conflicts_with = "video_id")]
    pub url: Option<String>,

    /// Bare YouTube video id; submitted as a watch URL
    #[arg(long)]
    pub video_id: Option<String>,

    /// Output format (defaults to audio for --video-id, video otherwise)
    #[arg(long, value_enum)]
    pub media_type: Option<MediaType>,

    /// Backend base URL, overrides VIDEO_API_URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Run without a window and log progress until the job ends
    #[arg(long)]
    pub headless: bool,
}

impl Cli {
    /// The submission implied by the flags, if any.
    pub fn initial_job(&self) -> Option<(String, MediaType)> {
        if let Some(url) = &self.url {
            return Some((url.clone(), self.media_type.unwrap_or_default()));
        }
        self.video_id
            .as_deref()
            .map(|id| (watch_url(id), self.media_type.unwrap_or(MediaType::Audio)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_defaults_to_audio() {
        let cli = Cli::parse_from(["yt_processor", "--video-id", "abc", "--headless"]);
        assert!(cli.headless);
        assert_eq!(
            cli.initial_job(),
            Some(("https://youtube.com/watch?v=abc".to_string(), MediaType::Audio))
        );
    }

    #[test]
    fn url_defaults_to_video() {
        let cli = Cli::parse_from(["yt_processor", "--url", "https://youtu.be/x"]);
        assert_eq!(
            cli.initial_job(),
            Some(("https://youtu.be/x".to_string(), MediaType::Video))
        );
    }

    #[test]
    fn explicit_media_type_wins() {
        let cli = Cli::parse_from(["yt_processor", "--video-id", "abc", "--media-type", "video"]);
        assert_eq!(cli.initial_job().map(|(_, m)| m), Some(MediaType::Video));
    }

    #[test]
    fn url_and_video_id_conflict() {
        assert!(Cli::try_parse_from(["yt_processor", "--url", "u", "--video-id", "v"]).is_err());
    }

    #[test]
    fn nothing_to_submit() {
        assert_eq!(Cli::parse_from(["yt_processor"]).initial_job(), None);
    }
}
