/// Extracts the video id from the common YouTube URL shapes:
/// `watch?v=ID`, `youtu.be/ID` and `/shorts/ID`.
pub fn extract_video_id(url: &str) -> Option<String> {
    let rest = if let Some(idx) = url.find("v=") {
        &url[idx + 2..]
    } else if let Some(idx) = url.find("youtu.be/") {
        &url[idx + "youtu.be/".len()..]
    } else if let Some(idx) = url.find("/shorts/") {
        &url[idx + "/shorts/".len()..]
    } else {
        return None;
    };

    rest.split(['&', '?', '#', '/'])
        .next()
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
}

/// Watch URL for a bare video id, as used by auto-processing
pub fn watch_url(video_id: &str) -> String {
    format!("https://youtube.com/watch?v={}", video_id.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_urls() {
        assert_eq!(
            extract_video_id("https://youtube.com/watch?v=abc&t=10s").as_deref(),
            Some("abc")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn short_and_shorts_urls() {
        assert_eq!(extract_video_id("https://youtu.be/xyz?si=1").as_deref(), Some("xyz"));
        assert_eq!(
            extract_video_id("https://youtube.com/shorts/q1w2e3").as_deref(),
            Some("q1w2e3")
        );
    }

    #[test]
    fn non_youtube_urls() {
        assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
        assert_eq!(extract_video_id("https://youtube.com/watch?v="), None);
    }

    #[test]
    fn watch_url_round_trips_the_id() {
        let url = watch_url("abc");
        assert_eq!(url, "https://youtube.com/watch?v=abc");
        assert_eq!(extract_video_id(&url).as_deref(), Some("abc"));
    }
}
