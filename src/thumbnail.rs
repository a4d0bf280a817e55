use eframe::egui::ColorImage;

/// Standard high-quality thumbnail location for a YouTube video
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id)
}

/// Downloads and decodes the thumbnail of `video_id`. Any failure only
/// means there is no preview, so it is logged and swallowed.
pub async fn fetch_thumbnail(client: &reqwest::Client, video_id: &str) -> Option<ColorImage> {
    let url = thumbnail_url(video_id);
    let bytes = match client.get(&url).send().await.and_then(|r| r.error_for_status()) {
        Ok(resp) => match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(video_id, error = %e, "Thumbnail body unreadable");
                return None;
            }
        },
        Err(e) => {
            tracing::debug!(video_id, error = %e, "Thumbnail request failed");
            return None;
        }
    };
    decode_thumbnail(&bytes)
}

/// RGBA8 image for egui, without premultiplying alpha
pub fn decode_thumbnail(bytes: &[u8]) -> Option<ColorImage> {
    let img = image::load_from_memory(bytes).ok()?.to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, &img))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_hq_thumbnail_url() {
        assert_eq!(thumbnail_url("abc"), "https://img.youtube.com/vi/abc/hqdefault.jpg");
    }

    #[test]
    fn garbage_bytes_yield_no_image() {
        assert!(decode_thumbnail(b"not an image").is_none());
    }
}
