//! Pipeline input and output values.

use vn_core::{THUMBNAIL_MIME_TYPE, VIDEO_MIME_TYPE};

/// An uploaded blob and the filename the client gave it.
#[derive(Debug, Clone)]
pub struct RawMediaInput {
    pub bytes: Vec<u8>,
    pub original_filename: String,
}

impl RawMediaInput {
    pub fn new(bytes: Vec<u8>, original_filename: impl Into<String>) -> Self {
        Self {
            bytes,
            original_filename: original_filename.into(),
        }
    }
}

/// A preview still extracted from the transcoded video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailImage {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl ThumbnailImage {
    pub fn mime_type(&self) -> &'static str {
        THUMBNAIL_MIME_TYPE
    }
}

/// Result of a successful pipeline run.
///
/// The video triple is always present. The thumbnail is held as a single
/// optional value so its bytes and filename exist together or not at all.
#[derive(Debug, Clone)]
pub struct ProcessedVideoArtifact {
    pub video_bytes: Vec<u8>,
    pub video_filename: String,
    pub video_mime_type: &'static str,
    pub thumbnail: Option<ThumbnailImage>,
}

impl ProcessedVideoArtifact {
    pub fn new(video_bytes: Vec<u8>, video_filename: String) -> Self {
        Self {
            video_bytes,
            video_filename,
            video_mime_type: VIDEO_MIME_TYPE,
            thumbnail: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: Option<ThumbnailImage>) -> Self {
        self.thumbnail = thumbnail;
        self
    }

    pub fn thumbnail_bytes(&self) -> Option<&[u8]> {
        self.thumbnail.as_ref().map(|t| t.bytes.as_slice())
    }

    pub fn thumbnail_filename(&self) -> Option<&str> {
        self.thumbnail.as_ref().map(|t| t.filename.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_only() {
        let a = ProcessedVideoArtifact::new(vec![1, 2, 3], "clip.mp4".into());
        assert_eq!(a.video_mime_type, "video/mp4");
        assert!(a.thumbnail_bytes().is_none());
        assert!(a.thumbnail_filename().is_none());
    }

    #[test]
    fn thumbnail_fields_travel_together() {
        let a = ProcessedVideoArtifact::new(vec![1], "clip.mp4".into()).with_thumbnail(Some(
            ThumbnailImage {
                bytes: vec![0xff, 0xd8],
                filename: "thumb-1700000000000.jpg".into(),
            },
        ));
        assert_eq!(a.thumbnail_bytes(), Some(&[0xff, 0xd8][..]));
        assert_eq!(a.thumbnail_filename(), Some("thumb-1700000000000.jpg"));
        assert_eq!(a.thumbnail.as_ref().unwrap().mime_type(), "image/jpeg");
    }
}
