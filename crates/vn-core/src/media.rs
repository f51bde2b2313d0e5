//! Canonical output format constants.

/// MIME type of every transcoded video.
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

/// File extension (without dot) of every transcoded video.
pub const VIDEO_EXTENSION: &str = "mp4";

/// MIME type of extracted preview thumbnails.
pub const THUMBNAIL_MIME_TYPE: &str = "image/jpeg";

/// File extension (without dot) of extracted preview thumbnails.
pub const THUMBNAIL_EXTENSION: &str = "jpg";

/// Replace the extension of `original` with the canonical container
/// extension.
///
/// Only the final component of `original` is used, so client-supplied
/// directory parts never leak into the result. Everything from the last
/// dot on is the extension, so a dot-file such as `.mov` keeps no stem.
/// Names without a dot get the extension appended and an empty name falls
/// back to `video`.
///
/// ```
/// assert_eq!(vn_core::canonical_video_filename("clip.mov"), "clip.mp4");
/// assert_eq!(vn_core::canonical_video_filename("holiday.final.MKV"), "holiday.final.mp4");
/// assert_eq!(vn_core::canonical_video_filename("raw"), "raw.mp4");
/// assert_eq!(vn_core::canonical_video_filename(".mov"), ".mp4");
/// ```
pub fn canonical_video_filename(original: &str) -> String {
    let name = base_name(original);
    if name.is_empty() {
        return format!("video.{VIDEO_EXTENSION}");
    }
    let stem = match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    };
    format!("{stem}.{VIDEO_EXTENSION}")
}

/// Final path component of a client-supplied filename, accepting both `/`
/// and `\` separators.
pub fn base_name(original: &str) -> &str {
    original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim()
}
