//! MIME type lookup from file extensions.

use std::path::Path;

/// Broad media category used to pick an image or video pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    /// Classify a path by its guessed MIME type.
    pub fn of(path: &Path) -> Self {
        match get_media_mimetype(path) {
            Some(mime) if mime.starts_with("image/") => Self::Image,
            Some(mime) if mime.starts_with("video/") => Self::Video,
            _ => Self::Other,
        }
    }
}

/// MIME type (e.g. `"image/png"`, `"video/mp4"`) for a path, or `None` when
/// the extension is missing or unknown. The file is never opened.
pub fn get_media_mimetype(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}
