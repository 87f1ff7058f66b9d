//! Source capability check: can the playback adapter handle these options?
//!
//! The MIME type is derived from the URL path extension when it has a known
//! one, otherwise from the `mimeType` option. Anything else is unplayable.

use url::Url;

use super::attrs::Attrs;
use super::keys::{K_MIME_TYPE, K_SOURCE_URL};

/// Path extension -> MIME type
const EXTENSION_MIME_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("m3u8", "application/vnd.apple.mpegurl"),
    ("ts", "video/mp2t"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
];

/// MIME types the pipeline can open
const PLAYABLE_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/x-m4v",
    "video/quicktime",
    "video/avi",
    "video/x-msvideo",
    "video/mp2t",
    "application/vnd.apple.mpegurl",
    "application/x-mpegurl",
    "audio/mpeg",
    "audio/mp4",
    "audio/aac",
];

/// MIME type implied by the URL's path extension, if it is a known one.
pub fn mime_type_for_url(raw: &str) -> Option<&'static str> {
    let url = Url::parse(raw).ok()?;
    let file_name = url.path_segments()?.next_back()?;
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    EXTENSION_MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

pub fn is_playable_mime_type(mime: &str) -> bool {
    let mime = mime.trim().to_ascii_lowercase();
    PLAYABLE_MIME_TYPES.iter().any(|known| *known == mime)
}

/// Check whether the source described by `options` can be played.
pub fn can_play(options: &Attrs) -> bool {
    let from_url = options.get_str(K_SOURCE_URL).and_then(mime_type_for_url);
    let mime = match from_url {
        Some(mime) => mime.to_string(),
        None => match options.get_str(K_MIME_TYPE) {
            Some(mime) => mime.to_string(),
            None => {
                log::debug!("can_play: no usable source url or mime type");
                return false;
            }
        },
    };
    is_playable_mime_type(&mime)
}
