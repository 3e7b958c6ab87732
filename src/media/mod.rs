pub mod audio;
pub mod tracks;

pub use audio::{check_ffmpeg, extract_audio};
pub use tracks::{
    extract_subtitle_track, extract_subtitles, list_subtitle_tracks, parse_track_listing,
    track_output_path,
};

/// Container extensions treated as video input.
pub const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "webm"];

/// Case-insensitive check against [`VIDEO_EXTENSIONS`].
pub fn is_video_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
