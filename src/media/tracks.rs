use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::error::{Result, SubtoolError};

fn track_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Track ID (\d+): subtitles").expect("Invalid regex"))
}

/// Pull subtitle track ids out of `mkvmerge -i` output.
pub fn parse_track_listing(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter(|line| line.contains("subtitles"))
        .filter_map(|line| track_line_re().captures(line))
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

async fn run_mkvmerge_identify(video: &Path) -> Result<String> {
    let output = Command::new("mkvmerge")
        .arg("-i")
        .arg(video)
        .output()
        .await
        .map_err(|e| SubtoolError::ExternalTool(format!("Failed to run mkvmerge: {e}")))?;

    // mkvmerge exits 1 on warnings while still printing the listing.
    if !output.status.success() && output.stdout.is_empty() {
        return Err(SubtoolError::ExternalTool(format!(
            "mkvmerge failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// List subtitle track ids in a container. Failures are logged and yield no tracks.
pub async fn list_subtitle_tracks(video: &Path) -> Vec<String> {
    match run_mkvmerge_identify(video).await {
        Ok(listing) => {
            let tracks = parse_track_listing(&listing);
            debug!("Found {} subtitle tracks in {}", tracks.len(), video.display());
            tracks
        }
        Err(e) => {
            error!("Error extracting subtitle tracks: {}", e);
            Vec::new()
        }
    }
}

/// Destination for one extracted track: `{dir}/{name without last extension}_track{id}.srt`.
pub fn track_output_path(video: &Path, output_dir: &Path, track_id: &str) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}_track{}.srt", stem, track_id))
}

/// Extract one track with `mkvextract`.
pub async fn extract_subtitle_track(video: &Path, track_id: &str, destination: &Path) -> Result<()> {
    let status = Command::new("mkvextract")
        .arg(video)
        .arg("tracks")
        .arg(format!("{}:{}", track_id, destination.display()))
        .status()
        .await
        .map_err(|e| SubtoolError::ExternalTool(format!("Failed to run mkvextract: {e}")))?;

    if !status.success() {
        return Err(SubtoolError::ExternalTool(format!(
            "mkvextract failed for track {} ({})",
            track_id, status
        )));
    }
    Ok(())
}

/// Extract every subtitle track of `video` into `output_dir`.
pub async fn extract_subtitles(video: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(output_dir).await?;

    let tracks = list_subtitle_tracks(video).await;
    if tracks.is_empty() {
        info!("No subtitle tracks in {}", video.display());
    }

    let mut extracted = Vec::with_capacity(tracks.len());
    for track_id in tracks {
        let destination = track_output_path(video, output_dir, &track_id);
        match extract_subtitle_track(video, &track_id, &destination).await {
            Ok(()) => {
                info!("Extracted track {} to {}", track_id, destination.display());
                extracted.push(destination);
            }
            Err(e) => warn!("{}", e),
        }
    }

    Ok(extracted)
}
