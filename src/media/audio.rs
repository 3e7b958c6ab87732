use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, SubtoolError};

/// Extracted audio is mono 16-bit PCM at 16 kHz, the format Whisper works on.
pub const SAMPLE_RATE: u32 = 16_000;
pub const CHANNELS: u16 = 1;
const BYTES_PER_SAMPLE: u64 = 2;
const WAV_HEADER_SIZE: u64 = 44;

/// PCM payload bytes per second of extracted audio.
pub const BYTES_PER_SECOND: u64 = SAMPLE_RATE as u64 * CHANNELS as u64 * BYTES_PER_SAMPLE;

/// Check if FFmpeg is installed and accessible.
pub async fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await
        .map_err(|e| {
            SubtoolError::ExternalTool(format!(
                "FFmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(SubtoolError::ExternalTool("FFmpeg check failed".to_string()));
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Size of a WAV file holding `duration` of extracted audio.
pub fn estimate_wav_size(duration: Duration) -> u64 {
    let samples = (duration.as_secs_f64() * SAMPLE_RATE as f64) as u64;
    WAV_HEADER_SIZE + samples * BYTES_PER_SAMPLE * CHANNELS as u64
}

/// Duration of an extracted WAV file, from its size on disk.
pub fn wav_duration(file_size: u64) -> Duration {
    let payload = file_size.saturating_sub(WAV_HEADER_SIZE);
    Duration::from_secs_f64(payload as f64 / BYTES_PER_SECOND as f64)
}

/// Split `total` into consecutive `(start, end)` windows of at most `max` each.
pub fn plan_segments(total: Duration, max: Duration) -> Vec<(Duration, Duration)> {
    let mut segments = Vec::new();
    if max.is_zero() {
        return segments;
    }

    let mut current = Duration::ZERO;
    while current < total {
        let end = (current + max).min(total);
        segments.push((current, end));
        current = end;
    }
    segments
}

fn pcm_args() -> [String; 7] {
    [
        "-vn".to_string(),
        "-acodec".to_string(),
        "pcm_s16le".to_string(),
        "-ar".to_string(),
        SAMPLE_RATE.to_string(),
        "-ac".to_string(),
        CHANNELS.to_string(),
    ]
}

fn extract_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];
    args.extend(pcm_args().into_iter().map(OsString::from));
    args.push(output.into());
    args
}

fn segment_args(input: &Path, output: &Path, start: Duration, end: Duration) -> Vec<OsString> {
    let length = end.saturating_sub(start);
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-ss".into(),
        format!("{:.3}", start.as_secs_f64()).into(),
        "-t".into(),
        format!("{:.3}", length.as_secs_f64()).into(),
        "-i".into(),
        input.into(),
    ];
    args.extend(pcm_args().into_iter().map(OsString::from));
    args.push(output.into());
    args
}

async fn run_ffmpeg(args: Vec<OsString>, output: &Path, what: &str) -> Result<()> {
    let result = Command::new("ffmpeg")
        .args(args)
        .stdout(Stdio::null())
        .output()
        .await
        .map_err(|e| SubtoolError::ExternalTool(format!("Failed to run FFmpeg: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(SubtoolError::ExternalTool(format!(
            "FFmpeg {} failed: {}",
            what,
            stderr.lines().last().unwrap_or("unknown error")
        )));
    }

    if !output.exists() {
        return Err(SubtoolError::ExternalTool(
            "Output file was not created".to_string(),
        ));
    }
    Ok(())
}

/// Extract the audio track of `input` to a mono 16 kHz 16-bit PCM WAV.
pub async fn extract_audio(input: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        return Err(SubtoolError::FileNotFound(input.display().to_string()));
    }

    check_ffmpeg().await?;
    info!("Extracting audio from {}", input.display());

    run_ffmpeg(extract_args(input, output), output, "audio extraction").await?;

    debug!("Audio extracted to {}", output.display());
    Ok(())
}

/// Cut `[start, end)` of `input` into its own WAV in the same format.
pub async fn extract_audio_segment(
    input: &Path,
    output: &Path,
    start: Duration,
    end: Duration,
) -> Result<()> {
    if !input.exists() {
        return Err(SubtoolError::FileNotFound(input.display().to_string()));
    }
    if end <= start {
        return Err(SubtoolError::ExternalTool(
            "Segment duration is zero".to_string(),
        ));
    }

    debug!(
        "Extracting segment {:.3}s..{:.3}s of {}",
        start.as_secs_f64(),
        end.as_secs_f64(),
        input.display()
    );
    run_ffmpeg(segment_args(input, output, start, end), output, "segment extraction").await
}
