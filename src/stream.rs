//! FFmpeg launcher for live camera streams.
//!
//! The stream URL is remuxed into a rolling HLS playlist. The child is
//! started detached and never waited on.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Where and how ffmpeg is run.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSettings {
    /// Program name or path.
    pub ffmpeg: String,
    pub output_dir: PathBuf,
    pub playlist: String,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            output_dir: PathBuf::from("video_dir"),
            playlist: "video.m3u8".to_string(),
        }
    }
}

/// Errors that can occur while launching ffmpeg.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("FFmpeg not found ('{0}'). Install ffmpeg or set [stream] ffmpeg in the config file")]
    FfmpegNotFound(String),

    #[error("Failed to spawn FFmpeg: {0}")]
    SpawnFailed(std::io::Error),

    #[error("Failed to create output directory '{}': {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub struct StreamLauncher {
    settings: StreamSettings,
}

impl StreamLauncher {
    pub fn new(settings: StreamSettings) -> Self {
        Self { settings }
    }

    pub fn playlist_path(&self) -> PathBuf {
        self.settings.output_dir.join(&self.settings.playlist)
    }

    /// Arguments passed to ffmpeg for `url` (excluding the program itself).
    pub fn ffmpeg_args(&self, url: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "-i",
            url,
            "-fflags",
            "flush_packets",
            "-max_delay",
            "2",
            "-flags",
            "-global_header",
            "-hls_time",
            "2",
            "-hls_list_size",
            "3",
            "-vcodec",
            "copy",
            "-y",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(self.playlist_path().to_string_lossy().into_owned());
        args
    }

    /// Start ffmpeg against `url` and return its pid.
    ///
    /// The output directory is created first; an existing one is fine.
    pub fn launch(&self, url: &str) -> Result<u32, StreamError> {
        ensure_dir(&self.settings.output_dir)?;

        let child = Command::new(&self.settings.ffmpeg)
            .args(self.ffmpeg_args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StreamError::FfmpegNotFound(self.settings.ffmpeg.clone())
                } else {
                    StreamError::SpawnFailed(e)
                }
            })?;

        log::info!(
            "ffmpeg started (pid {}) writing {}",
            child.id(),
            self.playlist_path().display()
        );
        Ok(child.id())
    }
}

fn ensure_dir(path: &Path) -> Result<(), StreamError> {
    std::fs::create_dir_all(path).map_err(|e| StreamError::OutputDir {
        path: path.to_path_buf(),
        source: e,
    })
}
