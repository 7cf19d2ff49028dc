use crate::error::ThumbnailError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 已開啟的影片來源：長度與影格尺寸
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSource {
    pub path: PathBuf,
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得影片長度與解析度
pub fn probe_video(path: &Path) -> Result<VideoSource, ThumbnailError> {
    let probe_error = |reason: String| ThumbnailError::Probe {
        path: path.to_path_buf(),
        reason,
    };

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| probe_error(format!("無法執行 ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(probe_error(format!("ffprobe 執行失敗: {}", stderr.trim())));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let (duration_seconds, width, height) = parse_probe_output(&stdout).map_err(probe_error)?;

    Ok(VideoSource {
        path: path.to_path_buf(),
        duration_seconds,
        width,
        height,
    })
}

/// 解析 ffprobe JSON，回傳 (長度秒數, 寬, 高)
fn parse_probe_output(json: &str) -> Result<(f64, u32, u32), String> {
    let probe: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| format!("無法解析 ffprobe 輸出: {e}"))?;

    let video_stream = probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })
        .ok_or_else(|| "找不到視訊串流".to_string())?;

    let width = video_stream.width.ok_or_else(|| "無法取得影片寬度".to_string())?;
    let height = video_stream
        .height
        .ok_or_else(|| "無法取得影片高度".to_string())?;

    // 優先使用 format 的長度，其次使用串流長度
    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or(video_stream.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| "無法取得影片長度".to_string())?;

    Ok((duration_seconds, width, height))
}
