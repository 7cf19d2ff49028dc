use super::sample_spec::SampleSpec;
use crate::error::ThumbnailError;
use crate::tools::{VideoSource, probe_video};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbImage};
use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};

/// 兩段式 seek 的前置緩衝時間（秒）
const SEEK_MARGIN: f64 = 2.0;

/// 所有影格共用的縮放濾鏡，避免格與格之間出現接縫
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// 影格解碼器
///
/// 每次呼叫都必須自行開啟、釋放解碼資源，不得在呼叫之間共享可變狀態，
/// 因此同一個解碼器可以被多個工作執行緒同時使用。
pub trait FrameDecoder: Sync {
    /// 開啟影片並讀取長度與解析度
    fn open(&self, path: &Path) -> Result<VideoSource, ThumbnailError>;

    /// 解碼指定時間點的影格（原始解析度）
    fn decode_frame(&self, source: &VideoSource, timestamp: f64)
    -> Result<RgbImage, ThumbnailError>;
}

/// 單一格的擷取任務
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameJob {
    pub index: usize,
    pub timestamp: f64,
}

/// 擷取完成、已縮放到格子尺寸的影格
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub index: usize,
    pub image: RgbImage,
}

#[must_use]
pub fn create_frame_jobs(spec: &SampleSpec) -> Vec<FrameJob> {
    (0..spec.num_thumbnails)
        .map(|index| FrameJob {
            index,
            timestamp: spec.timestamp(index),
        })
        .collect()
}

/// 擷取單一影格：開啟新的解碼資源、檢查時間範圍、解碼並縮放
pub fn sample_frame(
    decoder: &dyn FrameDecoder,
    video_path: &Path,
    job: &FrameJob,
    cell_width: u32,
    cell_height: u32,
) -> Result<FrameResult, ThumbnailError> {
    let source = decoder.open(video_path)?;

    if job.timestamp > source.duration_seconds {
        return Err(ThumbnailError::OutOfRange {
            index: job.index,
            timestamp: job.timestamp,
            duration: source.duration_seconds,
        });
    }

    let frame = decoder.decode_frame(&source, job.timestamp)?;
    let image = if frame.dimensions() == (cell_width, cell_height) {
        frame
    } else {
        imageops::resize(&frame, cell_width, cell_height, RESIZE_FILTER)
    };

    debug!(
        "影格 {} 完成: {:.2}s -> {}x{}",
        job.index, job.timestamp, cell_width, cell_height
    );

    Ok(FrameResult {
        index: job.index,
        image,
    })
}

/// 透過 ffprobe / ffmpeg 指令解碼，每次解碼都啟動獨立的 ffmpeg 程序
#[derive(Debug, Clone, Default)]
pub struct FfmpegDecoder;

impl FrameDecoder for FfmpegDecoder {
    fn open(&self, path: &Path) -> Result<VideoSource, ThumbnailError> {
        probe_video(path)
    }

    fn decode_frame(
        &self,
        source: &VideoSource,
        timestamp: f64,
    ) -> Result<RgbImage, ThumbnailError> {
        run_frame_command(build_frame_command(&source.path, timestamp), source, timestamp)
    }
}

/// 執行解碼指令並讀回 PNG 影格
///
/// `output()` 同時讀取 stdout 與 stderr，ffmpeg 大量輸出錯誤訊息時也不會卡住。
fn run_frame_command(
    mut command: Command,
    source: &VideoSource,
    timestamp: f64,
) -> Result<RgbImage, ThumbnailError> {
    let decode_error = |reason: String| ThumbnailError::Decode {
        path: source.path.clone(),
        timestamp,
        reason,
    };

    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|e| decode_error(format!("無法執行 ffmpeg: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(decode_error(format!("ffmpeg 解碼失敗: {}", last_lines(&stderr, 5))));
    }
    if output.stdout.is_empty() {
        return Err(decode_error("ffmpeg 沒有輸出任何影格".to_string()));
    }
    if !output.stderr.is_empty() {
        debug!(
            "ffmpeg 警告 {} @ {:.3}s: {}",
            source.path.display(),
            timestamp,
            last_lines(&String::from_utf8_lossy(&output.stderr), 1)
        );
    }

    image::load_from_memory_with_format(&output.stdout, ImageFormat::Png)
        .map(|frame| frame.to_rgb8())
        .map_err(|e| decode_error(format!("無法解析影格資料: {e}")))
}

/// 只保留最後幾行，避免錯誤訊息過長
fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    lines[lines.len().saturating_sub(count)..].join("\t")
}

/// 建立擷取單張影格的 ffmpeg 指令，影格以 PNG 輸出到 stdout
///
/// 兩段式 seek：
/// 1. `-ss` 在 `-i` 前：快速跳轉到最近的關鍵幀
/// 2. `-ss` 在 `-i` 後：精準解碼到目標時間點
fn build_frame_command(video_path: &Path, timestamp: f64) -> Command {
    let t0 = (timestamp - SEEK_MARGIN).max(0.0);
    let delta = timestamp - t0;

    let mut command = Command::new("ffmpeg");
    command.args(["-hide_banner", "-nostdin", "-loglevel", "error"]);

    if t0 > 0.0 {
        command.arg("-ss").arg(format!("{t0:.3}"));
    }

    command.arg("-i").arg(video_path);

    if delta > 0.0 {
        command.arg("-ss").arg(format!("{delta:.3}"));
    }

    command.args([
        "-frames:v",
        "1",
        "-an",
        "-sn",
        "-dn",
        "-threads",
        "1",
        "-f",
        "image2pipe",
        "-c:v",
        "png",
        "-",
    ]);

    command
}
