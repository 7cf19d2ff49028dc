use super::extraction_scheduler::extract_all;
use super::frame_sampler::FrameDecoder;
use super::mosaic_assembler::assemble;
use super::record_builder::{build_record, unix_timestamp};
use super::sample_spec::SampleSpec;
use crate::config::Settings;
use crate::error::ThumbnailError;
use crate::tools::ThumbnailRecord;
use indicatif::ProgressBar;
use log::info;
use std::path::Path;

/// 單部影片的產生參數
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MosaicOptions {
    pub sample_interval: f64,
    pub worker_count: usize,
    pub cell_divisor: u32,
}

impl From<&Settings> for MosaicOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            sample_interval: settings.sample_interval,
            worker_count: settings.worker_count,
            cell_divisor: settings.cell_divisor,
        }
    }
}

impl Default for MosaicOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// 產生一部影片的預覽圖：計算規格 → 平行擷取 → 拼接 → 寫檔
///
/// 任何一步失敗都不會留下預覽圖檔案。`progress` 會被設為影格總數，每完成一格前進一步。
pub fn generate(
    decoder: &dyn FrameDecoder,
    video_path: &Path,
    output_dir: &Path,
    options: &MosaicOptions,
    progress: &ProgressBar,
) -> Result<ThumbnailRecord, ThumbnailError> {
    let source = decoder.open(video_path)?;
    let spec = SampleSpec::for_source(&source, options.sample_interval, options.cell_divisor)?;

    info!(
        "{}: {:.1}s, {}x{} -> {}x{} 網格，間隔 {:.2}s",
        video_path.display(),
        source.duration_seconds,
        source.width,
        source.height,
        spec.grid_side,
        spec.grid_side,
        spec.interval
    );

    progress.set_length(spec.num_thumbnails as u64);
    let frames = extract_all(decoder, video_path, &spec, options.worker_count, progress)?;
    let mosaic = assemble(&frames, spec.grid_side, spec.cell_width, spec.cell_height)?;

    build_record(&mosaic, video_path, output_dir, spec.grid_side, unix_timestamp())
}
