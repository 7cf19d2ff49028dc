use super::frame_sampler::{FrameDecoder, FrameResult, create_frame_jobs, sample_frame};
use super::sample_spec::SampleSpec;
use crate::error::ThumbnailError;
use crate::tools::ProgressSink;
use image::RgbImage;
use log::{debug, error};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::path::Path;

/// 平行擷取一部影片的所有影格
///
/// 每部影片建立一個固定大小的執行緒池；執行緒數只是並行上限。
/// 任一影格失敗即放棄整部影片，回傳最先觀察到的錯誤，已完成的影格全部丟棄。
/// 回傳的影格依索引 0..N*N 排序，與完成順序無關。
pub fn extract_all(
    decoder: &dyn FrameDecoder,
    video_path: &Path,
    spec: &SampleSpec,
    worker_count: usize,
    progress: &dyn ProgressSink,
) -> Result<Vec<RgbImage>, ThumbnailError> {
    let jobs = create_frame_jobs(spec);
    let pool = ThreadPoolBuilder::new()
        .num_threads(worker_count.max(1))
        .thread_name(|i| format!("frame-worker-{i}"))
        .build()?;

    debug!(
        "擷取 {} 張影格，執行緒上限 {}: {}",
        jobs.len(),
        worker_count,
        video_path.display()
    );

    let mut results: Vec<FrameResult> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let result =
                    sample_frame(decoder, video_path, job, spec.cell_width, spec.cell_height);
                match &result {
                    Ok(_) => progress.advance(),
                    Err(e) => error!("影格擷取失敗 [{}]: {}", job.index, e),
                }
                result
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    results.sort_by_key(|r| r.index);
    if results.len() != spec.num_thumbnails
        || results.iter().enumerate().any(|(i, r)| r.index != i)
    {
        return Err(ThumbnailError::Layout(format!(
            "影格索引不連續: 預期 {} 張",
            spec.num_thumbnails
        )));
    }

    Ok(results.into_iter().map(|r| r.image).collect())
}
