use super::frame_sampler::{FfmpegDecoder, FrameDecoder};
use super::pipeline::{MosaicOptions, generate};
use super::record_builder::video_file_name;
use crate::config::{ExtensionSet, Settings};
use crate::tools::{
    CatalogStore, FileInfo, GeneratedIndex, discovery_progress_bar, ensure_directory_exists,
    frame_progress_bar, list_files_with_progress, validate_directory_exists,
};
use anyhow::{Context, Result};
use console::style;
use indicatif::ProgressBar;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// 單部影片失敗的紀錄
#[derive(Debug, Clone)]
pub struct FailedVideo {
    pub path: PathBuf,
    pub message: String,
}

/// 批次產生結果
#[derive(Debug, Default)]
pub struct GenerationResult {
    /// 掃描到的影片數量
    pub discovered: usize,
    /// 實際處理（成功、跳過或失敗）的影片數量
    pub total_videos: usize,
    pub successful: usize,
    pub skipped: usize,
    pub failures: Vec<FailedVideo>,
    /// 本次新增的預覽圖檔名
    pub generated: Vec<String>,
    /// 是否因中斷訊號提前結束
    pub interrupted: bool,
}

impl GenerationResult {
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// 預覽圖目錄產生器
///
/// 流程：
/// A. 掃描影片資料夾與既有預覽圖
/// B. 略過已產生過預覽圖的影片
/// C. 逐部影片產生預覽圖（影片內平行擷取，影片之間依序處理）
/// D. 寫入目錄資料庫
pub struct ThumbnailCatalogGenerator {
    settings: Settings,
    decoder: Box<dyn FrameDecoder>,
    shutdown_signal: Arc<AtomicBool>,
    show_progress: bool,
}

impl ThumbnailCatalogGenerator {
    #[must_use]
    pub fn new(settings: Settings, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self::with_decoder(settings, shutdown_signal, Box::new(FfmpegDecoder))
    }

    #[must_use]
    pub fn with_decoder(
        settings: Settings,
        shutdown_signal: Arc<AtomicBool>,
        decoder: Box<dyn FrameDecoder>,
    ) -> Self {
        Self {
            settings,
            decoder,
            shutdown_signal,
            show_progress: true,
        }
    }

    #[must_use]
    pub const fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn run(
        &self,
        source_dir: &Path,
        output_dir: &Path,
        catalog: &mut dyn CatalogStore,
    ) -> Result<GenerationResult> {
        println!("{}", style("=== 影片預覽圖產生 ===").cyan().bold());

        validate_directory_exists(source_dir)?;
        ensure_directory_exists(output_dir)?;

        let videos = self.discover(source_dir, &self.settings.video_extension_set())?;
        let existing = self.discover(output_dir, &self.settings.thumbnail_extension_set())?;
        let generated_index =
            GeneratedIndex::from_file_names(existing.iter().map(|file| file.name.as_str()))
                .context("無法建立預覽圖檔名索引")?;

        if videos.is_empty() {
            println!("{}", style("找不到任何影片檔案").yellow());
        }

        let result = self.process_videos(&videos, output_dir, generated_index, catalog);
        self.print_summary(&result);

        Ok(result)
    }

    fn discover(
        &self,
        directory: &Path,
        extensions: &ExtensionSet,
    ) -> Result<Vec<FileInfo>> {
        let progress_bar = if self.show_progress {
            discovery_progress_bar(directory)
        } else {
            ProgressBar::hidden()
        };

        let scan = list_files_with_progress(directory, extensions, &progress_bar)
            .with_context(|| format!("無法掃描資料夾: {}", directory.display()))?;
        progress_bar.finish_and_clear();

        println!(
            "{}",
            style(format!(
                "{} 中找到 {} 個檔案",
                directory.display(),
                scan.matched.len()
            ))
            .green()
        );
        for file in &scan.rejected {
            println!(
                "{}",
                style(format!(
                    "{} {} ({}) 不是可處理的檔案類型",
                    file.name,
                    file.path.display(),
                    file.extension()
                ))
                .red()
            );
        }

        Ok(scan.matched)
    }

    fn process_videos(
        &self,
        videos: &[FileInfo],
        output_dir: &Path,
        mut generated_index: GeneratedIndex,
        catalog: &mut dyn CatalogStore,
    ) -> GenerationResult {
        let mut result = GenerationResult {
            discovered: videos.len(),
            ..GenerationResult::default()
        };
        let options = MosaicOptions::from(&self.settings);
        let start_time = Instant::now();

        for (index, video) in videos.iter().enumerate() {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，停止處理");
                result.interrupted = true;
                break;
            }

            result.total_videos += 1;

            println!("{}", style("-".repeat(46)).cyan());

            let video_name = video_file_name(&video.path);
            if generated_index.contains(&video_name) {
                println!("{}", style(format!("{video_name} 已產生過預覽圖，跳過")).magenta());
                result.skipped += 1;
                continue;
            }

            match self.process_single_video(&video.path, output_dir, &options, catalog) {
                Ok(generated_name) => {
                    println!(
                        "{} {} 完成! {}/{}\t經過時間: {:.1?}",
                        style("✓").green(),
                        video.path.display(),
                        index + 1,
                        videos.len(),
                        start_time.elapsed()
                    );
                    generated_index.insert(&video_name);
                    result.generated.push(generated_name);
                    result.successful += 1;
                }
                Err(e) => {
                    error!("處理影片失敗 {}: {e:#}", video.path.display());
                    println!(
                        "{} {} 錯誤: {}",
                        style("✗").red(),
                        video.path.display(),
                        style(format!("{e:#}").replace('\n', "\t")).red()
                    );
                    result.failures.push(FailedVideo {
                        path: video.path.clone(),
                        message: format!("{e:#}"),
                    });
                }
            }
        }

        result
    }

    /// 產生並入庫；入庫失敗時刪除剛寫出的預覽圖，避免下次被誤判為已產生
    fn process_single_video(
        &self,
        video_path: &Path,
        output_dir: &Path,
        options: &MosaicOptions,
        catalog: &mut dyn CatalogStore,
    ) -> Result<String> {
        let progress_bar = if self.show_progress {
            frame_progress_bar(0, &video_file_name(video_path))
        } else {
            ProgressBar::hidden()
        };

        let generated = generate(
            self.decoder.as_ref(),
            video_path,
            output_dir,
            options,
            &progress_bar,
        );
        progress_bar.finish_and_clear();
        let record = generated?;

        println!("{}", style("寫入資料庫中...").yellow());
        if let Err(e) = catalog.insert_thumbnail_record(&record) {
            if let Err(remove_err) = fs::remove_file(&record.storage_path) {
                warn!(
                    "無法刪除未入庫的預覽圖 {}: {}",
                    record.storage_path.display(),
                    remove_err
                );
            }
            return Err(e).context("寫入目錄資料庫失敗");
        }

        info!("預覽圖已建立: {}", record.storage_path.display());
        Ok(record.generated_name)
    }

    fn print_summary(&self, result: &GenerationResult) {
        println!("{}", style("=".repeat(51)).cyan());
        println!("摘要:");
        println!(
            "{} {} / {}",
            style("成功:").green(),
            result.successful,
            result.total_videos
        );
        if result.interrupted {
            println!(
                "{} 已處理 {} / {} 部影片",
                style("已中斷:").yellow(),
                result.total_videos,
                result.discovered
            );
        }

        if result.skipped > 0 {
            println!("{} {}", style("跳過:").yellow(), result.skipped);
        }

        println!("{} {}", style("失敗:").red(), result.failed());
        for failure in &result.failures {
            println!(
                "{} {}",
                style(failure.path.display()).yellow(),
                style(failure.message.replace('\n', "\t")).red()
            );
        }
        println!("{}", style("=".repeat(51)).cyan());

        info!(
            "預覽圖產生完成 - 成功: {}, 跳過: {}, 失敗: {}",
            result.successful,
            result.skipped,
            result.failed()
        );
    }
}
