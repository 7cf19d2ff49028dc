use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};

/// 擷取進度的接收端，每完成一個影格呼叫一次；只供顯示用
pub trait ProgressSink: Sync {
    fn advance(&self);
}

impl ProgressSink for ProgressBar {
    fn advance(&self) {
        self.inc(1);
    }
}

/// 不回報進度
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&self) {}
}

/// 只計數的進度接收端
#[derive(Debug, Default)]
pub struct ProgressCounter {
    completed: AtomicUsize,
}

impl ProgressCounter {
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl ProgressSink for ProgressCounter {
    fn advance(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// 單一影片的影格擷取進度條
#[must_use]
pub fn frame_progress_bar(total: u64, video_name: &str) -> ProgressBar {
    let progress_bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frame ({eta}) {msg}")
    {
        progress_bar.set_style(style.progress_chars("#>-"));
    }
    progress_bar.set_message(video_name.to_string());
    progress_bar
}
