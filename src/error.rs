//! 縮圖產生流程的錯誤型別
//!
//! 核心流程（取樣、平行擷取、拼接、寫檔、入庫）都回傳 [`ThumbnailError`]，
//! 讓批次層能區分錯誤種類；外層（設定、CLI）則使用 `anyhow`。

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// 取樣間隔不是有限的正數
    #[error("取樣間隔必須為正數: {0}")]
    InvalidInterval(f64),

    /// 影片長度不足一個取樣間隔，或解析度小到縮圖格為 0
    #[error("無法組成縮圖網格: {reason}")]
    DegenerateGrid { reason: String },

    /// 取樣時間點超出影片長度
    #[error("影格 {index} 的取樣時間 {timestamp:.3}s 超出影片長度 {duration:.3}s")]
    OutOfRange {
        index: usize,
        timestamp: f64,
        duration: f64,
    },

    /// 無法開啟或讀取影片資訊
    #[error("無法讀取影片資訊 {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    /// 無法解碼指定時間點的影格
    #[error("無法解碼影格 {path} @ {timestamp:.3}s: {reason}")]
    Decode {
        path: PathBuf,
        timestamp: f64,
        reason: String,
    },

    /// 影格數量或尺寸與網格不符
    #[error("影格與網格配置不符: {0}")]
    Layout(String),

    #[error("預覽圖編碼失敗: {0}")]
    Encode(#[from] image::ImageError),

    #[error("無法寫入預覽圖 {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 產生的檔名已存在（時間戳記使其幾乎不會發生）
    #[error("預覽圖檔名已存在: {0}")]
    DuplicateName(PathBuf),

    #[error("目錄資料庫錯誤: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("無法建立工作執行緒池: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
