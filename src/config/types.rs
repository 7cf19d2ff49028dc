use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 預設取樣間隔（秒）
pub const DEFAULT_SAMPLE_INTERVAL: f64 = 10.0;
/// 每部影片的擷取執行緒上限
pub const DEFAULT_WORKER_COUNT: usize = 12;
/// 縮圖格尺寸 = 原始影格尺寸 / 此值
pub const DEFAULT_CELL_DIVISOR: u32 = 10;
pub const DEFAULT_CATALOG_PATH: &str = "thumbnail.db";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

fn default_video_extensions() -> Vec<String> {
    [".mp4", ".mkv", ".mov", ".avi", ".webm", ".m4v", ".wmv", ".flv"]
        .iter()
        .map(|ext| (*ext).to_string())
        .collect()
}

fn default_thumbnail_extensions() -> Vec<String> {
    vec![".png".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 期望的取樣間隔（秒），實際間隔會依網格大小重新計算
    pub sample_interval: f64,
    pub worker_count: usize,
    pub cell_divisor: u32,
    pub catalog_path: PathBuf,
    pub video_extensions: Vec<String>,
    pub thumbnail_extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            worker_count: DEFAULT_WORKER_COUNT,
            cell_divisor: DEFAULT_CELL_DIVISOR,
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            video_extensions: default_video_extensions(),
            thumbnail_extensions: default_thumbnail_extensions(),
        }
    }
}

/// 以小寫、含前置點的副檔名集合做比對
#[derive(Debug, Clone, Default)]
pub struct ExtensionSet {
    extensions: HashSet<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().trim().to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        Self { extensions }
    }

    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .contains(&format!(".{}", ext.to_lowercase()))
            })
    }
}

impl Settings {
    #[must_use]
    pub fn video_extension_set(&self) -> ExtensionSet {
        ExtensionSet::new(&self.video_extensions)
    }

    #[must_use]
    pub fn thumbnail_extension_set(&self) -> ExtensionSet {
        ExtensionSet::new(&self.thumbnail_extensions)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    /// 設定檔來源路徑（可能不存在）
    pub settings_path: PathBuf,
}
