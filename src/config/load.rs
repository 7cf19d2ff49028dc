use crate::config::types::{Config, SETTINGS_FILE_NAME, Settings};
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

impl Config {
    /// 載入設定檔；未指定路徑時使用工作目錄下的 `settings.json`
    pub fn new(settings_path: Option<&Path>) -> Result<Self> {
        let settings_path = settings_path.unwrap_or_else(|| Path::new(SETTINGS_FILE_NAME));
        let settings = Settings::load(settings_path)?;

        Ok(Self {
            settings,
            settings_path: settings_path.to_path_buf(),
        })
    }
}

impl Settings {
    /// 檔案不存在時回傳預設值
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取設定檔: {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("無法解析設定檔: {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sample_interval.is_finite() || self.sample_interval <= 0.0 {
            bail!("取樣間隔必須為正數: {}", self.sample_interval);
        }
        if self.worker_count == 0 {
            bail!("擷取執行緒數量必須大於 0");
        }
        if self.cell_divisor == 0 {
            bail!("縮圖縮放比例必須大於 0");
        }
        if self.video_extensions.is_empty() {
            bail!("至少需要一個影片副檔名");
        }
        Ok(())
    }
}
