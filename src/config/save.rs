use crate::config::types::Settings;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(settings).context("無法序列化設定")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("無法建立目錄: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("無法寫入設定檔: {}", path.display()))?;

    Ok(())
}
