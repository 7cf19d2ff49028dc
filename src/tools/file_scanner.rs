use crate::config::ExtensionSet;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

impl FileInfo {
    /// 副檔名（含前置點），沒有時為空字串
    #[must_use]
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }
}

/// 掃描結果：符合副檔名的檔案，以及被略過並需要回報的檔案
#[derive(Debug, Default)]
pub struct ScanResult {
    pub matched: Vec<FileInfo>,
    pub rejected: Vec<FileInfo>,
}

/// 掃描目錄下的檔案，依副檔名分類，按大小排序（由小到大）
///
/// 副檔名不符的檔案列入 `rejected`；隱藏檔（`.` 開頭）直接略過。
pub fn list_files(directory: &Path, extensions: &ExtensionSet) -> Result<ScanResult> {
    list_files_with_progress(directory, extensions, &ProgressBar::hidden())
}

pub fn list_files_with_progress(
    directory: &Path,
    extensions: &ExtensionSet,
    progress_bar: &ProgressBar,
) -> Result<ScanResult> {
    let mut result = ScanResult::default();

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
    {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let info = FileInfo {
            name: entry.file_name().to_string_lossy().to_string(),
            path: entry.into_path(),
            size: metadata.len(),
        };

        if info.name.starts_with('.') {
            continue;
        }
        if !extensions.matches(&info.path) {
            result.rejected.push(info);
            continue;
        }

        progress_bar.inc(1);
        result.matched.push(info);
    }

    result.matched.sort_by_key(|file| file.size);
    Ok(result)
}

/// 掃描用的 spinner
#[must_use]
pub fn discovery_progress_bar(directory: &Path) -> ProgressBar {
    let progress_bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {pos} 個檔案 {msg}")
    {
        progress_bar.set_style(style);
    }
    progress_bar.set_message(format!("掃描 {} 中...", directory.display()));
    progress_bar
}
