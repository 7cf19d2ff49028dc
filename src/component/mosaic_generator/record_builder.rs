use crate::error::ThumbnailError;
use crate::tools::{ThumbnailName, ThumbnailRecord, digest_file};
use image::{ImageFormat, RgbImage};
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

#[must_use]
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// 影片檔名（含副檔名），作為預覽圖檔名與「已產生」比對的鍵
#[must_use]
pub fn video_file_name(video_path: &Path) -> String {
    video_path.file_name().map_or_else(
        || video_path.to_string_lossy().to_string(),
        |name| name.to_string_lossy().to_string(),
    )
}

/// 寫出預覽圖並建立目錄紀錄
///
/// 檔案以獨佔方式建立，大小與雜湊在寫入完成後從磁碟重新讀取計算。
pub fn build_record(
    mosaic: &RgbImage,
    source_video: &Path,
    output_dir: &Path,
    grid_side: u32,
    generated_at: u64,
) -> Result<ThumbnailRecord, ThumbnailError> {
    let generated_name =
        ThumbnailName::new(&video_file_name(source_video), grid_side, generated_at).file_name();
    let storage_path = output_dir.join(&generated_name);

    let mut encoded = Vec::new();
    mosaic.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)?;

    info!("儲存預覽圖: {}", storage_path.display());
    write_exclusive(&storage_path, &encoded)?;

    let digest = digest_file(&storage_path).map_err(|source| ThumbnailError::Write {
        path: storage_path.clone(),
        source,
    })?;
    debug!(
        "預覽圖已寫入: {} ({} bytes, {})",
        storage_path.display(),
        digest.size_bytes,
        digest.content_hash
    );

    Ok(ThumbnailRecord {
        source_filename: source_video.to_string_lossy().to_string(),
        generated_name,
        storage_path,
        size_bytes: digest.size_bytes,
        content_hash: digest.content_hash,
        raw_bytes: mosaic.as_raw().clone(),
        total_count: grid_side * grid_side,
        row_count: grid_side,
        col_count: grid_side,
        total_width_px: mosaic.width(),
        total_height_px: mosaic.height(),
    })
}

fn write_exclusive(path: &Path, data: &[u8]) -> Result<(), ThumbnailError> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ThumbnailError::DuplicateName(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ThumbnailError::Write {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if let Err(source) = file.write_all(data).and_then(|()| file.sync_all()) {
        drop(file);
        // 不留下寫到一半的檔案
        let _ = fs::remove_file(path);
        return Err(ThumbnailError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}
