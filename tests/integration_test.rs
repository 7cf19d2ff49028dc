//! 整合測試 - 以合成解碼器驗證完整流程（不需要 ffmpeg）

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::{Rgb, RgbImage};
use indicatif::ProgressBar;
use tempfile::TempDir;
use video_mosaic_catalog::ThumbnailError;
use video_mosaic_catalog::component::mosaic_generator::{
    FrameDecoder, MosaicOptions, ThumbnailCatalogGenerator, cell_origin, generate,
};
use video_mosaic_catalog::config::Settings;
use video_mosaic_catalog::tools::{
    CatalogStore, SqliteCatalog, ThumbnailRecord, VideoSource, content_hash,
};

const FRAME_WIDTH: u32 = 200;
const FRAME_HEIGHT: u32 = 100;

/// 合成影片：每個時間點輸出一種純色影格
struct SyntheticVideo {
    duration: f64,
    fail_at_timestamp: Option<f64>,
}

#[derive(Default)]
struct SyntheticDecoder {
    videos: HashMap<String, SyntheticVideo>,
    opens: Mutex<HashMap<String, usize>>,
    decodes: AtomicUsize,
}

impl SyntheticDecoder {
    fn with_video(mut self, name: &str, duration: f64) -> Self {
        self.videos.insert(
            name.to_string(),
            SyntheticVideo {
                duration,
                fail_at_timestamp: None,
            },
        );
        self
    }

    fn with_failing_video(mut self, name: &str, duration: f64, fail_at: f64) -> Self {
        self.videos.insert(
            name.to_string(),
            SyntheticVideo {
                duration,
                fail_at_timestamp: Some(fail_at),
            },
        );
        self
    }

    fn opens_for(&self, name: &str) -> usize {
        self.opens.lock().unwrap().get(name).copied().unwrap_or(0)
    }
}

fn color_at(timestamp: f64) -> Rgb<u8> {
    Rgb([timestamp as u8, 255 - timestamp as u8, 77])
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

impl FrameDecoder for SyntheticDecoder {
    fn open(&self, path: &Path) -> Result<VideoSource, ThumbnailError> {
        let name = file_name(path);
        *self.opens.lock().unwrap().entry(name.clone()).or_default() += 1;

        let video = self.videos.get(&name).ok_or_else(|| ThumbnailError::Probe {
            path: path.to_path_buf(),
            reason: "unknown synthetic video".to_string(),
        })?;

        Ok(VideoSource {
            path: path.to_path_buf(),
            duration_seconds: video.duration,
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
        })
    }

    fn decode_frame(
        &self,
        source: &VideoSource,
        timestamp: f64,
    ) -> Result<RgbImage, ThumbnailError> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        let video = &self.videos[&file_name(&source.path)];

        if video
            .fail_at_timestamp
            .is_some_and(|t| (t - timestamp).abs() < 1e-6)
        {
            return Err(ThumbnailError::Decode {
                path: source.path.clone(),
                timestamp,
                reason: "synthetic decode failure".to_string(),
            });
        }

        Ok(RgbImage::from_pixel(
            FRAME_WIDTH,
            FRAME_HEIGHT,
            color_at(timestamp),
        ))
    }
}

fn settings_with_interval(interval: f64) -> Settings {
    Settings {
        sample_interval: interval,
        worker_count: 4,
        ..Settings::default()
    }
}

fn png_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".png"))
        .collect();
    names.sort();
    names
}

/// 測試 1: 40 秒影片、間隔 10 秒 -> 2x2 網格，影格依時間點放置
#[test]
fn test_forty_second_video_produces_two_by_two_grid() {
    let output_dir = TempDir::new().unwrap();
    let decoder = SyntheticDecoder::default().with_video("forty.mp4", 40.0);
    let options = MosaicOptions {
        sample_interval: 10.0,
        worker_count: 12,
        cell_divisor: 10,
    };
    let progress = ProgressBar::hidden();

    let record = generate(
        &decoder,
        Path::new("/videos/forty.mp4"),
        output_dir.path(),
        &options,
        &progress,
    )
    .unwrap();

    assert_eq!((record.row_count, record.col_count, record.total_count), (2, 2, 4));
    assert_eq!((record.total_width_px, record.total_height_px), (40, 20));
    assert!(record.generated_name.starts_with("forty.mp4;@;2x2;t;"));
    assert_eq!(progress.position(), 4);

    let mosaic = image::open(&record.storage_path).unwrap().to_rgb8();
    assert_eq!(mosaic.as_raw(), &record.raw_bytes);

    // t = 0, 10, 20, 30 -> (0,0), (1,0), (0,1), (1,1)
    for (index, timestamp) in [0.0, 10.0, 20.0, 30.0].into_iter().enumerate() {
        let (x0, y0) = cell_origin(index, 2, 20, 10);
        for y in y0..y0 + 10 {
            for x in x0..x0 + 20 {
                assert_eq!(*mosaic.get_pixel(x, y), color_at(timestamp));
            }
        }
    }
}

/// 測試 2: 目錄中的雜湊與磁碟上的檔案一致
#[test]
fn test_content_hash_matches_file_on_disk() {
    let output_dir = TempDir::new().unwrap();
    let decoder = SyntheticDecoder::default().with_video("clip.mp4", 95.0);
    let mut catalog = SqliteCatalog::open_in_memory().unwrap();

    let record = generate(
        &decoder,
        Path::new("clip.mp4"),
        output_dir.path(),
        &MosaicOptions::default(),
        &ProgressBar::hidden(),
    )
    .unwrap();
    catalog.insert_thumbnail_record(&record).unwrap();

    let stored = catalog.find_by_name(&record.generated_name).unwrap().unwrap();
    let bytes = fs::read(&stored.storage_path).unwrap();
    assert_eq!(stored.content_hash, content_hash(&bytes));
    assert_eq!(stored.size_bytes, bytes.len() as u64);
    // floor(95 / 10) = 9 -> 3x3
    assert_eq!(stored.row_count, 3);
}

/// 測試 3: 單一影格失敗時不寫出預覽圖也不入庫，其他影片照常處理
#[test]
fn test_failed_frame_aborts_only_that_video() {
    let source_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    fs::write(source_dir.path().join("good.mp4"), b"good").unwrap();
    fs::write(source_dir.path().join("bad.mp4"), b"bad video").unwrap();

    let decoder = SyntheticDecoder::default()
        .with_video("good.mp4", 40.0)
        .with_failing_video("bad.mp4", 40.0, 20.0);
    let generator = ThumbnailCatalogGenerator::with_decoder(
        settings_with_interval(10.0),
        Arc::new(AtomicBool::new(false)),
        Box::new(decoder),
    )
    .quiet();
    let mut catalog = SqliteCatalog::open_in_memory().unwrap();

    let result = generator
        .run(source_dir.path(), output_dir.path(), &mut catalog)
        .unwrap();

    assert_eq!(result.total_videos, 2);
    assert!(!result.interrupted);
    assert_eq!(result.successful, 1);
    assert_eq!(result.failed(), 1);
    assert!(result.failures[0].path.ends_with("bad.mp4"));
    assert!(result.failures[0].message.contains("20.000"));

    let files = png_files(output_dir.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("good.mp4;@;2x2;t;"));
    assert_eq!(catalog.count().unwrap(), 1);
    assert_eq!(catalog.generated_names().unwrap(), files);
}

/// 測試 4: 影片長度短於取樣間隔時回報錯誤而不是產生空白圖片
#[test]
fn test_short_video_is_reported_as_failure() {
    let source_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    fs::write(source_dir.path().join("short.mp4"), b"short").unwrap();

    let generator = ThumbnailCatalogGenerator::with_decoder(
        settings_with_interval(10.0),
        Arc::new(AtomicBool::new(false)),
        Box::new(SyntheticDecoder::default().with_video("short.mp4", 4.0)),
    )
    .quiet();
    let mut catalog = SqliteCatalog::open_in_memory().unwrap();

    let result = generator
        .run(source_dir.path(), output_dir.path(), &mut catalog)
        .unwrap();

    assert_eq!(result.failed(), 1);
    assert!(png_files(output_dir.path()).is_empty());
    assert_eq!(catalog.count().unwrap(), 0);
}

/// 測試 5: 已有預覽圖的影片不會再次擷取
#[test]
fn test_existing_thumbnail_skips_extraction() {
    let source_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    fs::write(source_dir.path().join("done.mp4"), b"done").unwrap();
    fs::write(source_dir.path().join("new.mp4"), b"new").unwrap();
    fs::write(
        output_dir.path().join("done.mp4;@;2x2;t;1600000000.png"),
        b"existing",
    )
    .unwrap();

    let decoder = Arc::new(
        SyntheticDecoder::default()
            .with_video("done.mp4", 40.0)
            .with_video("new.mp4", 40.0),
    );
    let generator = ThumbnailCatalogGenerator::with_decoder(
        settings_with_interval(10.0),
        Arc::new(AtomicBool::new(false)),
        Box::new(SharedDecoder(Arc::clone(&decoder))),
    )
    .quiet();
    let mut catalog = SqliteCatalog::open_in_memory().unwrap();

    let result = generator
        .run(source_dir.path(), output_dir.path(), &mut catalog)
        .unwrap();

    assert_eq!(result.skipped, 1);
    assert_eq!(result.successful, 1);
    assert_eq!(decoder.opens_for("done.mp4"), 0);
    // 1 次讀取規格 + 每格 1 次
    assert_eq!(decoder.opens_for("new.mp4"), 5);

    // 第二次執行時兩部影片都會被略過
    let second = generator
        .run(source_dir.path(), output_dir.path(), &mut catalog)
        .unwrap();
    assert_eq!(second.skipped, 2);
    assert_eq!(second.successful, 0);
    assert_eq!(decoder.opens_for("new.mp4"), 5);
    assert_eq!(catalog.count().unwrap(), 1);
}

/// 測試 6: 入庫失敗時刪除剛寫出的預覽圖
#[test]
fn test_catalog_failure_removes_written_thumbnail() {
    struct FailingCatalog;

    impl CatalogStore for FailingCatalog {
        fn insert_thumbnail_record(
            &mut self,
            _record: &ThumbnailRecord,
        ) -> Result<(), ThumbnailError> {
            Err(ThumbnailError::Storage(rusqlite_error()))
        }
    }

    let source_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    fs::write(source_dir.path().join("clip.mp4"), b"clip").unwrap();

    let generator = ThumbnailCatalogGenerator::with_decoder(
        settings_with_interval(10.0),
        Arc::new(AtomicBool::new(false)),
        Box::new(SyntheticDecoder::default().with_video("clip.mp4", 40.0)),
    )
    .quiet();

    let result = generator
        .run(source_dir.path(), output_dir.path(), &mut FailingCatalog)
        .unwrap();

    assert_eq!(result.failed(), 1);
    assert!(png_files(output_dir.path()).is_empty());
}

/// 測試 7: 中斷旗標已設定時不處理任何影片
#[test]
fn test_shutdown_signal_stops_batch() {
    let source_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    fs::write(source_dir.path().join("clip.mp4"), b"clip").unwrap();

    let decoder = Arc::new(SyntheticDecoder::default().with_video("clip.mp4", 40.0));
    let generator = ThumbnailCatalogGenerator::with_decoder(
        settings_with_interval(10.0),
        Arc::new(AtomicBool::new(true)),
        Box::new(SharedDecoder(Arc::clone(&decoder))),
    )
    .quiet();
    let mut catalog = SqliteCatalog::open_in_memory().unwrap();

    let result = generator
        .run(source_dir.path(), output_dir.path(), &mut catalog)
        .unwrap();

    assert!(result.interrupted);
    assert_eq!(result.discovered, 1);
    assert_eq!(result.total_videos, 0);
    assert_eq!(result.successful + result.failed() + result.skipped, 0);
    assert_eq!(decoder.decodes.load(Ordering::SeqCst), 0);
}

/// 讓測試保留解碼器的參照以檢查呼叫次數
struct SharedDecoder(Arc<SyntheticDecoder>);

impl FrameDecoder for SharedDecoder {
    fn open(&self, path: &Path) -> Result<VideoSource, ThumbnailError> {
        self.0.open(path)
    }

    fn decode_frame(
        &self,
        source: &VideoSource,
        timestamp: f64,
    ) -> Result<RgbImage, ThumbnailError> {
        self.0.decode_frame(source, timestamp)
    }
}

fn rusqlite_error() -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
        Some("UNIQUE constraint failed".to_string()),
    )
}

/// 測試 8: 沒有影片時仍回傳空的結果
#[test]
fn test_empty_source_directory() {
    let source_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();

    let generator = ThumbnailCatalogGenerator::with_decoder(
        settings_with_interval(10.0),
        Arc::new(AtomicBool::new(false)),
        Box::new(SyntheticDecoder::default()),
    )
    .quiet();
    let mut catalog = SqliteCatalog::open_in_memory().unwrap();

    let result = generator
        .run(source_dir.path(), output_dir.path(), &mut catalog)
        .unwrap();

    assert_eq!(result.discovered, 0);
    assert_eq!(result.total_videos, 0);
    assert!(!result.interrupted);
    assert!(result.generated.is_empty());
}
