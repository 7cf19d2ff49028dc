mod ffprobe_info;
mod file_hasher;
mod file_scanner;
mod generated_index;
mod path_validator;
mod progress;
mod thumbnail_catalog;

pub use ffprobe_info::{VideoSource, probe_video};
pub use file_hasher::{CONTENT_HASH_BYTES, FileDigest, content_hash, digest_file};
pub use file_scanner::{
    FileInfo, ScanResult, discovery_progress_bar, list_files, list_files_with_progress,
};
pub use generated_index::{GeneratedIndex, ThumbnailName, ThumbnailNameParser};
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
pub use progress::{NoProgress, ProgressCounter, ProgressSink, frame_progress_bar};
pub use thumbnail_catalog::{CatalogStore, SqliteCatalog, ThumbnailRecord};
