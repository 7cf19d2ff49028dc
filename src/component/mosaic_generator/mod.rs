//! 影片預覽圖元件
//!
//! 四個階段：
//! A. 取樣規格：由影片長度推算 N x N 網格與實際取樣間隔
//! B. 平行擷取：固定大小的執行緒池，每格獨立開啟解碼資源
//! C. 拼接：依索引把影格貼到網格
//! D. 寫檔並建立目錄紀錄

mod extraction_scheduler;
mod frame_sampler;
mod main;
mod mosaic_assembler;
mod pipeline;
mod record_builder;
mod sample_spec;

pub use extraction_scheduler::extract_all;
pub use frame_sampler::{
    FfmpegDecoder, FrameDecoder, FrameJob, FrameResult, RESIZE_FILTER, create_frame_jobs,
    sample_frame,
};
pub use main::{FailedVideo, GenerationResult, ThumbnailCatalogGenerator};
pub use mosaic_assembler::{assemble, cell_origin};
pub use pipeline::{MosaicOptions, generate};
pub use record_builder::{build_record, unix_timestamp, video_file_name};
pub use sample_spec::SampleSpec;
