//! 預覽圖檔名格式與「已產生」索引
//!
//! 檔名格式：`<影片檔名>;@;<N>x<N>;t;<unix 秒數>.png`

use regex::Regex;
use std::collections::HashSet;

const NAME_PATTERN: &str = r"^(?P<video>.+);@;(?P<rows>\d+)x(?P<cols>\d+);t;(?P<time>\d+)\.[A-Za-z0-9]+$";

/// 預覽圖檔名的組成部分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailName {
    pub video_name: String,
    pub grid_side: u32,
    pub generated_at: u64,
}

impl ThumbnailName {
    #[must_use]
    pub fn new(video_name: &str, grid_side: u32, generated_at: u64) -> Self {
        Self {
            video_name: video_name.to_string(),
            grid_side,
            generated_at,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "{};@;{}x{};t;{}.png",
            self.video_name, self.grid_side, self.grid_side, self.generated_at
        )
    }
}

pub struct ThumbnailNameParser {
    pattern: Regex,
}

impl ThumbnailNameParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(NAME_PATTERN)?,
        })
    }

    /// 不符合格式或非正方形網格時回傳 `None`
    #[must_use]
    pub fn parse(&self, file_name: &str) -> Option<ThumbnailName> {
        let caps = self.pattern.captures(file_name)?;
        let rows: u32 = caps.name("rows")?.as_str().parse().ok()?;
        let cols: u32 = caps.name("cols")?.as_str().parse().ok()?;
        if rows != cols {
            return None;
        }

        Some(ThumbnailName {
            video_name: caps.name("video")?.as_str().to_string(),
            grid_side: rows,
            generated_at: caps.name("time")?.as_str().parse().ok()?,
        })
    }
}

/// 已產生預覽圖的影片檔名集合
#[derive(Debug, Clone, Default)]
pub struct GeneratedIndex {
    video_names: HashSet<String>,
}

impl GeneratedIndex {
    /// 從既有的預覽圖檔名建立索引，無法解析的檔名會被忽略
    pub fn from_file_names<I, S>(file_names: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parser = ThumbnailNameParser::new()?;
        let video_names = file_names
            .into_iter()
            .filter_map(|name| parser.parse(name.as_ref()))
            .map(|name| name.video_name)
            .collect();

        Ok(Self { video_names })
    }

    #[must_use]
    pub fn contains(&self, video_name: &str) -> bool {
        self.video_names.contains(video_name)
    }

    pub fn insert(&mut self, video_name: &str) {
        self.video_names.insert(video_name.to_string());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.video_names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.video_names.is_empty()
    }
}
