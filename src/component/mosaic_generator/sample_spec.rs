//! 取樣規格：由影片長度與期望間隔推算網格大小與實際取樣間隔
//!
//! 縮圖數量取不超過 `floor(長度 / 間隔)` 的最大完全平方數，
//! 多出來的長度以拉長實際間隔的方式平均分攤。

use crate::error::ThumbnailError;
use crate::tools::VideoSource;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSpec {
    pub duration_seconds: f64,
    /// 網格邊長 N
    pub grid_side: u32,
    /// N * N
    pub num_thumbnails: usize,
    pub cell_width: u32,
    pub cell_height: u32,
    /// 實際取樣間隔 = 長度 / 縮圖數量
    pub interval: f64,
}

impl SampleSpec {
    pub fn compute(
        duration_seconds: f64,
        frame_width: u32,
        frame_height: u32,
        desired_interval: f64,
        cell_divisor: u32,
    ) -> Result<Self, ThumbnailError> {
        if !desired_interval.is_finite() || desired_interval <= 0.0 {
            return Err(ThumbnailError::InvalidInterval(desired_interval));
        }
        if !duration_seconds.is_finite() || duration_seconds < desired_interval {
            return Err(ThumbnailError::DegenerateGrid {
                reason: format!(
                    "影片長度 {duration_seconds:.3}s 小於取樣間隔 {desired_interval:.3}s"
                ),
            });
        }

        let ratio = (duration_seconds / desired_interval).floor() as u64;
        let grid_side = integer_sqrt(ratio);
        let num_thumbnails = grid_side * grid_side;
        if num_thumbnails == 0 {
            return Err(ThumbnailError::DegenerateGrid {
                reason: "縮圖數量為 0".to_string(),
            });
        }

        let divisor = cell_divisor.max(1);
        let cell_width = frame_width / divisor;
        let cell_height = frame_height / divisor;
        if cell_width == 0 || cell_height == 0 {
            return Err(ThumbnailError::DegenerateGrid {
                reason: format!("影片解析度 {frame_width}x{frame_height} 過小"),
            });
        }

        let grid_side = u32::try_from(grid_side).map_err(|_| ThumbnailError::DegenerateGrid {
            reason: format!("網格邊長 {grid_side} 過大"),
        })?;

        Ok(Self {
            duration_seconds,
            grid_side,
            num_thumbnails: num_thumbnails as usize,
            cell_width,
            cell_height,
            interval: duration_seconds / num_thumbnails as f64,
        })
    }

    pub fn for_source(
        source: &VideoSource,
        desired_interval: f64,
        cell_divisor: u32,
    ) -> Result<Self, ThumbnailError> {
        Self::compute(
            source.duration_seconds,
            source.width,
            source.height,
            desired_interval,
            cell_divisor,
        )
    }

    #[must_use]
    pub fn timestamp(&self, index: usize) -> f64 {
        index as f64 * self.interval
    }

    #[must_use]
    pub fn timestamps(&self) -> Vec<f64> {
        (0..self.num_thumbnails).map(|i| self.timestamp(i)).collect()
    }

    #[must_use]
    pub const fn mosaic_size(&self) -> (u32, u32) {
        (
            self.cell_width * self.grid_side,
            self.cell_height * self.grid_side,
        )
    }
}

/// floor(sqrt(n))，避免浮點誤差
fn integer_sqrt(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}
