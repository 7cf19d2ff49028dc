use crate::error::ThumbnailError;
use image::RgbImage;
use image::imageops;

/// 將 N*N 張影格依列優先順序拼成一張預覽圖
///
/// 索引 0 在左上角，由左至右、由上至下遞增；
/// 影格 i 貼在 `((i % N) * cell_width, (i / N) * cell_height)`。
pub fn assemble(
    frames: &[RgbImage],
    grid_side: u32,
    cell_width: u32,
    cell_height: u32,
) -> Result<RgbImage, ThumbnailError> {
    let expected = (grid_side as usize) * (grid_side as usize);
    if grid_side == 0 || cell_width == 0 || cell_height == 0 {
        return Err(ThumbnailError::DegenerateGrid {
            reason: format!("網格 {grid_side}x{grid_side}，格子 {cell_width}x{cell_height}"),
        });
    }
    if frames.len() != expected {
        return Err(ThumbnailError::Layout(format!(
            "需要 {} 張影格，實際 {} 張",
            expected,
            frames.len()
        )));
    }

    let mut mosaic = RgbImage::new(cell_width * grid_side, cell_height * grid_side);

    for (index, frame) in frames.iter().enumerate() {
        if frame.dimensions() != (cell_width, cell_height) {
            return Err(ThumbnailError::Layout(format!(
                "影格 {} 尺寸為 {}x{}，應為 {}x{}",
                index,
                frame.width(),
                frame.height(),
                cell_width,
                cell_height
            )));
        }

        let (x, y) = cell_origin(index, grid_side, cell_width, cell_height);
        imageops::replace(&mut mosaic, frame, i64::from(x), i64::from(y));
    }

    Ok(mosaic)
}

/// 影格 `index` 在預覽圖中的左上角座標
#[must_use]
pub fn cell_origin(index: usize, grid_side: u32, cell_width: u32, cell_height: u32) -> (u32, u32) {
    let side = grid_side as usize;
    let col = (index % side) as u32;
    let row = (index / side) as u32;
    (col * cell_width, row * cell_height)
}
