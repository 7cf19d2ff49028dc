//! 功能元件模組

pub mod mosaic_generator;

pub use mosaic_generator::ThumbnailCatalogGenerator;
