pub mod load;
pub mod save;
pub mod types;

pub use save::save_settings;
pub use types::{
    Config, DEFAULT_CELL_DIVISOR, DEFAULT_SAMPLE_INTERVAL, DEFAULT_WORKER_COUNT, ExtensionSet,
    Settings,
};
