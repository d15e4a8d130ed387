pub mod config;
pub mod projection;
pub mod render;

pub use config::{ConfigError, GridConfig, DEFAULT_CONFIG_FILE};
pub use projection::{coords, flat_index, set_value_at, shape_2d, string_at, value_at, Grid2D};
pub use render::{render, GridDisplay};
