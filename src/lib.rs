// src/lib.rs

pub mod core;
pub mod grid;
pub mod utils;

// Re-exports para tener una API limpia desde fuera del crate
pub use core::{
    column_major_strides, row_major_strides, AnyTensor, BitSlice, BitsTensor, Buffer,
    DisplayHints, Element, ElementKind, Layout, Metadata, Shape, ShapeError, Tensor,
    TensorAccess, TensorAccessMut, TensorError, TensorView, TensorViewMut, TypedValues,
    ValueRange,
};
pub use grid::{
    coords, flat_index, render, set_value_at, shape_2d, string_at, value_at, ConfigError,
    Grid2D, GridConfig, GridDisplay,
};
