// src/core/error.rs

use thiserror::Error;

use super::element::ElementKind;

/// Errores de forma (shape) y de layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("{what} length {actual} does not match number of dims {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("dimension name not found: {0}")]
    NameNotFound(String),

    #[error("unsupported layout: {0}")]
    UnsupportedLayout(String),

    #[error("{requested} outer offsets requested but tensor only has {available} dims")]
    DimensionCountExceeded { requested: usize, available: usize },

    #[error("index {index:?} out of range for dims {dims:?}")]
    IndexOutOfRange { index: Vec<usize>, dims: Vec<usize> },

    #[error("value count {actual} does not match shape element count {expected}")]
    ValueCountMismatch { expected: usize, actual: usize },
}

/// Errors raised when moving tensors across type or format boundaries.
#[derive(Error, Debug)]
pub enum TensorError {
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Element kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: ElementKind,
        actual: ElementKind,
    },

    #[error("Unsupported arrow type: {0}")]
    UnsupportedArrowType(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
