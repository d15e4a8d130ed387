// src/core/access.rs

use serde::Serialize;

use super::element::{ElementKind, TypedValues};
use super::meta::Metadata;
use super::shape::Shape;

/// Type-erased read access shared by every tensor variant.
/// Grid projection and cross-kind copies are written against this trait.
pub trait TensorAccess {
    fn kind(&self) -> ElementKind;

    fn shape(&self) -> &Shape;

    fn len(&self) -> usize {
        self.shape().element_count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn float_1d(&self, i: usize) -> f64;

    fn string_1d(&self, i: usize) -> String;

    fn is_null_1d(&self, i: usize) -> bool;

    fn metadata(&self) -> &Metadata;

    fn typed_values(&self) -> TypedValues<'_>;
}

/// Type-erased write access.
pub trait TensorAccessMut: TensorAccess {
    fn set_float_1d(&mut self, i: usize, val: f64);

    fn set_string_1d(&mut self, i: usize, val: &str);

    fn set_null_1d(&mut self, i: usize, null: bool);
}

/// Min / max of the valid (non-null, non-NaN) values of a tensor.
/// Indexes are `None` when there are no valid values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub min_index: Option<usize>,
    pub max_index: Option<usize>,
}

impl ValueRange {
    /// The "no values" result.
    pub fn empty() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            min_index: None,
            max_index: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_index.is_none()
    }

    /// Linear scan over `(flat index, value, is_null)`.
    pub fn scan(values: impl Iterator<Item = (usize, f64, bool)>) -> Self {
        let mut r = Self::empty();
        for (i, v, null) in values {
            if null || v.is_nan() {
                continue;
            }
            if r.min_index.is_none() || v < r.min {
                r.min = v;
                r.min_index = Some(i);
            }
            if r.max_index.is_none() || v > r.max {
                r.max = v;
                r.max_index = Some(i);
            }
        }
        r
    }
}
