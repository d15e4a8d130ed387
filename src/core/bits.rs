// src/core/bits.rs

use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::access::{TensorAccess, TensorAccessMut, ValueRange};
use super::bitslice::BitSlice;
use super::element::{ElementKind, TypedValues};
use super::error::ShapeError;
use super::meta::{merge_metadata, Metadata};
use super::shape::Shape;

/// Tensor de booleanos empaquetados en bits.
///
/// Float access maps `true`/`false` to `1.0`/`0.0` and any non-zero float to
/// `true`. There is no null bitmap, no range and no sub-tensor views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BitsTensor {
    shape: Shape,
    values: BitSlice,
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    meta: Metadata,
}

#[derive(Deserialize)]
struct RawBits {
    shape: Shape,
    values: BitSlice,
    #[serde(default)]
    meta: Metadata,
}

impl<'de> Deserialize<'de> for BitsTensor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawBits::deserialize(deserializer)?;
        let mut tsr = BitsTensor::from_bits(raw.shape, raw.values).map_err(de::Error::custom)?;
        tsr.meta = raw.meta;
        Ok(tsr)
    }
}

#[inline]
fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Accepts the usual spellings; anything else is not a bool.
fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "1" | "+" => Some(true),
        "false" | "f" | "no" | "0" | "-" => Some(false),
        _ => None,
    }
}

impl BitsTensor {
    pub fn new<D: Into<Vec<usize>>>(dims: D) -> Self {
        Self::with_shape(Shape::row_major(dims))
    }

    pub fn with_shape(shape: Shape) -> Self {
        let values = BitSlice::new(shape.element_count());
        Self {
            shape,
            values,
            meta: Metadata::new(),
        }
    }

    pub fn from_bits(shape: Shape, values: BitSlice) -> Result<Self, ShapeError> {
        let expected = shape.element_count();
        if values.len() != expected {
            return Err(ShapeError::ValueCountMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            shape,
            values,
            meta: Metadata::new(),
        })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn bits(&self) -> &BitSlice {
        &self.values
    }

    // -- shape changes -----------------------------------------------------

    pub fn reshape<D: Into<Vec<usize>>>(
        &mut self,
        dims: D,
        strides: Option<&[isize]>,
        names: Option<&[&str]>,
    ) -> Result<(), ShapeError> {
        let shape = Shape::new(dims, strides, names)?;
        self.set_shape(shape);
        Ok(())
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        self.values.resize(self.shape.element_count());
    }

    pub fn copy_shape_from<F: TensorAccess + ?Sized>(&mut self, from: &F) {
        self.set_shape(from.shape().clone());
    }

    /// Row-major only; minimum one row.
    pub fn set_row_count(&mut self, rows: usize) {
        if !self.shape.is_row_major() || self.shape.num_dims() == 0 {
            debug!(shape = %self.shape, "set_row_count ignored: not row-major");
            return;
        }
        self.shape.set_outer_dim(rows.max(1));
        self.values.resize(self.shape.element_count());
    }

    pub fn add_rows(&mut self, n: usize) {
        if self.shape.num_dims() > 0 {
            self.set_row_count(self.shape.dim(0) + n);
        }
    }

    // -- element access ----------------------------------------------------

    pub fn get(&self, index: &[usize]) -> bool {
        self.values.get(self.shape.offset(index) as usize)
    }

    pub fn get_1d(&self, i: usize) -> bool {
        self.values.get(i)
    }

    pub fn set(&mut self, index: &[usize], val: bool) {
        let off = self.shape.offset(index) as usize;
        self.values.set(off, val);
    }

    pub fn set_1d(&mut self, i: usize, val: bool) {
        self.values.set(i, val);
    }

    pub fn get_row_cell(&self, row: usize, cell: usize) -> bool {
        let (_, cells) = self.shape.row_cell_size();
        self.values.get(row * cells + cell)
    }

    pub fn set_row_cell(&mut self, row: usize, cell: usize, val: bool) {
        let (_, cells) = self.shape.row_cell_size();
        self.values.set(row * cells + cell, val);
    }

    pub fn float_1d(&self, i: usize) -> f64 {
        bool_to_f64(self.values.get(i))
    }

    pub fn set_float_1d(&mut self, i: usize, val: f64) {
        self.values.set(i, val != 0.0);
    }

    pub fn string_1d(&self, i: usize) -> String {
        self.values.get(i).to_string()
    }

    /// Text that does not spell a bool leaves the value unchanged.
    pub fn set_string_1d(&mut self, i: usize, val: &str) {
        if let Some(b) = parse_bool(val) {
            self.values.set(i, b);
        }
    }

    pub fn is_null_1d(&self, _i: usize) -> bool {
        false
    }

    pub fn set_null_1d(&mut self, _i: usize, _null: bool) {}

    pub fn floats(&self) -> Vec<f64> {
        self.values.iter().map(bool_to_f64).collect()
    }

    pub fn set_floats(&mut self, vals: &[f64]) {
        for (i, &f) in vals.iter().take(self.len()).enumerate() {
            self.values.set(i, f != 0.0);
        }
    }

    pub fn set_zeros(&mut self) {
        for i in 0..self.len() {
            self.values.set(i, false);
        }
    }

    /// Bits have no NaN or nulls, so every value is visited.
    pub fn agg(&self, init: f64, mut fun: impl FnMut(usize, f64, f64) -> f64) -> f64 {
        self.values
            .iter()
            .enumerate()
            .fold(init, |acc, (i, b)| fun(i, bool_to_f64(b), acc))
    }

    pub fn eval(&self, mut fun: impl FnMut(usize, f64) -> f64) -> Vec<f64> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, b)| fun(i, bool_to_f64(b)))
            .collect()
    }

    pub fn set_func(&mut self, mut fun: impl FnMut(usize, f64) -> f64) {
        for i in 0..self.len() {
            let v = fun(i, bool_to_f64(self.values.get(i)));
            self.values.set(i, v != 0.0);
        }
    }

    /// Always the "no values" result.
    pub fn range(&self) -> ValueRange {
        ValueRange::empty()
    }

    /// Views need an addressable sub-range of storage, which packed bits
    /// do not provide.
    pub fn view(&self, _outer: &[usize]) -> Result<BitsTensor, ShapeError> {
        Err(ShapeError::UnsupportedLayout(
            "bits tensors do not support views".to_string(),
        ))
    }

    // -- copies ------------------------------------------------------------

    pub fn copy_from<F: TensorAccess + ?Sized>(&mut self, from: &F) {
        let n = self.len().min(from.len());
        self.copy_cells_from(from, 0, 0, n);
    }

    pub fn copy_cells_from<F: TensorAccess + ?Sized>(
        &mut self,
        from: &F,
        to: usize,
        start: usize,
        n: usize,
    ) {
        match from.typed_values() {
            TypedValues::Bits(src) => {
                for i in 0..n {
                    self.values.set(to + i, src.get(start + i));
                }
            }
            TypedValues::String(src) => {
                for i in 0..n {
                    self.set_string_1d(to + i, &src[start + i]);
                }
            }
            _ => {
                for i in 0..n {
                    self.values.set(to + i, from.float_1d(start + i) != 0.0);
                }
            }
        }
    }

    // -- metadata ----------------------------------------------------------

    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    pub fn set_meta(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.meta.insert(key.into(), val.into());
    }

    pub fn copy_metadata_from<F: TensorAccess + ?Sized>(&mut self, from: &F) {
        merge_metadata(&mut self.meta, from.metadata());
    }
}

impl TensorAccess for BitsTensor {
    fn kind(&self) -> ElementKind {
        ElementKind::Bits
    }

    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn float_1d(&self, i: usize) -> f64 {
        BitsTensor::float_1d(self, i)
    }

    fn string_1d(&self, i: usize) -> String {
        BitsTensor::string_1d(self, i)
    }

    fn is_null_1d(&self, _i: usize) -> bool {
        false
    }

    fn metadata(&self) -> &Metadata {
        &self.meta
    }

    fn typed_values(&self) -> TypedValues<'_> {
        TypedValues::Bits(&self.values)
    }
}

impl TensorAccessMut for BitsTensor {
    fn set_float_1d(&mut self, i: usize, val: f64) {
        BitsTensor::set_float_1d(self, i, val);
    }

    fn set_string_1d(&mut self, i: usize, val: &str) {
        BitsTensor::set_string_1d(self, i, val);
    }

    fn set_null_1d(&mut self, _i: usize, _null: bool) {}
}
