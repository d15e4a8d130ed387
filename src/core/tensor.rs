// src/core/tensor.rs

use std::marker::PhantomData;

use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::{debug, trace};

use super::access::{TensorAccess, TensorAccessMut, ValueRange};
use super::bitslice::BitSlice;
use super::buffer::Buffer;
use super::element::{Element, ElementKind, TypedValues};
use super::error::ShapeError;
use super::meta::{merge_metadata, Metadata};
use super::shape::{column_major_strides, Layout, Shape};

/// Tensor denso n-dimensional de elementos `T`.
///
/// `B` is the value storage: an owned [`Buffer`] for regular tensors, or a
/// borrowed slice of a parent tensor's buffer for views. Every tensor owns
/// its shape, its (lazily allocated) null bitmap and its metadata, so views
/// share values with their parent but never null flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tensor<T, B = Buffer<T>> {
    shape: Shape,
    values: B,
    #[serde(skip_serializing_if = "Option::is_none")]
    nulls: Option<BitSlice>,
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    meta: Metadata,
    #[serde(skip)]
    _elem: PhantomData<T>,
}

/// Read-only view aliasing a contiguous range of another tensor's values.
pub type TensorView<'a, T> = Tensor<T, &'a [T]>;

/// Writable view aliasing a contiguous range of another tensor's values.
pub type TensorViewMut<'a, T> = Tensor<T, &'a mut [T]>;

#[derive(Deserialize)]
struct RawTensor<T> {
    shape: Shape,
    values: Vec<T>,
    #[serde(default)]
    nulls: Option<BitSlice>,
    #[serde(default)]
    meta: Metadata,
}

impl<'de, T: Element + Deserialize<'de>> Deserialize<'de> for Tensor<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawTensor::<T>::deserialize(deserializer)?;
        let mut tsr = Tensor::from_vec(raw.shape, raw.values).map_err(de::Error::custom)?;
        if let Some(nulls) = raw.nulls {
            if nulls.len() != tsr.len() {
                return Err(de::Error::custom(format!(
                    "null bitmap length {} does not match value count {}",
                    nulls.len(),
                    tsr.len()
                )));
            }
            tsr.nulls = Some(nulls);
        }
        tsr.meta = raw.meta;
        Ok(tsr)
    }
}

// ---------------------------------------------------------------------------
// Owned tensors: construction and resizing
// ---------------------------------------------------------------------------

impl<T: Element> Tensor<T> {
    /// Crea un tensor row-major con valores por defecto.
    pub fn new<D: Into<Vec<usize>>>(dims: D) -> Self {
        Self::with_shape(Shape::row_major(dims))
    }

    pub fn with_shape(shape: Shape) -> Self {
        let len = shape.element_count();
        Self::from_parts(shape, Buffer::filled(len))
    }

    /// Crea un tensor verificando que values.len() coincide con shape.element_count()
    pub fn from_vec(shape: Shape, values: Vec<T>) -> Result<Self, ShapeError> {
        let expected = shape.element_count();
        if values.len() != expected {
            return Err(ShapeError::ValueCountMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self::from_parts(shape, Buffer::from_vec(values)))
    }

    fn from_parts(shape: Shape, values: Buffer<T>) -> Self {
        Self {
            shape,
            values,
            nulls: None,
            meta: Metadata::new(),
            _elem: PhantomData,
        }
    }

    /// Changes the shape and resizes storage to match. Existing values are
    /// kept by flat position; slots within the buffer's capacity are reused.
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
        self.resize_storage();
    }

    /// Takes dims, strides and names from `from`, resizing storage.
    pub fn copy_shape_from<F: TensorAccess + ?Sized>(&mut self, from: &F) {
        self.set_shape(from.shape().clone());
    }

    /// Sets the outer-most dimension of a row-major tensor (minimum 1).
    /// Does nothing for other layouts.
    pub fn set_row_count(&mut self, rows: usize) {
        if !self.shape.is_row_major() || self.shape.num_dims() == 0 {
            debug!(shape = %self.shape, "set_row_count ignored: not row-major");
            return;
        }
        self.shape.set_outer_dim(rows.max(1));
        self.resize_storage();
    }

    /// Adds `n` rows to a row-major tensor. Does nothing for other layouts.
    pub fn add_rows(&mut self, n: usize) {
        if self.shape.num_dims() > 0 {
            self.set_row_count(self.shape.dim(0) + n);
        }
    }

    /// Slots available before a resize has to reallocate.
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    pub fn into_values(self) -> Vec<T> {
        self.values.into_vec()
    }

    fn resize_storage(&mut self) {
        let len = self.shape.element_count();
        self.values.resize(len);
        if let Some(nulls) = &mut self.nulls {
            nulls.resize(len);
        }
    }
}

// ---------------------------------------------------------------------------
// Read access (owned tensors and views)
// ---------------------------------------------------------------------------

impl<T: Element, B: AsRef<[T]>> Tensor<T, B> {
    pub fn kind(&self) -> ElementKind {
        T::KIND
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn num_dims(&self) -> usize {
        self.shape.num_dims()
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn len(&self) -> usize {
        self.values.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> &[T] {
        self.values.as_ref()
    }

    /// Value at an n-dimensional index (unchecked precondition: index in range).
    #[inline]
    pub fn get(&self, index: &[usize]) -> &T {
        &self.values.as_ref()[self.shape.offset(index) as usize]
    }

    pub fn try_get(&self, index: &[usize]) -> Result<&T, ShapeError> {
        let off = self.shape.try_offset(index)?;
        self.values
            .as_ref()
            .get(off)
            .ok_or_else(|| ShapeError::IndexOutOfRange {
                index: index.to_vec(),
                dims: self.shape.dims().to_vec(),
            })
    }

    #[inline]
    pub fn get_1d(&self, i: usize) -> &T {
        &self.values.as_ref()[i]
    }

    #[inline]
    pub fn get_row_cell(&self, row: usize, cell: usize) -> &T {
        let (_, cells) = self.shape.row_cell_size();
        &self.values.as_ref()[row * cells + cell]
    }

    pub fn float(&self, index: &[usize]) -> f64 {
        self.get(index).to_f64()
    }

    pub fn float_1d(&self, i: usize) -> f64 {
        self.get_1d(i).to_f64()
    }

    pub fn float_row_cell(&self, row: usize, cell: usize) -> f64 {
        self.get_row_cell(row, cell).to_f64()
    }

    pub fn string(&self, index: &[usize]) -> String {
        self.get(index).to_text()
    }

    pub fn string_1d(&self, i: usize) -> String {
        self.get_1d(i).to_text()
    }

    pub fn string_row_cell(&self, row: usize, cell: usize) -> String {
        self.get_row_cell(row, cell).to_text()
    }

    /// All values converted to f64.
    pub fn floats(&self) -> Vec<f64> {
        self.values.as_ref().iter().map(Element::to_f64).collect()
    }

    // -- nulls -------------------------------------------------------------

    pub fn nulls(&self) -> Option<&BitSlice> {
        self.nulls.as_ref()
    }

    pub fn is_null(&self, index: &[usize]) -> bool {
        match &self.nulls {
            Some(n) => n.get(self.shape.offset(index) as usize),
            None => false,
        }
    }

    pub fn is_null_1d(&self, i: usize) -> bool {
        self.nulls.as_ref().is_some_and(|n| n.get(i))
    }

    pub fn set_null(&mut self, index: &[usize], null: bool) {
        let off = self.shape.offset(index) as usize;
        self.set_null_1d(off, null);
    }

    /// The null bitmap is allocated on the first call and never dropped.
    pub fn set_null_1d(&mut self, i: usize, null: bool) {
        let len = self.len();
        self.nulls
            .get_or_insert_with(|| {
                debug!(len, "allocating null bitmap");
                BitSlice::new(len)
            })
            .set(i, null);
    }

    // -- reductions --------------------------------------------------------

    /// Min / max over non-null, non-NaN values. String tensors have no range.
    pub fn range(&self) -> ValueRange {
        if !T::KIND.is_numeric() {
            return ValueRange::empty();
        }
        ValueRange::scan(
            self.values
                .as_ref()
                .iter()
                .enumerate()
                .map(|(i, v)| (i, v.to_f64(), self.is_null_1d(i))),
        )
    }

    /// Folds `fun(index, value, acc)` over non-null, non-NaN values.
    pub fn agg(&self, init: f64, mut fun: impl FnMut(usize, f64, f64) -> f64) -> f64 {
        let mut acc = init;
        for (i, v) in self.values.as_ref().iter().enumerate() {
            let val = v.to_f64();
            if !self.is_null_1d(i) && !val.is_nan() {
                acc = fun(i, val, acc);
            }
        }
        acc
    }

    /// `fun(index, value)` for each value; null and NaN entries give 0.
    pub fn eval(&self, mut fun: impl FnMut(usize, f64) -> f64) -> Vec<f64> {
        let mut out = vec![0.0; self.len()];
        for (i, v) in self.values.as_ref().iter().enumerate() {
            let val = v.to_f64();
            if !self.is_null_1d(i) && !val.is_nan() {
                out[i] = fun(i, val);
            }
        }
        out
    }

    // -- matrix access -----------------------------------------------------

    /// Rows and columns of the row-major matrix formed by the last two dims.
    pub fn matrix_dims(&self) -> Result<(usize, usize), ShapeError> {
        self.shape.matrix_dims()
    }

    /// Float value at matrix cell `(i, j)`, with leading dims at 0.
    pub fn at(&self, i: usize, j: usize) -> Result<f64, ShapeError> {
        let off = self.shape.matrix_offset(i, j)?;
        Ok(self.values.as_ref()[off].to_f64())
    }

    /// Side of the square matrix; `UnsupportedLayout` when not square.
    pub fn symmetric_dim(&self) -> Result<usize, ShapeError> {
        self.shape.symmetric_dim()
    }

    // -- views and copies --------------------------------------------------

    /// Sub-tensor holding the given outer indexes fixed. The outer dims are
    /// the first ones for row-major shapes and the last ones for
    /// column-major shapes. Values alias this tensor; null bits are copied.
    pub fn view(&self, outer: &[usize]) -> Result<TensorView<'_, T>, ShapeError> {
        let (shape, start) = self.subspace(outer)?;
        let end = start + shape.element_count();
        let nulls = self.nulls.as_ref().map(|n| n.sub_slice(start, end));
        trace!(start, end, "tensor view");
        Ok(Tensor {
            shape,
            values: &self.values.as_ref()[start..end],
            nulls,
            meta: Metadata::new(),
            _elem: PhantomData,
        })
    }

    /// Deep copy with independent storage.
    pub fn to_owned_tensor(&self) -> Tensor<T> {
        Tensor {
            shape: self.shape.clone(),
            values: Buffer::from_vec(self.values.as_ref().to_vec()),
            nulls: self.nulls.clone(),
            meta: self.meta.clone(),
            _elem: PhantomData,
        }
    }

    fn subspace(&self, outer: &[usize]) -> Result<(Shape, usize), ShapeError> {
        let nd = self.shape.num_dims();
        let od = outer.len();
        if od >= nd {
            return Err(ShapeError::DimensionCountExceeded {
                requested: od,
                available: nd,
            });
        }
        let layout = self.shape.layout().ok_or_else(|| {
            ShapeError::UnsupportedLayout(format!(
                "view of custom strides {:?}",
                self.shape.strides()
            ))
        })?;
        let dims = self.shape.dims();
        let names: Vec<&str> = self.shape.names().iter().map(String::as_str).collect();
        let mut start_index = vec![0; nd];
        let shape = match layout {
            Layout::RowMajor => {
                start_index[..od].copy_from_slice(outer);
                Shape::new(&dims[od..], None, Some(&names[od..]))?
            }
            Layout::ColumnMajor => {
                let inner = nd - od;
                start_index[inner..].copy_from_slice(outer);
                let sub = &dims[..inner];
                let strides = column_major_strides(sub);
                Shape::new(sub, Some(&strides), Some(&names[..inner]))?
            }
        };
        if !self.shape.index_is_valid(&start_index) {
            return Err(ShapeError::IndexOutOfRange {
                index: outer.to_vec(),
                dims: dims.to_vec(),
            });
        }
        Ok((shape, self.shape.offset(&start_index) as usize))
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

    /// Merges the source's metadata into this tensor's, overwriting keys.
    pub fn copy_metadata_from<F: TensorAccess + ?Sized>(&mut self, from: &F) {
        merge_metadata(&mut self.meta, from.metadata());
    }
}

// ---------------------------------------------------------------------------
// Write access (owned tensors and mutable views)
// ---------------------------------------------------------------------------

impl<T: Element, B: AsRef<[T]> + AsMut<[T]>> Tensor<T, B> {
    pub fn values_mut(&mut self) -> &mut [T] {
        self.values.as_mut()
    }

    #[inline]
    pub fn get_mut(&mut self, index: &[usize]) -> &mut T {
        let off = self.shape.offset(index) as usize;
        &mut self.values.as_mut()[off]
    }

    #[inline]
    pub fn set(&mut self, index: &[usize], val: T) {
        *self.get_mut(index) = val;
    }

    #[inline]
    pub fn set_1d(&mut self, i: usize, val: T) {
        self.values.as_mut()[i] = val;
    }

    pub fn set_row_cell(&mut self, row: usize, cell: usize, val: T) {
        let (_, cells) = self.shape.row_cell_size();
        self.values.as_mut()[row * cells + cell] = val;
    }

    pub fn set_float(&mut self, index: &[usize], val: f64) {
        self.get_mut(index).set_f64(val);
    }

    pub fn set_float_1d(&mut self, i: usize, val: f64) {
        self.values.as_mut()[i].set_f64(val);
    }

    pub fn set_float_row_cell(&mut self, row: usize, cell: usize, val: f64) {
        let (_, cells) = self.shape.row_cell_size();
        self.values.as_mut()[row * cells + cell].set_f64(val);
    }

    pub fn set_string(&mut self, index: &[usize], val: &str) {
        *self.get_mut(index) = T::from_text(val);
    }

    pub fn set_string_1d(&mut self, i: usize, val: &str) {
        self.values.as_mut()[i] = T::from_text(val);
    }

    pub fn set_string_row_cell(&mut self, row: usize, cell: usize, val: &str) {
        let (_, cells) = self.shape.row_cell_size();
        self.values.as_mut()[row * cells + cell] = T::from_text(val);
    }

    /// Copies `vals` into the leading values (up to the shorter length).
    pub fn set_floats(&mut self, vals: &[f64]) {
        for (v, &f) in self.values.as_mut().iter_mut().zip(vals) {
            v.set_f64(f);
        }
    }

    pub fn set_zeros(&mut self) {
        self.values.as_mut().fill(T::default());
    }

    /// Adds `val` to the value at `index` and returns the stored result.
    pub fn add_scalar(&mut self, index: &[usize], val: f64) -> f64 {
        let v = self.get_mut(index);
        v.set_f64(v.to_f64() + val);
        v.to_f64()
    }

    /// Multiplies the value at `index` by `val` and returns the stored result.
    pub fn mul_scalar(&mut self, index: &[usize], val: f64) -> f64 {
        let v = self.get_mut(index);
        v.set_f64(v.to_f64() * val);
        v.to_f64()
    }

    /// Replaces each non-null, non-NaN value with `fun(index, value)`.
    pub fn set_func(&mut self, mut fun: impl FnMut(usize, f64) -> f64) {
        let nulls = self.nulls.as_ref();
        for (i, v) in self.values.as_mut().iter_mut().enumerate() {
            let val = v.to_f64();
            if !nulls.is_some_and(|n| n.get(i)) && !val.is_nan() {
                v.set_f64(fun(i, val));
            }
        }
    }

    /// Writable sub-tensor view; see [`Tensor::view`].
    pub fn view_mut(&mut self, outer: &[usize]) -> Result<TensorViewMut<'_, T>, ShapeError> {
        let (shape, start) = self.subspace(outer)?;
        let end = start + shape.element_count();
        let nulls = self.nulls.as_ref().map(|n| n.sub_slice(start, end));
        trace!(start, end, "mutable tensor view");
        Ok(Tensor {
            shape,
            values: &mut self.values.as_mut()[start..end],
            nulls,
            meta: Metadata::new(),
            _elem: PhantomData,
        })
    }

    /// Element-wise copy from any tensor, by flat position, over the shorter
    /// of the two lengths. Same-kind sources are cloned directly; otherwise
    /// values go through the string accessors when either side holds
    /// strings, and through f64 otherwise. Null flags are copied too.
    pub fn copy_from<F: TensorAccess + ?Sized>(&mut self, from: &F) {
        let n = self.len().min(from.len());
        self.copy_cells_from(from, 0, 0, n);
    }

    /// Copies `n` values from `from[start..]` into `self[to..]`.
    pub fn copy_cells_from<F: TensorAccess + ?Sized>(
        &mut self,
        from: &F,
        to: usize,
        start: usize,
        n: usize,
    ) {
        let dst = self.values.as_mut();
        if let Some(src) = T::from_typed(from.typed_values()) {
            dst[to..to + n].clone_from_slice(&src[start..start + n]);
        } else if T::KIND == ElementKind::String || from.kind() == ElementKind::String {
            for i in 0..n {
                dst[to + i] = T::from_text(&from.string_1d(start + i));
            }
        } else {
            for i in 0..n {
                dst[to + i].set_f64(from.float_1d(start + i));
            }
        }
        for i in 0..n {
            if from.is_null_1d(start + i) {
                self.set_null_1d(to + i, true);
            } else if self.nulls.is_some() {
                self.set_null_1d(to + i, false);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Type-erased access
// ---------------------------------------------------------------------------

impl<T: Element, B: AsRef<[T]>> TensorAccess for Tensor<T, B> {
    fn kind(&self) -> ElementKind {
        T::KIND
    }

    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn len(&self) -> usize {
        self.values.as_ref().len()
    }

    fn float_1d(&self, i: usize) -> f64 {
        self.get_1d(i).to_f64()
    }

    fn string_1d(&self, i: usize) -> String {
        self.get_1d(i).to_text()
    }

    fn is_null_1d(&self, i: usize) -> bool {
        self.nulls.as_ref().is_some_and(|n| n.get(i))
    }

    fn metadata(&self) -> &Metadata {
        &self.meta
    }

    fn typed_values(&self) -> TypedValues<'_> {
        T::typed(self.values.as_ref())
    }
}

impl<T: Element, B: AsRef<[T]> + AsMut<[T]>> TensorAccessMut for Tensor<T, B> {
    fn set_float_1d(&mut self, i: usize, val: f64) {
        self.values.as_mut()[i].set_f64(val);
    }

    fn set_string_1d(&mut self, i: usize, val: &str) {
        self.values.as_mut()[i] = T::from_text(val);
    }

    fn set_null_1d(&mut self, i: usize, null: bool) {
        Tensor::set_null_1d(self, i, null);
    }
}

// ---------------------------------------------------------------------------
// Complex tensors
// ---------------------------------------------------------------------------

impl<B: AsRef<[num_complex::Complex64]>> Tensor<num_complex::Complex64, B> {
    pub fn imag_1d(&self, i: usize) -> f64 {
        self.values.as_ref()[i].im
    }
}

impl<B> Tensor<num_complex::Complex64, B>
where
    B: AsRef<[num_complex::Complex64]> + AsMut<[num_complex::Complex64]>,
{
    pub fn set_imag_1d(&mut self, i: usize, val: f64) {
        self.values.as_mut()[i].im = val;
    }
}
