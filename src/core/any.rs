// src/core/any.rs

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::access::{TensorAccess, TensorAccessMut, ValueRange};
use super::bits::BitsTensor;
use super::element::{ElementKind, TypedValues};
use super::error::{ShapeError, TensorError};
use super::meta::Metadata;
use super::shape::Shape;
use super::tensor::Tensor;

/// Tensor de cualquier tipo de elemento.
///
/// Closed set of element kinds; callers that only know the kind at runtime
/// (files, tables, the CLI) hold one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnyTensor {
    Float64(Tensor<f64>),
    Float32(Tensor<f32>),
    Int(Tensor<i64>),
    String(Tensor<String>),
    Bits(BitsTensor),
    Complex(Tensor<Complex64>),
}

macro_rules! each {
    ($self:expr, $t:ident => $body:expr) => {
        match $self {
            AnyTensor::Float64($t) => $body,
            AnyTensor::Float32($t) => $body,
            AnyTensor::Int($t) => $body,
            AnyTensor::String($t) => $body,
            AnyTensor::Bits($t) => $body,
            AnyTensor::Complex($t) => $body,
        }
    };
}

macro_rules! impl_from {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for AnyTensor {
            fn from(t: $ty) -> Self {
                AnyTensor::$variant(t)
            }
        }

        impl TryFrom<AnyTensor> for $ty {
            type Error = TensorError;

            fn try_from(any: AnyTensor) -> Result<Self, Self::Error> {
                match any {
                    AnyTensor::$variant(t) => Ok(t),
                    other => Err(TensorError::KindMismatch {
                        expected: ElementKind::$variant,
                        actual: other.kind(),
                    }),
                }
            }
        }
    };
}

impl_from!(Float64, Tensor<f64>);
impl_from!(Float32, Tensor<f32>);
impl_from!(Int, Tensor<i64>);
impl_from!(String, Tensor<String>);
impl_from!(Bits, BitsTensor);
impl_from!(Complex, Tensor<Complex64>);

impl AnyTensor {
    /// Tensor of the given kind filled with default values.
    pub fn new(kind: ElementKind, shape: Shape) -> Self {
        match kind {
            ElementKind::Float64 => Tensor::<f64>::with_shape(shape).into(),
            ElementKind::Float32 => Tensor::<f32>::with_shape(shape).into(),
            ElementKind::Int => Tensor::<i64>::with_shape(shape).into(),
            ElementKind::String => Tensor::<String>::with_shape(shape).into(),
            ElementKind::Bits => BitsTensor::with_shape(shape).into(),
            ElementKind::Complex => Tensor::<Complex64>::with_shape(shape).into(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            AnyTensor::Float64(_) => ElementKind::Float64,
            AnyTensor::Float32(_) => ElementKind::Float32,
            AnyTensor::Int(_) => ElementKind::Int,
            AnyTensor::String(_) => ElementKind::String,
            AnyTensor::Bits(_) => ElementKind::Bits,
            AnyTensor::Complex(_) => ElementKind::Complex,
        }
    }

    pub fn shape(&self) -> &Shape {
        each!(self, t => t.shape())
    }

    pub fn len(&self) -> usize {
        each!(self, t => t.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_float64(&self) -> Option<&Tensor<f64>> {
        match self {
            AnyTensor::Float64(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_float64_mut(&mut self) -> Option<&mut Tensor<f64>> {
        match self {
            AnyTensor::Float64(t) => Some(t),
            _ => None,
        }
    }

    // -- element access ----------------------------------------------------

    pub fn float_1d(&self, i: usize) -> f64 {
        each!(self, t => t.float_1d(i))
    }

    pub fn set_float_1d(&mut self, i: usize, val: f64) {
        each!(self, t => t.set_float_1d(i, val))
    }

    pub fn string_1d(&self, i: usize) -> String {
        each!(self, t => t.string_1d(i))
    }

    pub fn set_string_1d(&mut self, i: usize, val: &str) {
        each!(self, t => t.set_string_1d(i, val))
    }

    pub fn float_row_cell(&self, row: usize, cell: usize) -> f64 {
        self.float_1d(self.row_cell_offset(row, cell))
    }

    pub fn set_float_row_cell(&mut self, row: usize, cell: usize, val: f64) {
        let off = self.row_cell_offset(row, cell);
        self.set_float_1d(off, val);
    }

    pub fn string_row_cell(&self, row: usize, cell: usize) -> String {
        self.string_1d(self.row_cell_offset(row, cell))
    }

    pub fn set_string_row_cell(&mut self, row: usize, cell: usize, val: &str) {
        let off = self.row_cell_offset(row, cell);
        self.set_string_1d(off, val);
    }

    fn row_cell_offset(&self, row: usize, cell: usize) -> usize {
        let (_, cells) = self.shape().row_cell_size();
        row * cells + cell
    }

    pub fn is_null_1d(&self, i: usize) -> bool {
        each!(self, t => t.is_null_1d(i))
    }

    pub fn set_null_1d(&mut self, i: usize, null: bool) {
        each!(self, t => t.set_null_1d(i, null))
    }

    pub fn floats(&self) -> Vec<f64> {
        each!(self, t => t.floats())
    }

    pub fn range(&self) -> ValueRange {
        each!(self, t => t.range())
    }

    pub fn eval(&self, fun: impl FnMut(usize, f64) -> f64) -> Vec<f64> {
        each!(self, t => t.eval(fun))
    }

    pub fn add_scalar(&mut self, index: &[usize], val: f64) -> f64 {
        let off = self.shape().offset(index) as usize;
        self.set_float_1d(off, self.float_1d(off) + val);
        self.float_1d(off)
    }

    pub fn mul_scalar(&mut self, index: &[usize], val: f64) -> f64 {
        let off = self.shape().offset(index) as usize;
        self.set_float_1d(off, self.float_1d(off) * val);
        self.float_1d(off)
    }

    // -- matrix access -----------------------------------------------------

    pub fn matrix_dims(&self) -> Result<(usize, usize), ShapeError> {
        self.shape().matrix_dims()
    }

    pub fn at(&self, i: usize, j: usize) -> Result<f64, ShapeError> {
        let off = self.shape().matrix_offset(i, j)?;
        Ok(self.float_1d(off))
    }

    pub fn symmetric_dim(&self) -> Result<usize, ShapeError> {
        self.shape().symmetric_dim()
    }

    // -- shape changes -----------------------------------------------------

    pub fn copy_shape_from<F: TensorAccess + ?Sized>(&mut self, from: &F) {
        let shape = from.shape().clone();
        each!(self, t => t.set_shape(shape))
    }

    pub fn reshape<D: Into<Vec<usize>>>(
        &mut self,
        dims: D,
        strides: Option<&[isize]>,
        names: Option<&[&str]>,
    ) -> Result<(), ShapeError> {
        let shape = Shape::new(dims, strides, names)?;
        each!(self, t => t.set_shape(shape));
        Ok(())
    }

    pub fn set_row_count(&mut self, rows: usize) {
        each!(self, t => t.set_row_count(rows))
    }

    pub fn add_rows(&mut self, n: usize) {
        each!(self, t => t.add_rows(n))
    }

    /// Owned copy of the sub-tensor at `outer` (see [`Tensor::view`]).
    pub fn sub_tensor(&self, outer: &[usize]) -> Result<AnyTensor, ShapeError> {
        Ok(match self {
            AnyTensor::Float64(t) => t.view(outer)?.to_owned_tensor().into(),
            AnyTensor::Float32(t) => t.view(outer)?.to_owned_tensor().into(),
            AnyTensor::Int(t) => t.view(outer)?.to_owned_tensor().into(),
            AnyTensor::String(t) => t.view(outer)?.to_owned_tensor().into(),
            AnyTensor::Bits(t) => t.view(outer)?.into(),
            AnyTensor::Complex(t) => t.view(outer)?.to_owned_tensor().into(),
        })
    }

    pub fn copy_from<F: TensorAccess + ?Sized>(&mut self, from: &F) {
        each!(self, t => t.copy_from(from))
    }

    pub fn copy_cells_from<F: TensorAccess + ?Sized>(
        &mut self,
        from: &F,
        to: usize,
        start: usize,
        n: usize,
    ) {
        each!(self, t => t.copy_cells_from(from, to, start, n))
    }

    // -- metadata ----------------------------------------------------------

    pub fn metadata(&self) -> &Metadata {
        each!(self, t => t.metadata())
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        each!(self, t => t.meta(key))
    }

    pub fn set_meta(&mut self, key: impl Into<String>, val: impl Into<String>) {
        each!(self, t => t.set_meta(key, val))
    }

    pub fn copy_metadata_from<F: TensorAccess + ?Sized>(&mut self, from: &F) {
        each!(self, t => t.copy_metadata_from(from))
    }
}

impl TensorAccess for AnyTensor {
    fn kind(&self) -> ElementKind {
        AnyTensor::kind(self)
    }

    fn shape(&self) -> &Shape {
        AnyTensor::shape(self)
    }

    fn len(&self) -> usize {
        AnyTensor::len(self)
    }

    fn float_1d(&self, i: usize) -> f64 {
        AnyTensor::float_1d(self, i)
    }

    fn string_1d(&self, i: usize) -> String {
        AnyTensor::string_1d(self, i)
    }

    fn is_null_1d(&self, i: usize) -> bool {
        AnyTensor::is_null_1d(self, i)
    }

    fn metadata(&self) -> &Metadata {
        AnyTensor::metadata(self)
    }

    fn typed_values(&self) -> TypedValues<'_> {
        each!(self, t => TensorAccess::typed_values(t))
    }
}

impl TensorAccessMut for AnyTensor {
    fn set_float_1d(&mut self, i: usize, val: f64) {
        AnyTensor::set_float_1d(self, i, val);
    }

    fn set_string_1d(&mut self, i: usize, val: &str) {
        AnyTensor::set_string_1d(self, i, val);
    }

    fn set_null_1d(&mut self, i: usize, null: bool) {
        AnyTensor::set_null_1d(self, i, null);
    }
}
