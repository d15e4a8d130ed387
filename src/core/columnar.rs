// src/core/columnar.rs
//
// Conversión entre tensores y arrays de Apache Arrow.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int64Array, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use super::any::AnyTensor;
use super::bitslice::BitSlice;
use super::bits::BitsTensor;
use super::element::Element;
use super::error::{ShapeError, TensorError};
use super::shape::Shape;
use super::tensor::Tensor;

/// Field metadata key holding the JSON-encoded tensor shape.
pub const SHAPE_KEY: &str = "tensorgrid.shape";

fn with_nulls<T: Element>(t: &Tensor<T>) -> Vec<Option<T>> {
    t.values()
        .iter()
        .enumerate()
        .map(|(i, v)| (!t.is_null_1d(i)).then(|| v.clone()))
        .collect()
}

fn fill<T: Element>(
    shape: Shape,
    value: impl Fn(usize) -> T,
    is_null: impl Fn(usize) -> bool,
) -> Result<Tensor<T>, ShapeError> {
    let len = shape.element_count();
    let mut t = Tensor::from_vec(shape, (0..len).map(value).collect())?;
    for i in (0..len).filter(|&i| is_null(i)) {
        t.set_null_1d(i, true);
    }
    Ok(t)
}

fn downcast<'a, A: 'static>(array: &'a dyn Array) -> Result<&'a A, TensorError> {
    array
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| TensorError::UnsupportedArrowType(format!("{:?}", array.data_type())))
}

impl AnyTensor {
    /// Flat arrow array of the values; null flags become arrow nulls.
    /// Complex tensors have no arrow counterpart.
    pub fn to_arrow(&self) -> Result<ArrayRef, TensorError> {
        let array: ArrayRef = match self {
            AnyTensor::Float64(t) => Arc::new(Float64Array::from(with_nulls(t))),
            AnyTensor::Float32(t) => Arc::new(Float32Array::from(with_nulls(t))),
            AnyTensor::Int(t) => Arc::new(Int64Array::from(with_nulls(t))),
            AnyTensor::String(t) => Arc::new(StringArray::from(with_nulls(t))),
            AnyTensor::Bits(t) => Arc::new(BooleanArray::from(t.bits().to_bools())),
            AnyTensor::Complex(_) => {
                return Err(TensorError::UnsupportedArrowType(
                    "complex tensors".to_string(),
                ))
            }
        };
        Ok(array)
    }

    /// Builds a tensor of the given shape from a flat arrow array.
    /// Narrower integer and float types are widened first.
    pub fn from_arrow(array: &dyn Array, shape: Shape) -> Result<AnyTensor, TensorError> {
        let expected = shape.element_count();
        if array.len() != expected {
            return Err(ShapeError::ValueCountMismatch {
                expected,
                actual: array.len(),
            }
            .into());
        }
        let tensor: AnyTensor = match array.data_type() {
            DataType::Float64 => {
                let a = downcast::<Float64Array>(array)?;
                fill(shape, |i| a.value(i), |i| a.is_null(i))?.into()
            }
            DataType::Float32 => {
                let a = downcast::<Float32Array>(array)?;
                fill(shape, |i| a.value(i), |i| a.is_null(i))?.into()
            }
            DataType::Int64 => {
                let a = downcast::<Int64Array>(array)?;
                fill(shape, |i| a.value(i), |i| a.is_null(i))?.into()
            }
            DataType::Utf8 => {
                let a = downcast::<StringArray>(array)?;
                fill(shape, |i| a.value(i).to_string(), |i| a.is_null(i))?.into()
            }
            // bits carry no nulls; arrow nulls read as false
            DataType::Boolean => {
                let a = downcast::<BooleanArray>(array)?;
                let mut bits = BitSlice::new(expected);
                for i in 0..expected {
                    bits.set(i, a.is_valid(i) && a.value(i));
                }
                BitsTensor::from_bits(shape, bits)?.into()
            }
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => {
                let wide = arrow::compute::cast(array, &DataType::Int64)?;
                return AnyTensor::from_arrow(wide.as_ref(), shape);
            }
            DataType::Float16 => {
                let wide = arrow::compute::cast(array, &DataType::Float32)?;
                return AnyTensor::from_arrow(wide.as_ref(), shape);
            }
            DataType::LargeUtf8 => {
                let narrow = arrow::compute::cast(array, &DataType::Utf8)?;
                return AnyTensor::from_arrow(narrow.as_ref(), shape);
            }
            other => return Err(TensorError::UnsupportedArrowType(format!("{:?}", other))),
        };
        Ok(tensor)
    }

    /// Single-column record batch; the shape travels in the field metadata.
    pub fn to_record_batch(&self, column: &str) -> Result<RecordBatch, TensorError> {
        let array = self.to_arrow()?;
        let mut meta = HashMap::new();
        meta.insert(SHAPE_KEY.to_string(), serde_json::to_string(self.shape())?);
        let field =
            Field::new(column, array.data_type().clone(), array.null_count() > 0).with_metadata(meta);
        let batch = RecordBatch::try_new(Arc::new(Schema::new(vec![field])), vec![array])?;
        Ok(batch)
    }

    /// Reads `column` back from a batch written by [`AnyTensor::to_record_batch`].
    /// Columns without shape metadata load as 1-D.
    pub fn from_record_batch(batch: &RecordBatch, column: &str) -> Result<AnyTensor, TensorError> {
        let schema = batch.schema();
        let idx = schema.index_of(column)?;
        let array = batch.column(idx);
        let shape = match schema.field(idx).metadata().get(SHAPE_KEY) {
            Some(json) => serde_json::from_str(json)?,
            None => Shape::row_major(vec![array.len()]),
        };
        AnyTensor::from_arrow(array.as_ref(), shape)
    }
}
