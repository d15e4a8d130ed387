pub mod access;
pub mod any;
pub mod bits;
pub mod bitslice;
pub mod buffer;
pub mod columnar;
pub mod element;
pub mod error;
pub mod meta;
pub mod shape;
pub mod tensor;

// Re-export commonly used types
pub use access::{TensorAccess, TensorAccessMut, ValueRange};
pub use any::AnyTensor;
pub use bits::BitsTensor;
pub use bitslice::BitSlice;
pub use buffer::Buffer;
pub use element::{Element, ElementKind, TypedValues};
pub use error::{ShapeError, TensorError};
pub use meta::{DisplayHints, Metadata};
pub use shape::{column_major_strides, row_major_strides, Layout, Shape};
pub use tensor::{Tensor, TensorView, TensorViewMut};
