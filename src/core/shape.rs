// src/core/shape.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ShapeError;

/// Representa la forma (shape) de un tensor: tamaño, stride y nombre por dimensión.
/// []        -> escalar (rank 0)
/// [3]       -> vector (rank 1)
/// [2, 3]    -> matriz 2x3 (rank 2)
///
/// Row-major shapes have the last axis contiguous, column-major shapes the
/// first. Any other stride vector is a custom layout: offsets work, but
/// views and 2-D projection reject it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawShape")]
pub struct Shape {
    dims: Vec<usize>,
    strides: Vec<isize>,
    names: Vec<String>,
}

#[derive(Deserialize)]
struct RawShape {
    dims: Vec<usize>,
    #[serde(default)]
    strides: Option<Vec<isize>>,
    #[serde(default)]
    names: Option<Vec<String>>,
}

impl TryFrom<RawShape> for Shape {
    type Error = ShapeError;

    fn try_from(raw: RawShape) -> Result<Self, Self::Error> {
        let names: Option<Vec<&str>> = raw
            .names
            .as_ref()
            .map(|n| n.iter().map(String::as_str).collect());
        Shape::new(raw.dims, raw.strides.as_deref(), names.as_deref())
    }
}

/// Orden de recorrido de un shape, determinado estructuralmente por sus strides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    RowMajor,
    ColumnMajor,
}

impl Shape {
    /// Crea un shape. Sin strides se infieren strides row-major,
    /// sin nombres se usan nombres vacíos.
    pub fn new<D: Into<Vec<usize>>>(
        dims: D,
        strides: Option<&[isize]>,
        names: Option<&[&str]>,
    ) -> Result<Self, ShapeError> {
        let dims = dims.into();
        let strides = match strides {
            Some(s) if s.len() != dims.len() => {
                return Err(ShapeError::LengthMismatch {
                    what: "strides",
                    expected: dims.len(),
                    actual: s.len(),
                })
            }
            Some(s) => s.to_vec(),
            None => row_major_strides(&dims),
        };
        let names = match names {
            Some(n) if n.len() != dims.len() => {
                return Err(ShapeError::LengthMismatch {
                    what: "names",
                    expected: dims.len(),
                    actual: n.len(),
                })
            }
            Some(n) => n.iter().map(|s| s.to_string()).collect(),
            None => vec![String::new(); dims.len()],
        };
        Ok(Self {
            dims,
            strides,
            names,
        })
    }

    /// Shape row-major sin nombres.
    pub fn row_major<D: Into<Vec<usize>>>(dims: D) -> Self {
        let dims = dims.into();
        let strides = row_major_strides(&dims);
        let names = vec![String::new(); dims.len()];
        Self {
            dims,
            strides,
            names,
        }
    }

    /// Shape column-major sin nombres.
    pub fn column_major<D: Into<Vec<usize>>>(dims: D) -> Self {
        let dims = dims.into();
        let strides = column_major_strides(&dims);
        let names = vec![String::new(); dims.len()];
        Self {
            dims,
            strides,
            names,
        }
    }

    /// Replaces the dimension names.
    pub fn with_names(mut self, names: &[&str]) -> Result<Self, ShapeError> {
        if names.len() != self.dims.len() {
            return Err(ShapeError::LengthMismatch {
                what: "names",
                expected: self.dims.len(),
                actual: names.len(),
            });
        }
        self.names = names.iter().map(|s| s.to_string()).collect();
        Ok(self)
    }

    /// Builds a shape of `a`'s dims followed by `b`'s dims, using the
    /// stride convention of `a`.
    pub fn concat(a: &Shape, b: &Shape) -> Shape {
        let mut dims = a.dims.clone();
        dims.extend_from_slice(&b.dims);
        let strides = if a.is_row_major() {
            row_major_strides(&dims)
        } else {
            column_major_strides(&dims)
        };
        let mut names = a.names.clone();
        names.extend_from_slice(&b.names);
        Shape {
            dims,
            strides,
            names,
        }
    }

    /// Número de dimensiones (rank)
    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn dim(&self, i: usize) -> usize {
        self.dims[i]
    }

    pub fn dim_name(&self, i: usize) -> &str {
        &self.names[i]
    }

    /// Número total de elementos: 1 para un escalar, 0 si alguna dimensión es 0.
    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Flat offset of `index`. Not bounds checked: callers guarantee
    /// `index.len() == num_dims()` and every component is within its dim.
    #[inline]
    pub fn offset(&self, index: &[usize]) -> isize {
        debug_assert_eq!(index.len(), self.dims.len());
        index
            .iter()
            .zip(&self.strides)
            .map(|(&i, &s)| i as isize * s)
            .sum()
    }

    /// Bounds-checked variant of [`Shape::offset`].
    pub fn try_offset(&self, index: &[usize]) -> Result<usize, ShapeError> {
        if index.len() != self.dims.len() {
            return Err(ShapeError::LengthMismatch {
                what: "index",
                expected: self.dims.len(),
                actual: index.len(),
            });
        }
        if !self.index_is_valid(index) {
            return Err(ShapeError::IndexOutOfRange {
                index: index.to_vec(),
                dims: self.dims.clone(),
            });
        }
        let off = self.offset(index);
        usize::try_from(off).map_err(|_| ShapeError::IndexOutOfRange {
            index: index.to_vec(),
            dims: self.dims.clone(),
        })
    }

    pub fn index_is_valid(&self, index: &[usize]) -> bool {
        index.len() == self.dims.len() && index.iter().zip(&self.dims).all(|(&i, &d)| i < d)
    }

    /// Inverse of [`Shape::offset`]; only defined for row- or column-major shapes.
    pub fn index_from_offset(&self, flat: usize) -> Result<Vec<usize>, ShapeError> {
        let layout = self.layout().ok_or_else(|| {
            ShapeError::UnsupportedLayout(format!(
                "index_from_offset on custom strides {:?}",
                self.strides
            ))
        })?;
        if flat >= self.element_count() {
            return Err(ShapeError::IndexOutOfRange {
                index: vec![flat],
                dims: self.dims.clone(),
            });
        }
        let nd = self.dims.len();
        let mut index = vec![0; nd];
        let mut rem = flat;
        let mut step = |i: usize| {
            let s = self.dims[i];
            index[i] = rem % s;
            rem /= s;
        };
        match layout {
            Layout::RowMajor => (0..nd).rev().for_each(&mut step),
            Layout::ColumnMajor => (0..nd).for_each(&mut step),
        }
        Ok(index)
    }

    pub fn is_row_major(&self) -> bool {
        row_major_strides(&self.dims) == self.strides
    }

    pub fn is_column_major(&self) -> bool {
        column_major_strides(&self.dims) == self.strides
    }

    pub fn is_contiguous(&self) -> bool {
        self.is_row_major() || self.is_column_major()
    }

    /// Row-major wins when a shape satisfies both conventions (e.g. 1-D).
    pub fn layout(&self) -> Option<Layout> {
        if self.is_row_major() {
            Some(Layout::RowMajor)
        } else if self.is_column_major() {
            Some(Layout::ColumnMajor)
        } else {
            None
        }
    }

    /// Dims and strides equal; names are ignored.
    pub fn same_layout(&self, other: &Shape) -> bool {
        self.dims == other.dims && self.strides == other.strides
    }

    /// Size of the outer-most (row) dimension and of all inner dims (the
    /// per-row "cell"). Intended for row-major shapes.
    pub fn row_cell_size(&self) -> (usize, usize) {
        match self.dims.split_first() {
            Some((&rows, inner)) => (rows, inner.iter().product()),
            None => (1, 1),
        }
    }

    /// Rows and columns of the matrix formed by the last two dims.
    pub fn matrix_dims(&self) -> Result<(usize, usize), ShapeError> {
        match self.dims.as_slice() {
            [.., r, c] => Ok((*r, *c)),
            _ => Err(ShapeError::UnsupportedLayout(format!(
                "matrix access on {} dims",
                self.dims.len()
            ))),
        }
    }

    /// Side of the square matrix formed by the last two dims.
    pub fn symmetric_dim(&self) -> Result<usize, ShapeError> {
        let (r, c) = self.matrix_dims()?;
        if r != c {
            return Err(ShapeError::UnsupportedLayout(format!(
                "matrix {}x{} is not square",
                r, c
            )));
        }
        Ok(r)
    }

    /// Checked flat offset of matrix cell `(i, j)`; leading dims are held at 0.
    pub fn matrix_offset(&self, i: usize, j: usize) -> Result<usize, ShapeError> {
        let nd = self.dims.len();
        if nd < 2 {
            return Err(ShapeError::UnsupportedLayout(format!(
                "matrix access on {} dims",
                nd
            )));
        }
        let mut index = vec![0; nd];
        index[nd - 2] = i;
        index[nd - 1] = j;
        self.try_offset(&index)
    }

    pub fn dim_index_by_name(&self, name: &str) -> Result<usize, ShapeError> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| ShapeError::NameNotFound(name.to_string()))
    }

    pub fn dim_by_name(&self, name: &str) -> Result<usize, ShapeError> {
        Ok(self.dims[self.dim_index_by_name(name)?])
    }

    /// Offset for an index given in the order of `names`.
    pub fn offset_by_name(&self, names: &[&str], index: &[usize]) -> Result<isize, ShapeError> {
        if names.len() != self.dims.len() || index.len() != self.dims.len() {
            return Err(ShapeError::LengthMismatch {
                what: "names",
                expected: self.dims.len(),
                actual: names.len().min(index.len()),
            });
        }
        let mut ordered = vec![0; self.dims.len()];
        for (name, &i) in names.iter().zip(index) {
            ordered[self.dim_index_by_name(name)?] = i;
        }
        Ok(self.offset(&ordered))
    }

    /// Sets the outer-most dim; strides stay valid for row-major shapes.
    pub(crate) fn set_outer_dim(&mut self, rows: usize) {
        if let Some(d) = self.dims.first_mut() {
            *d = rows;
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (d, n)) in self.dims.iter().zip(&self.names).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if !n.is_empty() {
                write!(f, "{}: ", n)?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

/// Strides with the first dimension outer-most: `stride[last] = 1`.
pub fn row_major_strides(dims: &[usize]) -> Vec<isize> {
    let mut strides = vec![1isize; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1] as isize;
    }
    strides
}

/// Strides with the first dimension inner-most: `stride[0] = 1`.
pub fn column_major_strides(dims: &[usize]) -> Vec<isize> {
    let mut strides = vec![1isize; dims.len()];
    for i in 1..dims.len() {
        strides[i] = strides[i - 1] * dims[i - 1] as isize;
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_offset_and_inverse() {
        let sh = Shape::new(vec![2, 3], None, None).unwrap();
        assert_eq!(sh.strides(), &[3, 1]);
        assert_eq!(sh.offset(&[1, 2]), 5);
        assert_eq!(sh.index_from_offset(5).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_column_major_strides() {
        let sh = Shape::column_major(vec![2, 3, 4]);
        assert_eq!(sh.strides(), &[1, 2, 6]);
        assert!(sh.is_column_major());
        assert!(!sh.is_row_major());
        assert_eq!(sh.index_from_offset(sh.offset(&[1, 2, 3]) as usize).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_scalar_and_empty() {
        let scalar = Shape::row_major(Vec::new());
        assert_eq!(scalar.element_count(), 1);
        assert_eq!(scalar.row_cell_size(), (1, 1));

        let empty = Shape::row_major(vec![3, 0, 2]);
        assert_eq!(empty.element_count(), 0);
        assert!(empty.index_from_offset(0).is_err());
    }

    #[test]
    fn test_custom_strides_not_contiguous() {
        let sh = Shape::new(vec![2, 2], Some(&[4, 1][..]), None).unwrap();
        assert!(!sh.is_contiguous());
        assert_eq!(sh.offset(&[1, 1]), 5);
        assert!(matches!(
            sh.index_from_offset(1),
            Err(ShapeError::UnsupportedLayout(_))
        ));
    }

    #[test]
    fn test_matrix_helpers() {
        let sh = Shape::row_major(vec![2, 3, 3]);
        assert_eq!(sh.matrix_dims().unwrap(), (3, 3));
        assert_eq!(sh.symmetric_dim().unwrap(), 3);
        assert_eq!(sh.matrix_offset(1, 2).unwrap(), 5);
        assert!(sh.matrix_offset(3, 0).is_err());
        assert!(Shape::row_major(vec![4]).matrix_dims().is_err());
        assert!(matches!(
            Shape::row_major(vec![2, 3]).symmetric_dim(),
            Err(ShapeError::UnsupportedLayout(_))
        ));
    }

    #[test]
    fn test_display() {
        let sh = Shape::row_major(vec![2, 3]).with_names(&["row", ""]).unwrap();
        assert_eq!(sh.to_string(), "[row: 2, 3]");
    }
}
