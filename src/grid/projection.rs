// src/grid/projection.rs
//
// Proyección de un shape n-dimensional (1..=5 dims) a una rejilla 2D.

use serde::Serialize;

use crate::core::access::{TensorAccess, TensorAccessMut};
use crate::core::error::ShapeError;
use crate::core::shape::{Layout, Shape};

/// Size of the 2-D grid a shape projects to.
///
/// `extra_row_groups` / `extra_col_groups` count the groups formed by the
/// outer dims folded into each axis (0 when only one dim maps to the axis);
/// renderers draw a separator between consecutive groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grid2D {
    pub rows: usize,
    pub cols: usize,
    pub extra_row_groups: usize,
    pub extra_col_groups: usize,
}

impl Grid2D {
    const FALLBACK: Grid2D = Grid2D {
        rows: 1,
        cols: 1,
        extra_row_groups: 0,
        extra_col_groups: 0,
    };

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Rows per row group (the size of the innermost row dim).
    pub fn rows_per_group(&self) -> usize {
        if self.extra_row_groups == 0 {
            self.rows
        } else {
            self.rows / self.extra_row_groups
        }
    }

    pub fn cols_per_group(&self) -> usize {
        if self.extra_col_groups == 0 {
            self.cols
        } else {
            self.cols / self.extra_col_groups
        }
    }
}

/// Axis assignment for a shape, expressed on row-major-ordered dims.
/// Column-major shapes are handled by reversing their dims, which turns
/// them into the equivalent row-major problem.
struct Plan<'a> {
    dims: Vec<usize>,
    reversed: bool,
    row_axes: &'a [usize],
    col_axes: &'a [usize],
}

/// Row and column axes, outer to inner. An odd outer dim goes to the side
/// selected by `fold_into_rows`; even pairs alternate row, col.
fn axes(nd: usize, fold_into_rows: bool) -> Option<(&'static [usize], &'static [usize])> {
    let pair: (&'static [usize], &'static [usize]) = match (nd, fold_into_rows) {
        (1, true) => (&[0], &[]),
        (1, false) => (&[], &[0]),
        (2, _) => (&[0], &[1]),
        (3, true) => (&[0, 1], &[2]),
        (3, false) => (&[1], &[0, 2]),
        (4, _) => (&[0, 2], &[1, 3]),
        (5, true) => (&[0, 1, 3], &[2, 4]),
        (5, false) => (&[1, 3], &[0, 2, 4]),
        _ => return None,
    };
    Some(pair)
}

fn plan(shape: &Shape, fold_into_rows: bool) -> Result<Plan<'static>, ShapeError> {
    let nd = shape.num_dims();
    let (row_axes, col_axes) = axes(nd, fold_into_rows).ok_or_else(|| {
        ShapeError::UnsupportedLayout(format!("2-D projection of {} dims", nd))
    })?;
    let layout = shape.layout().ok_or_else(|| {
        ShapeError::UnsupportedLayout(format!(
            "2-D projection of custom strides {:?}",
            shape.strides()
        ))
    })?;
    let mut dims = shape.dims().to_vec();
    let reversed = layout == Layout::ColumnMajor;
    if reversed {
        dims.reverse();
    }
    Ok(Plan {
        dims,
        reversed,
        row_axes,
        col_axes,
    })
}

impl Plan<'_> {
    fn extent(&self, axes: &[usize]) -> usize {
        axes.iter().map(|&a| self.dims[a]).product()
    }

    fn groups(&self, axes: &[usize]) -> usize {
        match axes.split_last() {
            Some((_, outer)) if !outer.is_empty() => self.extent(outer),
            _ => 0,
        }
    }

    fn grid(&self) -> Grid2D {
        Grid2D {
            rows: self.extent(self.row_axes),
            cols: self.extent(self.col_axes),
            extra_row_groups: self.groups(self.row_axes),
            extra_col_groups: self.groups(self.col_axes),
        }
    }

    /// Full index, in the shape's own axis order.
    fn index(&self, row: usize, col: usize) -> Vec<usize> {
        let mut idx = vec![0; self.dims.len()];
        let mut split = |mut rem: usize, axes: &[usize]| {
            for &a in axes.iter().rev() {
                idx[a] = rem % self.dims[a];
                rem /= self.dims[a];
            }
        };
        split(row, self.row_axes);
        split(col, self.col_axes);
        if self.reversed {
            idx.reverse();
        }
        idx
    }

    /// Axes of the shape's own order assigned to `axes`, ascending.
    fn original_axes(&self, axes: &[usize]) -> Vec<usize> {
        let nd = self.dims.len();
        let mut out: Vec<usize> = axes
            .iter()
            .map(|&a| if self.reversed { nd - 1 - a } else { a })
            .collect();
        out.sort_unstable();
        out
    }
}

/// Size of the 2-D projection of `shape`. Returns a 1x1 grid with no extra
/// groups for empty shapes, unsupported dimensionalities (outside 1..=5)
/// and custom stride layouts.
///
/// Extra groups on an axis are the product of every dim folded into it
/// except the innermost. For 5-D shapes this gives `d2` column groups when
/// folding into rows and `d0 * d2` when folding into columns.
pub fn shape_2d(shape: &Shape, fold_into_rows: bool) -> Grid2D {
    if shape.element_count() == 0 {
        return Grid2D::FALLBACK;
    }
    match plan(shape, fold_into_rows) {
        Ok(p) => p.grid(),
        Err(_) => Grid2D::FALLBACK,
    }
}

fn checked_index(
    shape: &Shape,
    fold_into_rows: bool,
    row: usize,
    col: usize,
) -> Result<(Plan<'static>, Vec<usize>), ShapeError> {
    let p = plan(shape, fold_into_rows)?;
    let grid = p.grid();
    if shape.element_count() == 0 || row >= grid.rows || col >= grid.cols {
        return Err(ShapeError::IndexOutOfRange {
            index: vec![row, col],
            dims: vec![grid.rows, grid.cols],
        });
    }
    let idx = p.index(row, col);
    Ok((p, idx))
}

/// Flat offset of grid cell `(row, col)`.
pub fn flat_index(
    shape: &Shape,
    fold_into_rows: bool,
    row: usize,
    col: usize,
) -> Result<usize, ShapeError> {
    let (_, idx) = checked_index(shape, fold_into_rows, row, col)?;
    Ok(shape.offset(&idx) as usize)
}

/// Full coordinates of grid cell `(row, col)`, split into the coordinates
/// of the axes mapped to rows and those mapped to columns. Each part lists
/// its axes in ascending axis order. For 1-D shapes the unused side is `[0]`.
pub fn coords(
    shape: &Shape,
    fold_into_rows: bool,
    row: usize,
    col: usize,
) -> Result<(Vec<usize>, Vec<usize>), ShapeError> {
    let (p, idx) = checked_index(shape, fold_into_rows, row, col)?;
    let pick = |axes: &[usize]| -> Vec<usize> {
        if axes.is_empty() {
            return vec![0];
        }
        p.original_axes(axes).into_iter().map(|a| idx[a]).collect()
    };
    Ok((pick(p.row_axes), pick(p.col_axes)))
}

/// Float value at grid cell `(row, col)`.
pub fn value_at<A: TensorAccess + ?Sized>(
    tsr: &A,
    fold_into_rows: bool,
    row: usize,
    col: usize,
) -> Result<f64, ShapeError> {
    let i = flat_index(tsr.shape(), fold_into_rows, row, col)?;
    Ok(tsr.float_1d(i))
}

/// String value at grid cell `(row, col)`.
pub fn string_at<A: TensorAccess + ?Sized>(
    tsr: &A,
    fold_into_rows: bool,
    row: usize,
    col: usize,
) -> Result<String, ShapeError> {
    let i = flat_index(tsr.shape(), fold_into_rows, row, col)?;
    Ok(tsr.string_1d(i))
}

pub fn set_value_at<A: TensorAccessMut + ?Sized>(
    tsr: &mut A,
    fold_into_rows: bool,
    row: usize,
    col: usize,
    val: f64,
) -> Result<(), ShapeError> {
    let i = flat_index(tsr.shape(), fold_into_rows, row, col)?;
    tsr.set_float_1d(i, val);
    Ok(())
}
