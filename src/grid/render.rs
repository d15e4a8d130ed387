// src/grid/render.rs
//
// Representación en texto de un tensor a través de su proyección 2D.

use std::fmt;

use colored::*;
use tracing::debug;

use super::config::GridConfig;
use super::projection::{coords, flat_index, shape_2d};
use crate::core::access::TensorAccess;
use crate::core::any::AnyTensor;
use crate::core::bits::BitsTensor;
use crate::core::element::{Element, ElementKind};
use crate::core::error::ShapeError;
use crate::core::meta::DisplayHints;
use crate::core::tensor::Tensor;

const CELL_WIDTH: usize = 7;

struct GridRow {
    group: usize,
    coords: Vec<usize>,
    cells: Vec<usize>,
}

/// Display adapter printing a tensor's label followed by its 2-D grid.
///
/// Metadata hints on the tensor (`odd-row`, `top-zero`, `precision`)
/// override `cfg`.
pub struct GridDisplay<'a, A: TensorAccess + ?Sized> {
    tsr: &'a A,
    cfg: GridConfig,
}

impl<'a, A: TensorAccess + ?Sized> GridDisplay<'a, A> {
    pub fn new(tsr: &'a A, cfg: &GridConfig) -> Self {
        let hints = DisplayHints::from_metadata(tsr.metadata());
        Self {
            tsr,
            cfg: cfg.with_hints(&hints),
        }
    }

    /// Uncolored, default settings: the form used by `Display`.
    pub fn plain(tsr: &'a A) -> Self {
        let cfg = GridConfig {
            color: false,
            ..GridConfig::default()
        };
        Self::new(tsr, &cfg)
    }

    fn cell(&self, i: usize) -> String {
        if self.tsr.is_null_1d(i) {
            return "null".to_string();
        }
        match self.tsr.kind() {
            ElementKind::String | ElementKind::Bits | ElementKind::Complex => {
                self.tsr.string_1d(i)
            }
            _ => {
                let v = self.tsr.float_1d(i);
                match self.cfg.precision {
                    Some(p) => format!("{:.*}", p, v),
                    None => v.to_string(),
                }
            }
        }
    }

    fn label(&self) -> String {
        format!("{}: {}", self.tsr.kind().label(), self.tsr.shape())
    }

    /// Grid rows in display order. Fails for shapes the projection does
    /// not cover: custom strides and ranks outside 1..=5 (scalars included).
    fn grid_rows(&self) -> Result<Vec<GridRow>, ShapeError> {
        let shape = self.tsr.shape();
        let fold = self.cfg.fold_into_rows;
        if !(1..=5).contains(&shape.num_dims()) {
            return Err(ShapeError::UnsupportedLayout(format!(
                "2-D projection of {} dims",
                shape.num_dims()
            )));
        }
        let grid = shape_2d(shape, fold);
        let rows_per_group = grid.rows_per_group().max(1);
        let order: Box<dyn Iterator<Item = usize>> = if self.cfg.top_zero {
            Box::new(0..grid.rows)
        } else {
            Box::new((0..grid.rows).rev())
        };
        order
            .map(|r| -> Result<GridRow, ShapeError> {
                let (rc, _) = coords(shape, fold, r, 0)?;
                let cells = (0..grid.cols)
                    .map(|c| flat_index(shape, fold, r, c))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GridRow {
                    group: r / rows_per_group,
                    coords: rc,
                    cells,
                })
            })
            .collect()
    }

    /// Values in storage order, for layouts the projection cannot handle.
    fn write_flat(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = (0..self.tsr.len()).map(|i| self.cell(i)).collect();
        writeln!(f, "[{}]", cells.join(", "))
    }
}

impl<A: TensorAccess + ?Sized> fmt::Display for GridDisplay<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label();
        if self.cfg.color {
            write!(f, "{}", label.bold())?;
        } else {
            write!(f, "{}", label)?;
        }
        let len = self.tsr.len();
        if len == 0 || len > self.cfg.max_cells {
            return Ok(());
        }
        writeln!(f)?;

        let rows = match self.grid_rows() {
            Ok(rows) => rows,
            Err(e) => {
                debug!(error = %e, "no 2-D projection, printing flat");
                return self.write_flat(f);
            }
        };
        let cols_per_group = shape_2d(self.tsr.shape(), self.cfg.fold_into_rows)
            .cols_per_group()
            .max(1);

        let mut last_group = None;
        for row in rows {
            if last_group.is_some_and(|g| g != row.group) {
                writeln!(f)?;
            }
            last_group = Some(row.group);

            let row_label = format!("{:?}:", row.coords);
            if self.cfg.color {
                write!(f, "{}", row_label.cyan())?;
            } else {
                write!(f, "{}", row_label)?;
            }
            for (c, &i) in row.cells.iter().enumerate() {
                if c > 0 && c % cols_per_group == 0 {
                    if self.cfg.color {
                        write!(f, " {}", "|".dimmed())?;
                    } else {
                        write!(f, " |")?;
                    }
                }
                write!(f, " {:>width$}", self.cell(i), width = CELL_WIDTH)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Renders with the given configuration.
pub fn render<A: TensorAccess + ?Sized>(tsr: &A, cfg: &GridConfig) -> String {
    GridDisplay::new(tsr, cfg).to_string()
}

impl<T: Element, B: AsRef<[T]>> fmt::Display for Tensor<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&GridDisplay::plain(self), f)
    }
}

impl fmt::Display for BitsTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&GridDisplay::plain(self), f)
    }
}

impl fmt::Display for AnyTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&GridDisplay::plain(self), f)
    }
}
