// src/core/meta.rs

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

/// Free-form key/value metadata attached to a tensor.
pub type Metadata = BTreeMap<String, String>;

pub const NAME: &str = "name";
pub const DESC: &str = "desc";
/// `+` draws row 0 at the top, `-` at the bottom.
pub const TOP_ZERO: &str = "top-zero";
/// `+` folds an odd outer dimension into rows, `-` into columns.
pub const ODD_ROW: &str = "odd-row";
pub const IMAGE: &str = "image";
/// Fixed display minimum.
pub const MIN: &str = "min";
/// Fixed display maximum.
pub const MAX: &str = "max";
pub const COLORMAP: &str = "colormap";
pub const BACKGROUND: &str = "background";
pub const GRID_FILL: &str = "grid-fill";
pub const PRECISION: &str = "precision";

/// Merges every entry of `from` into `to`, overwriting existing keys.
pub fn merge_metadata(to: &mut Metadata, from: &Metadata) {
    for (k, v) in from {
        to.insert(k.clone(), v.clone());
    }
}

/// Display hints parsed from tensor metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayHints {
    pub name: Option<String>,
    pub top_zero: Option<bool>,
    pub odd_row: Option<bool>,
    pub image: Option<bool>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub colormap: Option<String>,
    pub background: Option<String>,
    pub grid_fill: Option<f64>,
    pub precision: Option<usize>,
}

impl DisplayHints {
    /// Unparsable hint values are logged and ignored.
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            name: meta.get(NAME).cloned(),
            top_zero: flag(meta, TOP_ZERO),
            odd_row: flag(meta, ODD_ROW),
            image: flag(meta, IMAGE),
            min: number(meta, MIN),
            max: number(meta, MAX),
            colormap: meta.get(COLORMAP).cloned(),
            background: meta.get(BACKGROUND).cloned(),
            grid_fill: number(meta, GRID_FILL),
            precision: number(meta, PRECISION),
        }
    }
}

fn flag(meta: &Metadata, key: &str) -> Option<bool> {
    let raw = meta.get(key)?;
    match raw.trim() {
        "+" | "true" | "1" => Some(true),
        "-" | "false" | "0" => Some(false),
        other => {
            warn!(key, value = other, "ignoring unparsable display hint");
            None
        }
    }
}

fn number<N: std::str::FromStr>(meta: &Metadata, key: &str) -> Option<N> {
    let raw = meta.get(key)?;
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(key, value = raw.as_str(), "ignoring unparsable display hint");
            None
        }
    }
}
