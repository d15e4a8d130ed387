//! Property-based tests for shapes, resizing, views and 2-D projection.

use proptest::prelude::*;
use tensorgrid::{flat_index, shape_2d, Shape, Tensor};

// ============================================================================
// Strategies
// ============================================================================

/// Dims of rank 1..=5 with small, non-zero sizes.
fn dims_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..5, 1..=5)
}

/// A shape with either row- or column-major strides.
fn shape_strategy() -> impl Strategy<Value = Shape> {
    (dims_strategy(), any::<bool>()).prop_map(|(dims, row_major)| {
        if row_major {
            Shape::row_major(dims)
        } else {
            Shape::column_major(dims)
        }
    })
}

/// A shape plus a valid multi-index into it.
fn shape_and_index() -> impl Strategy<Value = (Shape, Vec<usize>)> {
    shape_strategy().prop_flat_map(|shape| {
        let idx: Vec<_> = shape.dims().iter().map(|&d| 0..d).collect();
        (Just(shape), idx)
    })
}

// ============================================================================
// Shape properties
// ============================================================================

proptest! {
    /// index_from_offset inverts offset for contiguous layouts.
    #[test]
    fn prop_offset_round_trip((shape, idx) in shape_and_index()) {
        let off = shape.offset(&idx);
        prop_assert!(off >= 0);
        prop_assert_eq!(shape.index_from_offset(off as usize).unwrap(), idx);
    }

    /// Both stride conventions address exactly element_count slots from 0.
    #[test]
    fn prop_stride_equivalence(dims in dims_strategy()) {
        for shape in [Shape::row_major(dims.clone()), Shape::column_major(dims.clone())] {
            let zero = vec![0; dims.len()];
            prop_assert_eq!(shape.offset(&zero), 0);
            let last: Vec<usize> = dims.iter().map(|d| d - 1).collect();
            prop_assert_eq!(shape.offset(&last) as usize, shape.element_count() - 1);
        }
    }
}

// ============================================================================
// Tensor properties
// ============================================================================

proptest! {
    /// Growing keeps the old prefix; shrinking then regrowing restores it.
    #[test]
    fn prop_reshape_preserves_prefix(
        rows in 1usize..6,
        cols in 1usize..6,
        new_rows in 1usize..10,
    ) {
        let n = rows * cols;
        let vals: Vec<f64> = (0..n).map(|i| i as f64 * 0.5).collect();
        let mut t = Tensor::from_vec(Shape::row_major(vec![rows, cols]), vals.clone()).unwrap();

        t.set_row_count(new_rows);
        let keep = n.min(new_rows * cols);
        prop_assert_eq!(&t.values()[..keep], &vals[..keep]);

        t.set_row_count(rows);
        if new_rows <= rows {
            prop_assert_eq!(t.values(), &vals[..]);
        } else {
            prop_assert_eq!(&t.values()[..n], &vals[..]);
        }
    }

    /// Values written through a view land at the matching parent index.
    #[test]
    fn prop_view_aliases_parent((shape, idx) in shape_and_index().prop_filter("rank >= 2", |(s, _)| s.num_dims() >= 2)) {
        let mut t = Tensor::<f64>::with_shape(shape.clone());
        let col_major = !shape.is_row_major();
        let (outer, inner): (Vec<usize>, Vec<usize>) = if col_major {
            (idx[idx.len() - 1..].to_vec(), idx[..idx.len() - 1].to_vec())
        } else {
            (idx[..1].to_vec(), idx[1..].to_vec())
        };
        {
            let mut v = t.view_mut(&outer).unwrap();
            v.set(&inner, 1.0);
            v.set_null(&inner, true);
        }
        prop_assert_eq!(*t.get(&idx), 1.0);
        prop_assert!(!t.is_null(&idx));
    }
}

// ============================================================================
// Projection properties
// ============================================================================

proptest! {
    /// The grid covers every element exactly once.
    #[test]
    fn prop_projection_conserves_elements(shape in shape_strategy(), fold in any::<bool>()) {
        let g = shape_2d(&shape, fold);
        prop_assert_eq!(g.rows * g.cols, shape.element_count());

        let mut hits = vec![0u8; shape.element_count()];
        for r in 0..g.rows {
            for c in 0..g.cols {
                hits[flat_index(&shape, fold, r, c).unwrap()] += 1;
            }
        }
        prop_assert!(hits.iter().all(|&h| h == 1));
    }
}
