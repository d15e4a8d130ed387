// tests/projection_tests.rs

use tensorgrid::{
    coords, flat_index, set_value_at, shape_2d, value_at, AnyTensor, ElementKind, Grid2D, Shape,
    ShapeError, Tensor,
};

#[test]
fn test_shape_2d_scenario() {
    let g = shape_2d(&Shape::row_major(vec![2, 3, 4]), true);
    assert_eq!(
        g,
        Grid2D {
            rows: 6,
            cols: 4,
            extra_row_groups: 2,
            extra_col_groups: 0
        }
    );
}

#[test]
fn test_every_cell_maps_to_a_distinct_value() {
    for dims in [
        vec![5],
        vec![3, 4],
        vec![2, 3, 4],
        vec![2, 3, 2, 3],
        vec![2, 2, 3, 2, 2],
    ] {
        for fold in [true, false] {
            for shape in [
                Shape::row_major(dims.clone()),
                Shape::column_major(dims.clone()),
            ] {
                let g = shape_2d(&shape, fold);
                assert_eq!(g.cell_count(), shape.element_count(), "{:?} {}", dims, fold);
                let mut seen = vec![false; shape.element_count()];
                for r in 0..g.rows {
                    for c in 0..g.cols {
                        let i = flat_index(&shape, fold, r, c).unwrap();
                        assert!(!seen[i], "{:?} fold={} hit {} twice", dims, fold, i);
                        seen[i] = true;
                    }
                }
            }
        }
    }
}

#[test]
fn test_coords_match_full_index() {
    let shape = Shape::row_major(vec![2, 3, 2, 3, 2]);
    let (rc, cc) = coords(&shape, true, 7, 3).unwrap();
    let idx = shape
        .index_from_offset(flat_index(&shape, true, 7, 3).unwrap())
        .unwrap();
    // rows fold axes 0, 1, 3; cols fold axes 2, 4
    assert_eq!(rc, vec![idx[0], idx[1], idx[3]]);
    assert_eq!(cc, vec![idx[2], idx[4]]);

    let (rc, cc) = coords(&shape, false, 4, 5).unwrap();
    let idx = shape
        .index_from_offset(flat_index(&shape, false, 4, 5).unwrap())
        .unwrap();
    assert_eq!(rc, vec![idx[1], idx[3]]);
    assert_eq!(cc, vec![idx[0], idx[2], idx[4]]);
}

#[test]
fn test_value_at_round_trip() {
    let mut t = Tensor::<f64>::new(vec![2, 3, 4]);
    set_value_at(&mut t, true, 4, 2, 9.5).unwrap();
    assert_eq!(*t.get(&[1, 1, 2]), 9.5);
    assert_eq!(value_at(&t, true, 4, 2).unwrap(), 9.5);

    let mut any = AnyTensor::new(ElementKind::Int, Shape::column_major(vec![3, 2]));
    set_value_at(&mut any, true, 1, 2, 4.0).unwrap();
    assert_eq!(value_at(&any, true, 1, 2).unwrap(), 4.0);
}

#[test]
fn test_projection_rejects_custom_strides() {
    let shape = Shape::new(vec![2, 2], Some(&[1, 1][..]), None).unwrap();
    assert!(matches!(
        flat_index(&shape, true, 0, 0),
        Err(ShapeError::UnsupportedLayout(_))
    ));
    assert_eq!(shape_2d(&shape, true).cell_count(), 1);
}

#[test]
fn test_empty_shape_has_no_cells() {
    let shape = Shape::row_major(vec![0, 3]);
    assert_eq!(shape_2d(&shape, true).cell_count(), 1);
    assert!(matches!(
        flat_index(&shape, true, 0, 0),
        Err(ShapeError::IndexOutOfRange { .. })
    ));
}
