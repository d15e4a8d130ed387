// tests/render_config_tests.rs

use std::fs;

use tensorgrid::{render, AnyTensor, ElementKind, GridConfig, Shape, Tensor};

fn plain() -> GridConfig {
    GridConfig {
        color: false,
        ..GridConfig::default()
    }
}

#[test]
fn test_load_config_file() {
    let path = std::env::temp_dir().join(format!("tgrid-test-{}.toml", std::process::id()));
    fs::write(&path, "[display]\nfold_into_rows = false\nmax_cells = 50\n").unwrap();
    let cfg = GridConfig::load(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert!(!cfg.fold_into_rows);
    assert_eq!(cfg.max_cells, 50);
    assert!(cfg.top_zero);
}

#[test]
fn test_missing_config_uses_defaults() {
    let path = std::env::temp_dir().join("tgrid-does-not-exist.toml");
    assert_eq!(GridConfig::load(&path).unwrap(), GridConfig::default());
}

#[test]
fn test_render_string_tensor() {
    let mut t = Tensor::<String>::new(vec![1, 2]);
    t.set_1d(0, "a".into());
    t.set_1d(1, "bc".into());
    let out = render(&t, &plain());
    assert_eq!(out, "String: [1, 2]\n[0]:       a      bc\n");
}

#[test]
fn test_render_1d_fold_into_columns() {
    let t = Tensor::from_vec(Shape::row_major(vec![3]), vec![1.5, 2.0, -1.0]).unwrap();
    let cfg = GridConfig {
        fold_into_rows: false,
        ..plain()
    };
    assert_eq!(render(&t, &cfg), "Float64: [3]\n[0]:     1.5       2      -1\n");
}

#[test]
fn test_render_odd_row_hint_overrides_config() {
    let mut t = AnyTensor::new(ElementKind::Bits, Shape::row_major(vec![2]));
    t.set_float_1d(1, 1.0);
    t.set_meta("odd-row", "-");
    assert_eq!(
        render(&t, &plain()),
        "Bits: [2]\n[0]:   false    true\n"
    );
}

#[test]
fn test_display_of_empty_tensor_is_label() {
    let t = Tensor::<i64>::new(vec![0, 4]);
    assert_eq!(t.to_string(), "Int: [0, 4]");
}

#[test]
fn test_render_custom_strides_flat() {
    let mut t = Tensor::<i64>::new(vec![4]);
    t.set_floats(&[1.0, 2.0, 3.0, 4.0]);
    t.reshape(vec![2, 2], Some(&[1, 2][..]), None).unwrap();
    // [2, 2] with strides [1, 2] is column-major, so it still projects
    assert!(t.shape().is_column_major());
    t.reshape(vec![2, 2], Some(&[2, 2][..]), None).unwrap();
    assert_eq!(t.to_string(), "Int: [2, 2]\n[1, 2, 3, 4]\n");
}

#[test]
fn test_scalar_tensor_renders_flat() {
    let mut t = Tensor::<f64>::new(Vec::<usize>::new());
    assert_eq!(t.len(), 1);
    t.set_1d(0, 4.5);
    assert_eq!(t.to_string(), "Float64: []\n[4.5]\n");
    assert_eq!(render(&t, &plain()), "Float64: []\n[4.5]\n");
}

#[test]
fn test_six_dim_tensor_renders_flat() {
    let mut t = AnyTensor::new(
        ElementKind::Float64,
        Shape::row_major(vec![1, 1, 1, 1, 1, 2]),
    );
    t.set_float_1d(1, 2.5);
    assert_eq!(
        render(&t, &plain()),
        "Float64: [1, 1, 1, 1, 1, 2]\n[0, 2.5]\n"
    );
    assert_eq!(t.to_string(), "Float64: [1, 1, 1, 1, 1, 2]\n[0, 2.5]\n");
}
