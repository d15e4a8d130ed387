// tests/any_tensor_tests.rs

use std::sync::Arc;

use arrow::array::{Array, BooleanArray, LargeStringArray};
use tensorgrid::{
    AnyTensor, BitsTensor, ElementKind, Shape, ShapeError, Tensor, TensorError,
};

#[test]
fn test_json_file_format() {
    let json = r#"{
        "kind": "float64",
        "shape": { "dims": [2, 2], "names": ["row", "col"] },
        "values": [1.0, 2.0, 3.0, 4.0],
        "meta": { "name": "weights", "top-zero": "-" }
    }"#;
    let t: AnyTensor = serde_json::from_str(json).unwrap();
    assert_eq!(t.kind(), ElementKind::Float64);
    assert_eq!(t.shape().dim_by_name("col").unwrap(), 2);
    assert_eq!(t.meta("name"), Some("weights"));
    assert_eq!(t.float_row_cell(1, 0), 3.0);
}

#[test]
fn test_json_rejects_wrong_value_count() {
    let json = r#"{"kind": "int", "shape": {"dims": [3]}, "values": [1, 2]}"#;
    assert!(serde_json::from_str::<AnyTensor>(json).is_err());
}

#[test]
fn test_bits_json_round_trip() {
    let mut b = BitsTensor::new(vec![2, 5]);
    b.set(&[1, 4], true);
    let any = AnyTensor::from(b);
    let json = serde_json::to_string(&any).unwrap();
    let back: AnyTensor = serde_json::from_str(&json).unwrap();
    assert_eq!(back, any);
    assert_eq!(back.string_1d(9), "true");
}

#[test]
fn test_try_from_kind_mismatch() {
    let any = AnyTensor::new(ElementKind::String, Shape::row_major(vec![2]));
    let err = Tensor::<f64>::try_from(any).unwrap_err();
    assert!(matches!(
        err,
        TensorError::KindMismatch {
            expected: ElementKind::Float64,
            actual: ElementKind::String
        }
    ));

    let ok = AnyTensor::new(ElementKind::Float32, Shape::row_major(vec![2]));
    assert!(Tensor::<f32>::try_from(ok).is_ok());
}

#[test]
fn test_copy_between_any_tensors() {
    let mut src = AnyTensor::new(ElementKind::Float64, Shape::row_major(vec![3]));
    src.set_float_1d(0, 1.5);
    src.set_float_1d(2, -4.0);
    src.set_null_1d(1, true);

    let mut dst = AnyTensor::new(ElementKind::String, Shape::row_major(vec![3]));
    dst.copy_from(&src);
    assert_eq!(dst.string_1d(0), "1.5");
    assert_eq!(dst.string_1d(2), "-4");
    assert!(dst.is_null_1d(1));
}

#[test]
fn test_sub_tensor() {
    let mut t = AnyTensor::new(ElementKind::Int, Shape::row_major(vec![3, 2]));
    t.set_float_1d(4, 8.0);
    let sub = t.sub_tensor(&[2]).unwrap();
    assert_eq!(sub.shape().dims(), &[2]);
    assert_eq!(sub.float_1d(0), 8.0);

    let bits = AnyTensor::new(ElementKind::Bits, Shape::row_major(vec![3, 2]));
    assert!(matches!(
        bits.sub_tensor(&[0]),
        Err(ShapeError::UnsupportedLayout(_))
    ));
}

#[test]
fn test_arrow_round_trip_with_nulls() {
    let mut t = AnyTensor::new(ElementKind::Float32, Shape::row_major(vec![2, 2]));
    t.set_float_1d(0, 0.5);
    t.set_null_1d(3, true);
    let arr = t.to_arrow().unwrap();
    let back = AnyTensor::from_arrow(arr.as_ref(), t.shape().clone()).unwrap();
    assert_eq!(back, t);
}

#[test]
fn test_arrow_bools_and_large_strings() {
    let bools = BooleanArray::from(vec![Some(true), None, Some(false)]);
    let t = AnyTensor::from_arrow(&bools, Shape::row_major(vec![3])).unwrap();
    assert_eq!(t.kind(), ElementKind::Bits);
    assert_eq!(t.floats(), vec![1.0, 0.0, 0.0]);

    let large: Arc<dyn Array> = Arc::new(LargeStringArray::from(vec!["a", "b"]));
    let s = AnyTensor::from_arrow(large.as_ref(), Shape::row_major(vec![2])).unwrap();
    assert_eq!(s.kind(), ElementKind::String);
    assert_eq!(s.string_1d(1), "b");
}

#[test]
fn test_record_batch_without_shape_metadata_is_1d() {
    use arrow::array::Float64Array;
    use arrow::record_batch::RecordBatch;

    let batch = RecordBatch::try_from_iter(vec![(
        "x",
        Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0])) as Arc<dyn Array>,
    )])
    .unwrap();
    let t = AnyTensor::from_record_batch(&batch, "x").unwrap();
    assert_eq!(t.shape().dims(), &[3]);
    assert!(matches!(
        AnyTensor::from_record_batch(&batch, "y"),
        Err(TensorError::Arrow(_))
    ));
}
