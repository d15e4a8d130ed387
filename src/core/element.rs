// src/core/element.rs

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::bitslice::BitSlice;

/// Tipo de elemento de un tensor (conjunto cerrado).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Float64,
    Float32,
    Int,
    String,
    Bits,
    Complex,
}

impl ElementKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, ElementKind::String)
    }

    /// Label used when printing a tensor, e.g. `Float64: [2, 3]`.
    pub fn label(self) -> &'static str {
        match self {
            ElementKind::Float64 => "Float64",
            ElementKind::Float32 => "Float32",
            ElementKind::Int => "Int",
            ElementKind::String => "String",
            ElementKind::Bits => "Bits",
            ElementKind::Complex => "Complex",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Borrowed view of a tensor's values, tagged by element kind.
/// Lets same-kind copies skip the float/string conversion path.
#[derive(Debug, Clone, Copy)]
pub enum TypedValues<'a> {
    Float64(&'a [f64]),
    Float32(&'a [f32]),
    Int(&'a [i64]),
    String(&'a [String]),
    Bits(&'a BitSlice),
    Complex(&'a [Complex64]),
}

/// Per-kind adapter: conversion to and from the type-erased float and
/// string accessors. String to number coercion never fails; unparsable
/// text becomes the default value.
pub trait Element: Clone + Default + fmt::Debug + PartialEq + 'static {
    const KIND: ElementKind;

    fn to_f64(&self) -> f64;

    /// Assigns from a float. Complex values only replace their real part.
    fn set_f64(&mut self, val: f64);

    fn to_text(&self) -> String;

    fn from_text(text: &str) -> Self;

    fn typed(values: &[Self]) -> TypedValues<'_>;

    fn from_typed(values: TypedValues<'_>) -> Option<&[Self]>;
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Float64;

    #[inline]
    fn to_f64(&self) -> f64 {
        *self
    }

    #[inline]
    fn set_f64(&mut self, val: f64) {
        *self = val;
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Self {
        text.trim().parse().unwrap_or_default()
    }

    fn typed(values: &[Self]) -> TypedValues<'_> {
        TypedValues::Float64(values)
    }

    fn from_typed(values: TypedValues<'_>) -> Option<&[Self]> {
        match values {
            TypedValues::Float64(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for f32 {
    const KIND: ElementKind = ElementKind::Float32;

    #[inline]
    fn to_f64(&self) -> f64 {
        *self as f64
    }

    #[inline]
    fn set_f64(&mut self, val: f64) {
        *self = val as f32;
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Self {
        text.trim().parse().unwrap_or_default()
    }

    fn typed(values: &[Self]) -> TypedValues<'_> {
        TypedValues::Float32(values)
    }

    fn from_typed(values: TypedValues<'_>) -> Option<&[Self]> {
        match values {
            TypedValues::Float32(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for i64 {
    const KIND: ElementKind = ElementKind::Int;

    #[inline]
    fn to_f64(&self) -> f64 {
        *self as f64
    }

    #[inline]
    fn set_f64(&mut self, val: f64) {
        *self = val as i64;
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    // "3.7" is accepted and truncated, like assigning from a float
    fn from_text(text: &str) -> Self {
        let text = text.trim();
        text.parse::<i64>()
            .or_else(|_| text.parse::<f64>().map(|f| f as i64))
            .unwrap_or_default()
    }

    fn typed(values: &[Self]) -> TypedValues<'_> {
        TypedValues::Int(values)
    }

    fn from_typed(values: TypedValues<'_>) -> Option<&[Self]> {
        match values {
            TypedValues::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for String {
    const KIND: ElementKind = ElementKind::String;

    fn to_f64(&self) -> f64 {
        f64::from_text(self)
    }

    fn set_f64(&mut self, val: f64) {
        *self = val.to_string();
    }

    fn to_text(&self) -> String {
        self.clone()
    }

    fn from_text(text: &str) -> Self {
        text.to_string()
    }

    fn typed(values: &[Self]) -> TypedValues<'_> {
        TypedValues::String(values)
    }

    fn from_typed(values: TypedValues<'_>) -> Option<&[Self]> {
        match values {
            TypedValues::String(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for Complex64 {
    const KIND: ElementKind = ElementKind::Complex;

    /// Real part.
    #[inline]
    fn to_f64(&self) -> f64 {
        self.re
    }

    #[inline]
    fn set_f64(&mut self, val: f64) {
        self.re = val;
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Self {
        Complex64::from_str(text.trim()).unwrap_or_default()
    }

    fn typed(values: &[Self]) -> TypedValues<'_> {
        TypedValues::Complex(values)
    }

    fn from_typed(values: TypedValues<'_>) -> Option<&[Self]> {
        match values {
            TypedValues::Complex(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_yields_zero() {
        assert_eq!(f64::from_text("abc"), 0.0);
        assert_eq!(i64::from_text("nope"), 0);
        assert_eq!(Complex64::from_text("x+y"), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_int_from_float_text() {
        assert_eq!(i64::from_text(" 3.7 "), 3);
        assert_eq!(i64::from_text("-12"), -12);
    }

    #[test]
    fn test_complex_text_round_trip() {
        let c = Complex64::new(1.5, -2.0);
        assert_eq!(Complex64::from_text(&c.to_text()), c);

        let mut d = Complex64::new(0.0, 4.0);
        d.set_f64(2.0);
        assert_eq!(d, Complex64::new(2.0, 4.0));
    }

    #[test]
    fn test_typed_dispatch() {
        let vals = [1.0f64, 2.0];
        assert!(f64::from_typed(f64::typed(&vals)).is_some());
        assert!(f32::from_typed(f64::typed(&vals)).is_none());
    }
}
