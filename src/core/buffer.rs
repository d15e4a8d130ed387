// src/core/buffer.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

/// Owned value storage for a tensor.
///
/// `data` holds every slot ever initialized; `len` is the logical length.
/// Shrinking only moves `len`, so growing back within `data.len()` exposes
/// the previously stored values again. Growing beyond it reallocates and
/// copies the logical prefix.
#[derive(Debug)]
pub struct Buffer<T> {
    data: Vec<T>,
    len: usize,
}

impl<T: Clone + Default> Buffer<T> {
    /// Buffer de `len` valores por defecto.
    pub fn filled(len: usize) -> Self {
        Self {
            data: vec![T::default(); len],
            len,
        }
    }

    /// Sets the logical length, reusing existing slots when possible.
    /// Returns true when the backing storage was reallocated.
    pub fn resize(&mut self, len: usize) -> bool {
        if len <= self.data.len() {
            self.len = len;
            return false;
        }
        debug!(
            from = self.data.len(),
            to = len,
            "reallocating tensor value buffer"
        );
        let mut data = Vec::with_capacity(len);
        data.extend_from_slice(&self.data[..self.len]);
        data.resize(len, T::default());
        self.data = data;
        self.len = len;
        true
    }
}

impl<T> Buffer<T> {
    pub fn from_vec(data: Vec<T>) -> Self {
        let len = data.len();
        Self { data, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of initialized slots available without reallocating.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn into_vec(mut self) -> Vec<T> {
        self.data.truncate(self.len);
        self.data
    }
}

impl<T> AsRef<[T]> for Buffer<T> {
    fn as_ref(&self) -> &[T] {
        &self.data[..self.len]
    }
}

impl<T> AsMut<[T]> for Buffer<T> {
    fn as_mut(&mut self) -> &mut [T] {
        &mut self.data[..self.len]
    }
}

// clones get exactly the logical values, never the stale tail
impl<T: Clone> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        Self::from_vec(self.as_ref().to_vec())
    }
}

impl<T: PartialEq> PartialEq for Buffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

impl<T: Serialize> Serialize for Buffer<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_ref().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Buffer<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Buffer::from_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shrink_then_grow_restores_values() {
        let mut buf = Buffer::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        assert!(!buf.resize(2));
        assert_eq!(buf.as_ref(), &[1.0, 2.0]);
        assert!(!buf.resize(4));
        assert_eq!(buf.as_ref(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_grow_past_capacity_reallocates() {
        let mut buf = Buffer::from_vec(vec![7, 8, 9]);
        buf.resize(1);
        assert!(buf.resize(5));
        // only the logical prefix survives a reallocation
        assert_eq!(buf.as_ref(), &[7, 0, 0, 0, 0]);
        assert_eq!(buf.capacity(), 5);
    }

    #[test]
    fn test_clone_drops_stale_tail() {
        let mut buf = Buffer::from_vec(vec![1, 2, 3]);
        buf.resize(1);
        let c = buf.clone();
        assert_eq!(c.capacity(), 1);
        assert_eq!(c.into_vec(), vec![1]);
    }
}
