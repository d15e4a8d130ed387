// src/core/bitslice.rs

use serde::{Deserialize, Serialize};

/// Bit-packed boolean storage (LSB first within each byte).
/// Used both as the null bitmap of typed tensors and as the value
/// storage of [`crate::core::bits::BitsTensor`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawBitSlice")]
pub struct BitSlice {
    bytes: Vec<u8>,
    len: usize,
}

#[derive(Deserialize)]
struct RawBitSlice {
    bytes: Vec<u8>,
    len: usize,
}

impl TryFrom<RawBitSlice> for BitSlice {
    type Error = String;

    fn try_from(raw: RawBitSlice) -> Result<Self, Self::Error> {
        if raw.bytes.len() != bytes_for(raw.len) {
            return Err(format!(
                "bitslice of {} bits needs {} bytes, got {}",
                raw.len,
                bytes_for(raw.len),
                raw.bytes.len()
            ));
        }
        Ok(Self {
            bytes: raw.bytes,
            len: raw.len,
        })
    }
}

// bits past `len` may be stale, so equality is by logical content
impl PartialEq for BitSlice {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for BitSlice {}

#[inline]
fn bytes_for(len: usize) -> usize {
    len.div_ceil(8)
}

impl BitSlice {
    /// Crea un bitslice de `len` bits, todos a false.
    pub fn new(len: usize) -> Self {
        Self {
            bytes: vec![0; bytes_for(len)],
            len,
        }
    }

    pub fn from_bools(bools: &[bool]) -> Self {
        let mut bs = Self::new(bools.len());
        for (i, &b) in bools.iter().enumerate() {
            bs.set(i, b);
        }
        bs
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        self.bytes[i >> 3] & (1 << (i & 7)) != 0
    }

    #[inline]
    pub fn set(&mut self, i: usize, val: bool) {
        debug_assert!(i < self.len);
        let mask = 1u8 << (i & 7);
        if val {
            self.bytes[i >> 3] |= mask;
        } else {
            self.bytes[i >> 3] &= !mask;
        }
    }

    /// Cambia la longitud: los bits existentes se conservan por posición,
    /// la región extendida queda a false.
    pub fn resize(&mut self, len: usize) {
        if len > self.len {
            // clear stale bits left in the last partial byte
            for i in self.len..len.min(bytes_for(self.len) * 8) {
                let mask = 1u8 << (i & 7);
                self.bytes[i >> 3] &= !mask;
            }
        }
        self.bytes.resize(bytes_for(len), 0);
        self.len = len;
    }

    /// Copy of bits `[start, end)`.
    pub fn sub_slice(&self, start: usize, end: usize) -> BitSlice {
        let mut out = BitSlice::new(end - start);
        for i in start..end {
            if self.get(i) {
                out.set(i - start, true);
            }
        }
        out
    }

    pub fn count_ones(&self) -> usize {
        self.iter().filter(|&b| b).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    pub fn to_bools(&self) -> Vec<bool> {
        self.iter().collect()
    }
}
