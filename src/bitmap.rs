use std::io::{Read, Seek, Write};

use crate::error::{Result, VsfsError};
use crate::image::ImageStore;
use crate::layout::Geometry;

/// Vista de solo lectura sobre un bitmap (inodos o datos).
/// Bit `i` = bit `i % 8` del byte `i / 8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapView {
    bytes: Vec<u8>,
    bits: u32,
}

impl BitmapView {
    pub fn from_bytes(bytes: Vec<u8>, bits: u32) -> Self {
        Self { bytes, bits }
    }

    /// Lee los primeros `total_blocks / 8` bytes del bloque indicado.
    pub fn load<D: Read + Write + Seek>(
        store: &mut ImageStore<D>,
        geometry: &Geometry,
        block: u32,
    ) -> Result<Self> {
        let bytes = store.read_range(geometry.block_offset(block), geometry.bitmap_bytes())?;
        Ok(Self::from_bytes(bytes, geometry.total_blocks))
    }

    pub fn len(&self) -> u32 {
        self.bits
    }

    pub fn contains(&self, index: u32) -> bool {
        index < self.bits
    }

    pub fn is_set(&self, index: u32) -> Result<bool> {
        if !self.contains(index) {
            return Err(VsfsError::Range {
                what: "bitmap",
                index: u64::from(index),
                limit: u64::from(self.bits),
            });
        }
        let byte = self.bytes[(index / 8) as usize];
        Ok(byte & (1 << (index % 8)) != 0)
    }
}
