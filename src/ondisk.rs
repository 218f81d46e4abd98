//! Lectura/escritura little-endian por offset explícito.
//!
//! Los registros en disco se describen con tablas de offsets, nunca con el
//! layout en memoria de un `struct`, así que encode y decode son simétricos
//! sin depender de `repr(C)` ni de alineación.

use crate::error::{Result, VsfsError};

pub(crate) fn ensure_len(data: &[u8], needed: usize, offset: u64) -> Result<()> {
    if data.len() < needed {
        return Err(VsfsError::IntegrityIo {
            op: "decode",
            offset,
            expected: needed,
            actual: data.len(),
        });
    }
    Ok(())
}

#[inline]
pub(crate) fn read_le_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

#[inline]
pub(crate) fn read_le_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[inline]
pub(crate) fn write_le_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn write_le_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
