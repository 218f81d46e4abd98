use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use log::info;

use crate::error::{Result, VsfsError};
use crate::image::ImageStore;
use crate::layout::Geometry;
use crate::superblock::{write_superblock, Superblock};

/// Marca un bit en un bitmap crudo; el índice debe caber en `bitmap.len() * 8`.
pub fn set_bit(bitmap: &mut [u8], index: u32) -> Result<()> {
    let bits = bitmap.len() as u64 * 8;
    if u64::from(index) >= bits {
        return Err(VsfsError::Range {
            what: "bitmap",
            index: u64::from(index),
            limit: bits,
        });
    }
    bitmap[(index / 8) as usize] |= 1 << (index % 8);
    Ok(())
}

/// Escribe superblock canónico y bitmaps iniciales sobre una imagen ya
/// dimensionada. Inodos y bitmap de inodos quedan en cero.
pub fn format<D: Read + Write + Seek>(store: &mut ImageStore<D>, geometry: &Geometry) -> Result<()> {
    write_superblock(store, geometry, &Superblock::canonical(geometry))?;

    // Bitmap de datos: los bloques de metadata [0 .. first_data_block) están usados.
    let mut data_bitmap = vec![0u8; geometry.bitmap_bytes()];
    for b in 0..geometry.first_data_block {
        set_bit(&mut data_bitmap, b)?;
    }
    store.write_range(geometry.block_offset(geometry.data_bitmap_block), &data_bitmap)?;

    store.flush()
}

/// Crea (o trunca) el archivo de imagen con el tamaño exacto y lo formatea.
pub fn format_image(path: &Path, geometry: &Geometry) -> Result<()> {
    let file = File::create(path).map_err(|source| VsfsError::ImageOpen {
        path: path.to_path_buf(),
        source,
    })?;
    file.set_len(geometry.image_bytes())?;

    let mut store = ImageStore::new(file, geometry);
    format(&mut store, geometry)?;

    info!(
        "imagen {:?} creada: {} bloques de {} bytes, {} inodos",
        path,
        geometry.total_blocks,
        geometry.block_size,
        geometry.inode_count()
    );
    Ok(())
}
