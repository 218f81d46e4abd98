use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;

use crate::error::{Result, VsfsError};
use crate::layout::Geometry;

/// Acceso posicionado a la imagen completa.
///
/// El dispositivo se adquiere una vez y se libera al soltar el `ImageStore`
/// (también en los caminos de error). Cualquier lectura o escritura parcial
/// se reporta como `IntegrityIo` y no se reintenta.
pub struct ImageStore<D = File> {
    device: D,
    limit: u64,
}

impl ImageStore<File> {
    /// Abre la imagen en modo lectura/escritura.
    pub fn open(path: &Path, geometry: &Geometry) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| VsfsError::ImageOpen {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("imagen {:?} abierta ({} bytes esperados)", path, geometry.image_bytes());
        Ok(Self::new(file, geometry))
    }
}

impl<D: Read + Write + Seek> ImageStore<D> {
    pub fn new(device: D, geometry: &Geometry) -> Self {
        Self {
            device,
            limit: geometry.image_bytes(),
        }
    }

    fn check_bounds(&self, offset: u64, len: usize) -> Result<()> {
        let end = offset.checked_add(len as u64);
        match end {
            Some(end) if end <= self.limit => Ok(()),
            _ => Err(VsfsError::OutOfBounds {
                offset,
                len,
                limit: self.limit,
            }),
        }
    }

    pub fn read_range(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.check_bounds(offset, len)?;
        self.device.seek(SeekFrom::Start(offset))?;

        let mut buf = vec![0u8; len];
        let mut filled = 0usize;
        while filled < len {
            match self.device.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled != len {
            return Err(VsfsError::IntegrityIo {
                op: "read",
                offset,
                expected: len,
                actual: filled,
            });
        }
        Ok(buf)
    }

    pub fn write_range(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.check_bounds(offset, data.len())?;
        self.device.seek(SeekFrom::Start(offset))?;

        let mut written = 0usize;
        while written < data.len() {
            match self.device.write(&data[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if written != data.len() {
            return Err(VsfsError::IntegrityIo {
                op: "write",
                offset,
                expected: data.len(),
                actual: written,
            });
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.device.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn store_with_len(len: usize) -> ImageStore<Cursor<Vec<u8>>> {
        ImageStore::new(Cursor::new(vec![0u8; len]), &Geometry::canonical())
    }

    #[test]
    fn write_then_read_same_range() {
        let g = Geometry::canonical();
        let mut store = store_with_len(g.image_bytes() as usize);

        store.write_range(g.block_offset(5) + 10, &[1, 2, 3]).unwrap();
        let back = store.read_range(g.block_offset(5) + 9, 5).unwrap();
        assert_eq!(back, vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn range_past_image_end_is_rejected() {
        let g = Geometry::canonical();
        let mut store = store_with_len(g.image_bytes() as usize);

        let err = store.read_range(g.image_bytes() - 2, 4).unwrap_err();
        assert!(matches!(err, VsfsError::OutOfBounds { .. }));

        let err = store.write_range(g.image_bytes(), &[0]).unwrap_err();
        assert!(matches!(err, VsfsError::OutOfBounds { .. }));
    }

    #[test]
    fn short_device_gives_integrity_error() {
        // La geometría promete 64 bloques pero el dispositivo solo tiene uno.
        let mut store = store_with_len(4096);

        let err = store.read_range(4000, 200).unwrap_err();
        match err {
            VsfsError::IntegrityIo {
                op,
                expected,
                actual,
                ..
            } => {
                assert_eq!(op, "read");
                assert_eq!(expected, 200);
                assert_eq!(actual, 96);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_image_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.img");

        let err = ImageStore::open(&path, &Geometry::canonical()).err().unwrap();
        assert!(matches!(err, VsfsError::ImageOpen { .. }));
    }
}
