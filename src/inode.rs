use std::io::{Read, Seek, Write};

use crate::error::{Result, VsfsError};
use crate::image::ImageStore;
use crate::layout::Geometry;
use crate::ondisk::{ensure_len, read_le_u32, write_le_u32};

// -------------------- Offsets del inodo --------------------

const INO_MODE: usize = 0;
const INO_UID: usize = 4;
const INO_GID: usize = 8;
const INO_FILE_SIZE: usize = 12;
const INO_ATIME: usize = 16;
const INO_CTIME: usize = 20;
const INO_MTIME: usize = 24;
const INO_DTIME: usize = 28;
const INO_LINKS_COUNT: usize = 32;
const INO_BLOCKS: usize = 36;
const INO_DIRECT_BLOCK: usize = 40;
const INO_SINGLE_INDIRECT: usize = 44;
const INO_DOUBLE_INDIRECT: usize = 48;
const INO_TRIPLE_INDIRECT: usize = 52;

pub const INODE_FIELDS_LEN: usize = 56;

/// Inodo en disco. Los punteros indirectos se guardan pero no se interpretan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub file_size: u32,
    pub atime: u32,
    pub ctime: u32,
    pub mtime: u32,
    pub dtime: u32,
    pub links_count: u32,
    pub blocks: u32,
    pub direct_block: u32,
    pub single_indirect: u32,
    pub double_indirect: u32,
    pub triple_indirect: u32,
    pub reserved: Vec<u8>,
}

impl Inode {
    /// Inodo con todos los campos en cero y el padding del tamaño de registro.
    pub fn zeroed(geometry: &Geometry) -> Self {
        Self {
            mode: 0,
            uid: 0,
            gid: 0,
            file_size: 0,
            atime: 0,
            ctime: 0,
            mtime: 0,
            dtime: 0,
            links_count: 0,
            blocks: 0,
            direct_block: 0,
            single_indirect: 0,
            double_indirect: 0,
            triple_indirect: 0,
            reserved: vec![0u8; geometry.inode_size as usize - INODE_FIELDS_LEN],
        }
    }

    /// Vivo = con enlaces y sin fecha de borrado.
    pub fn is_live(&self) -> bool {
        self.links_count > 0 && self.dtime == 0
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        ensure_len(bytes, INODE_FIELDS_LEN, 0)?;

        Ok(Self {
            mode: read_le_u32(bytes, INO_MODE),
            uid: read_le_u32(bytes, INO_UID),
            gid: read_le_u32(bytes, INO_GID),
            file_size: read_le_u32(bytes, INO_FILE_SIZE),
            atime: read_le_u32(bytes, INO_ATIME),
            ctime: read_le_u32(bytes, INO_CTIME),
            mtime: read_le_u32(bytes, INO_MTIME),
            dtime: read_le_u32(bytes, INO_DTIME),
            links_count: read_le_u32(bytes, INO_LINKS_COUNT),
            blocks: read_le_u32(bytes, INO_BLOCKS),
            direct_block: read_le_u32(bytes, INO_DIRECT_BLOCK),
            single_indirect: read_le_u32(bytes, INO_SINGLE_INDIRECT),
            double_indirect: read_le_u32(bytes, INO_DOUBLE_INDIRECT),
            triple_indirect: read_le_u32(bytes, INO_TRIPLE_INDIRECT),
            reserved: bytes[INODE_FIELDS_LEN..].to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; INODE_FIELDS_LEN + self.reserved.len()];

        write_le_u32(&mut buf, INO_MODE, self.mode);
        write_le_u32(&mut buf, INO_UID, self.uid);
        write_le_u32(&mut buf, INO_GID, self.gid);
        write_le_u32(&mut buf, INO_FILE_SIZE, self.file_size);
        write_le_u32(&mut buf, INO_ATIME, self.atime);
        write_le_u32(&mut buf, INO_CTIME, self.ctime);
        write_le_u32(&mut buf, INO_MTIME, self.mtime);
        write_le_u32(&mut buf, INO_DTIME, self.dtime);
        write_le_u32(&mut buf, INO_LINKS_COUNT, self.links_count);
        write_le_u32(&mut buf, INO_BLOCKS, self.blocks);
        write_le_u32(&mut buf, INO_DIRECT_BLOCK, self.direct_block);
        write_le_u32(&mut buf, INO_SINGLE_INDIRECT, self.single_indirect);
        write_le_u32(&mut buf, INO_DOUBLE_INDIRECT, self.double_indirect);
        write_le_u32(&mut buf, INO_TRIPLE_INDIRECT, self.triple_indirect);
        buf[INODE_FIELDS_LEN..].copy_from_slice(&self.reserved);

        buf
    }
}

/// Tabla de inodos sobre la imagen: un registro por índice, offsets calculados
/// con `Geometry::inode_offset`.
pub struct InodeTable<'a, D> {
    store: &'a mut ImageStore<D>,
    geometry: &'a Geometry,
}

impl<'a, D: Read + Write + Seek> InodeTable<'a, D> {
    pub fn new(store: &'a mut ImageStore<D>, geometry: &'a Geometry) -> Self {
        Self { store, geometry }
    }

    fn check_index(&self, index: u32) -> Result<()> {
        let count = self.geometry.inode_count();
        if index >= count {
            return Err(VsfsError::Range {
                what: "inode",
                index: u64::from(index),
                limit: u64::from(count),
            });
        }
        Ok(())
    }

    pub fn read(&mut self, index: u32) -> Result<Inode> {
        self.check_index(index)?;
        let offset = self.geometry.inode_offset(index);
        let bytes = self
            .store
            .read_range(offset, self.geometry.inode_size as usize)?;
        Inode::decode(&bytes)
    }

    pub fn write(&mut self, index: u32, inode: &Inode) -> Result<()> {
        self.check_index(index)?;
        let mut bytes = inode.encode();
        bytes.resize(self.geometry.inode_size as usize, 0);
        self.store
            .write_range(self.geometry.inode_offset(index), &bytes)
    }

    /// Una sola pasada por la tabla; el resultado se comparte entre los
    /// chequeos y el volcado final.
    pub fn read_all(&mut self) -> Result<Vec<Inode>> {
        (0..self.geometry.inode_count())
            .map(|i| self.read(i))
            .collect()
    }
}
