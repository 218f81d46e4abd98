use std::io::{Read, Seek, Write};

use log::debug;

use crate::error::Result;
use crate::image::ImageStore;
use crate::layout::Geometry;
use crate::ondisk::{ensure_len, read_le_u16, read_le_u32, write_le_u16, write_le_u32};

// -------------------- Offsets del superblock --------------------

const SB_MAGIC: usize = 0;
const SB_BLOCK_SIZE: usize = 2;
const SB_TOTAL_BLOCKS: usize = 6;
const SB_INODE_BITMAP_BLOCK: usize = 10;
const SB_DATA_BITMAP_BLOCK: usize = 14;
const SB_INODE_TABLE_START: usize = 18;
const SB_FIRST_DATA_BLOCK: usize = 22;
const SB_INODE_SIZE: usize = 26;
const SB_INODE_COUNT: usize = 30;

/// Bytes ocupados por los campos declarados; el resto del bloque es `reserved`.
pub const SUPERBLOCK_FIELDS_LEN: usize = 34;

/// Superblock tal como está en el bloque 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superblock {
    pub magic: u16,
    pub block_size: u32,
    pub total_blocks: u32,
    pub inode_bitmap_block: u32,
    pub data_bitmap_block: u32,
    pub inode_table_start: u32,
    pub first_data_block: u32,
    pub inode_size: u32,
    pub inode_count: u32,
    pub reserved: Vec<u8>,
}

impl Superblock {
    /// Superblock con todos los campos tomados de la geometría y padding en cero.
    pub fn canonical(geometry: &Geometry) -> Self {
        Self {
            magic: geometry.magic,
            block_size: geometry.block_size,
            total_blocks: geometry.total_blocks,
            inode_bitmap_block: geometry.inode_bitmap_block,
            data_bitmap_block: geometry.data_bitmap_block,
            inode_table_start: geometry.inode_table_start,
            first_data_block: geometry.first_data_block,
            inode_size: geometry.inode_size,
            inode_count: geometry.inode_count(),
            reserved: vec![0u8; geometry.block_size as usize - SUPERBLOCK_FIELDS_LEN],
        }
    }

    /// Decodifica un bloque completo; todo lo que sigue a los campos va a `reserved`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        ensure_len(bytes, SUPERBLOCK_FIELDS_LEN, 0)?;

        Ok(Self {
            magic: read_le_u16(bytes, SB_MAGIC),
            block_size: read_le_u32(bytes, SB_BLOCK_SIZE),
            total_blocks: read_le_u32(bytes, SB_TOTAL_BLOCKS),
            inode_bitmap_block: read_le_u32(bytes, SB_INODE_BITMAP_BLOCK),
            data_bitmap_block: read_le_u32(bytes, SB_DATA_BITMAP_BLOCK),
            inode_table_start: read_le_u32(bytes, SB_INODE_TABLE_START),
            first_data_block: read_le_u32(bytes, SB_FIRST_DATA_BLOCK),
            inode_size: read_le_u32(bytes, SB_INODE_SIZE),
            inode_count: read_le_u32(bytes, SB_INODE_COUNT),
            reserved: bytes[SUPERBLOCK_FIELDS_LEN..].to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; SUPERBLOCK_FIELDS_LEN + self.reserved.len()];

        write_le_u16(&mut buf, SB_MAGIC, self.magic);
        write_le_u32(&mut buf, SB_BLOCK_SIZE, self.block_size);
        write_le_u32(&mut buf, SB_TOTAL_BLOCKS, self.total_blocks);
        write_le_u32(&mut buf, SB_INODE_BITMAP_BLOCK, self.inode_bitmap_block);
        write_le_u32(&mut buf, SB_DATA_BITMAP_BLOCK, self.data_bitmap_block);
        write_le_u32(&mut buf, SB_INODE_TABLE_START, self.inode_table_start);
        write_le_u32(&mut buf, SB_FIRST_DATA_BLOCK, self.first_data_block);
        write_le_u32(&mut buf, SB_INODE_SIZE, self.inode_size);
        write_le_u32(&mut buf, SB_INODE_COUNT, self.inode_count);
        buf[SUPERBLOCK_FIELDS_LEN..].copy_from_slice(&self.reserved);

        buf
    }
}

/// Lee el bloque 0 completo.
pub fn read_superblock<D: Read + Write + Seek>(
    store: &mut ImageStore<D>,
    geometry: &Geometry,
) -> Result<Superblock> {
    let bytes = store.read_range(geometry.block_offset(0), geometry.block_size as usize)?;
    Superblock::decode(&bytes)
}

/// Reemplaza el bloque 0 completo; no hay actualizaciones parciales.
pub fn write_superblock<D: Read + Write + Seek>(
    store: &mut ImageStore<D>,
    geometry: &Geometry,
    sb: &Superblock,
) -> Result<()> {
    let mut bytes = sb.encode();
    bytes.resize(geometry.block_size as usize, 0);
    store.write_range(geometry.block_offset(0), &bytes)?;
    debug!("superblock escrito en el bloque 0 (magic = {:#x})", sb.magic);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    #[test]
    fn canonical_record_fills_one_block() {
        let g = Geometry::canonical();
        let sb = Superblock::canonical(&g);
        assert_eq!(sb.encode().len(), 4096);
        assert_eq!(sb.reserved.len(), 4096 - 34);
        assert_eq!(sb.inode_count, 80);
    }

    #[test]
    fn fields_land_at_declared_offsets() {
        let g = Geometry::canonical();
        let bytes = Superblock::canonical(&g).encode();
        assert_eq!(&bytes[0..2], &[0x4d, 0xd3]);
        assert_eq!(&bytes[2..6], &4096u32.to_le_bytes());
        assert_eq!(&bytes[6..10], &64u32.to_le_bytes());
        assert_eq!(&bytes[18..22], &3u32.to_le_bytes());
        assert_eq!(&bytes[30..34], &80u32.to_le_bytes());
        assert!(bytes[34..].iter().all(|&b| b == 0));
    }

    #[test]
    fn garbage_block_decodes_verbatim() {
        let mut block = vec![0xffu8; 4096];
        block[0] = 0x12;
        block[1] = 0x00;
        let sb = Superblock::decode(&block).unwrap();
        assert_eq!(sb.magic, 0x12);
        assert_eq!(sb.block_size, u32::MAX);
        assert_eq!(sb.reserved.len(), 4096 - 34);
    }

    #[test]
    fn write_then_read_through_store() {
        let g = Geometry::canonical();
        let mut store = ImageStore::new(Cursor::new(vec![0u8; g.image_bytes() as usize]), &g);

        let sb = Superblock::canonical(&g);
        write_superblock(&mut store, &g, &sb).unwrap();
        assert_eq!(read_superblock(&mut store, &g).unwrap(), sb);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            magic in any::<u16>(),
            fields in proptest::array::uniform8(any::<u32>()),
            reserved in proptest::collection::vec(any::<u8>(), 4096 - SUPERBLOCK_FIELDS_LEN),
        ) {
            let sb = Superblock {
                magic,
                block_size: fields[0],
                total_blocks: fields[1],
                inode_bitmap_block: fields[2],
                data_bitmap_block: fields[3],
                inode_table_start: fields[4],
                first_data_block: fields[5],
                inode_size: fields[6],
                inode_count: fields[7],
                reserved,
            };
            prop_assert_eq!(Superblock::decode(&sb.encode()).unwrap(), sb);
        }
    }
}
