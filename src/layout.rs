// -----------------------------------------------------------------------------
// Geometría fija de VSFS
// -----------------------------------------------------------------------------
//
//   bloque 0        superblock
//   bloque 1        bitmap de inodos
//   bloque 2        bitmap de datos
//   bloques 3..8    tabla de inodos (80 x 256 bytes)
//   bloques 8..64   datos

pub const VSFS_MAGIC: u16 = 0xd34d;
pub const VSFS_BLOCK_SIZE: u32 = 4096;
pub const VSFS_TOTAL_BLOCKS: u32 = 64;
pub const VSFS_INODE_BITMAP_BLOCK: u32 = 1;
pub const VSFS_DATA_BITMAP_BLOCK: u32 = 2;
pub const VSFS_INODE_TABLE_START: u32 = 3;
pub const VSFS_FIRST_DATA_BLOCK: u32 = 8;
pub const VSFS_INODE_SIZE: u32 = 256;

/// Descripción de la imagen. Se construye una sola vez y se pasa por
/// referencia a todos los componentes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub magic: u16,
    pub block_size: u32,
    pub total_blocks: u32,
    pub inode_bitmap_block: u32,
    pub data_bitmap_block: u32,
    pub inode_table_start: u32,
    pub first_data_block: u32,
    pub inode_size: u32,
}

impl Geometry {
    /// Valores "conocidos buenos" con los que se repara el superblock.
    pub const fn canonical() -> Self {
        Self {
            magic: VSFS_MAGIC,
            block_size: VSFS_BLOCK_SIZE,
            total_blocks: VSFS_TOTAL_BLOCKS,
            inode_bitmap_block: VSFS_INODE_BITMAP_BLOCK,
            data_bitmap_block: VSFS_DATA_BITMAP_BLOCK,
            inode_table_start: VSFS_INODE_TABLE_START,
            first_data_block: VSFS_FIRST_DATA_BLOCK,
            inode_size: VSFS_INODE_SIZE,
        }
    }

    /// La tabla de inodos ocupa todo lo que hay entre su inicio y el primer bloque de datos.
    pub fn inode_table_blocks(&self) -> u32 {
        self.first_data_block - self.inode_table_start
    }

    pub fn inode_count(&self) -> u32 {
        (self.inode_table_blocks() * self.block_size) / self.inode_size
    }

    /// Tamaño útil de cada bitmap: un bit por bloque.
    pub fn bitmap_bytes(&self) -> usize {
        (self.total_blocks / 8) as usize
    }

    pub fn image_bytes(&self) -> u64 {
        u64::from(self.total_blocks) * u64::from(self.block_size)
    }

    pub fn block_offset(&self, index: u32) -> u64 {
        u64::from(index) * u64::from(self.block_size)
    }

    pub fn inode_offset(&self, index: u32) -> u64 {
        self.block_offset(self.inode_table_start) + u64::from(index) * u64::from(self.inode_size)
    }

    pub fn is_data_block(&self, block: u32) -> bool {
        block >= self.first_data_block && block < self.total_blocks
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::canonical()
    }
}
