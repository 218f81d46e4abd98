mod ondisk;

pub mod bitmap;
pub mod error;
pub mod fsck;
pub mod image;
pub mod inode;
pub mod layout;
pub mod mkfs;
pub mod superblock;

pub use crate::bitmap::BitmapView;
pub use crate::error::{Result, VsfsError};
pub use crate::image::ImageStore;
pub use crate::inode::{Inode, InodeTable, INODE_FIELDS_LEN};
pub use crate::layout::{
    Geometry,
    VSFS_BLOCK_SIZE,
    VSFS_MAGIC,
    VSFS_TOTAL_BLOCKS,
};
pub use crate::superblock::{read_superblock, write_superblock, Superblock, SUPERBLOCK_FIELDS_LEN};
