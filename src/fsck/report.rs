// -----------------------------------------------------------------------------
// Reporte en texto
// -----------------------------------------------------------------------------
//
// El texto (sin colores) es un contrato: las pruebas lo comparan línea por línea.

use std::io::Write;

use colored::*;

use super::fsck_types::*;
use crate::error::Result;
use crate::inode::Inode;
use crate::layout::Geometry;
use crate::superblock::Superblock;

pub struct Reporter<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    /// Encabezado de sección, precedido por una línea en blanco.
    pub fn heading(&mut self, text: &str) -> Result<()> {
        if self.color {
            writeln!(self.out, "\n{}", text.bold())?;
        } else {
            writeln!(self.out, "\n{}", text)?;
        }
        Ok(())
    }

    fn error(&mut self, text: String) -> Result<()> {
        if self.color {
            writeln!(self.out, "{}", text.red())?;
        } else {
            writeln!(self.out, "{}", text)?;
        }
        Ok(())
    }

    fn ok(&mut self, text: &str) -> Result<()> {
        if self.color {
            writeln!(self.out, "{}", text.green())?;
        } else {
            writeln!(self.out, "{}", text)?;
        }
        Ok(())
    }

    /// Geometría compilada, no lo que diga la imagen.
    pub fn dump_layout(&mut self, g: &Geometry) -> Result<()> {
        let table_end = g.first_data_block - 1;
        let last_block = g.total_blocks - 1;

        self.heading("==== File System Layout structure ====")?;
        writeln!(self.out, "Block size: {} Bytes", g.block_size)?;
        writeln!(self.out, "Total blocks: {}", g.total_blocks)?;
        writeln!(self.out, "Block 0: Superblock")?;
        writeln!(self.out, "Block {}: Inode bitmap", g.inode_bitmap_block)?;
        writeln!(self.out, "Block {}: Data bitmap", g.data_bitmap_block)?;
        writeln!(
            self.out,
            "Blocks {}–{}: Inode table ({} blocks)",
            g.inode_table_start,
            table_end,
            g.inode_table_blocks()
        )?;
        writeln!(self.out, "Blocks {}–{}: Data blocks", g.first_data_block, last_block)?;
        writeln!(self.out, "Inodes: {} Bytes each", g.inode_size)?;
        Ok(())
    }

    pub fn dump_superblock(&mut self, sb: &Superblock) -> Result<()> {
        self.heading("=== Superblock structre ===")?;
        writeln!(self.out, "Magic number: {:#x}", sb.magic)?;
        writeln!(self.out, "Block size: {} bytes", sb.block_size)?;
        writeln!(self.out, "Total blocks: {}", sb.total_blocks)?;
        writeln!(self.out, "Inode bitmap block: {}", sb.inode_bitmap_block)?;
        writeln!(self.out, "Data bitmap block: {}", sb.data_bitmap_block)?;
        writeln!(self.out, "Inode table start block: {}", sb.inode_table_start)?;
        writeln!(self.out, "First data block: {}", sb.first_data_block)?;
        writeln!(self.out, "Inode size: {} bytes", sb.inode_size)?;
        writeln!(self.out, "Inode count: {}", sb.inode_count)?;
        Ok(())
    }

    pub fn dump_inode(&mut self, index: u32, inode: &Inode) -> Result<()> {
        writeln!(self.out, "\n---- Inode {} -----", index)?;
        writeln!(self.out, "Mode: {}", inode.mode)?;
        writeln!(self.out, "User ID: {}", inode.uid)?;
        writeln!(self.out, "Group ID: {}", inode.gid)?;
        writeln!(self.out, "File size: {} bytes", inode.file_size)?;
        writeln!(self.out, "Last access time: {}", inode.atime)?;
        writeln!(self.out, "Creation time: {}", inode.ctime)?;
        writeln!(self.out, "Last modification time: {}", inode.mtime)?;
        writeln!(self.out, "Deletion time: {}", inode.dtime)?;
        writeln!(self.out, "Number of hard links: {}", inode.links_count)?;
        writeln!(self.out, "Data blocks allocated: {}", inode.blocks)?;
        writeln!(self.out, "Direct block pointer: {}", inode.direct_block)?;
        writeln!(self.out, "Single indirect pointer: {}", inode.single_indirect)?;
        writeln!(self.out, "Double indirect pointer: {}", inode.double_indirect)?;
        writeln!(self.out, "Triple indirect pointer: {}", inode.triple_indirect)?;
        writeln!(self.out, "Reserved space: {} bytes", inode.reserved.len())?;
        Ok(())
    }

    pub fn dump_inodes(&mut self, inodes: &[Inode]) -> Result<()> {
        for (i, inode) in inodes.iter().enumerate() {
            self.dump_inode(i as u32, inode)?;
        }
        Ok(())
    }

    pub fn data_bitmap_mismatches(&mut self, found: &[DataBitmapMismatch]) -> Result<()> {
        for m in found {
            let text = match m.miss {
                BitmapMiss::NotMarked => format!(
                    "Error: Block {} is referenced by inode {} but not marked in the data bitmap.",
                    m.block, m.inode
                ),
                BitmapMiss::OutsideBitmap => format!(
                    "Error: Block {} is referenced by inode {} but lies outside the data bitmap.",
                    m.block, m.inode
                ),
            };
            self.error(text)?;
        }
        Ok(())
    }

    pub fn inode_bitmap_mismatches(&mut self, found: &[InodeBitmapMismatch]) -> Result<()> {
        for m in found {
            let text = match m.miss {
                BitmapMiss::NotMarked => format!(
                    "Error: Inode {} is valid but not marked in the inode bitmap.",
                    m.inode
                ),
                BitmapMiss::OutsideBitmap => format!(
                    "Error: Inode {} is valid but lies outside the inode bitmap.",
                    m.inode
                ),
            };
            self.error(text)?;
        }
        Ok(())
    }

    /// Una línea por violación; la confirmación final solo si no hubo ninguna.
    pub fn field_violations(&mut self, found: &[FieldViolation]) -> Result<()> {
        for v in found {
            self.error(format!("Error: Inode {} has {} = 0.", v.inode, v.field))?;
        }
        if found.is_empty() {
            self.ok("All inodes are correct and valid.")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Reporter<Vec<u8>>) -> Result<()>,
    {
        let mut r = Reporter::new(Vec::new(), false);
        f(&mut r).unwrap();
        String::from_utf8(r.into_inner()).unwrap()
    }

    #[test]
    fn layout_text() {
        let text = render(|r| r.dump_layout(&Geometry::canonical()));
        assert_eq!(
            text,
            "\n==== File System Layout structure ====\n\
             Block size: 4096 Bytes\n\
             Total blocks: 64\n\
             Block 0: Superblock\n\
             Block 1: Inode bitmap\n\
             Block 2: Data bitmap\n\
             Blocks 3–7: Inode table (5 blocks)\n\
             Blocks 8–63: Data blocks\n\
             Inodes: 256 Bytes each\n"
        );
    }

    #[test]
    fn superblock_text_prints_fields_verbatim() {
        let mut sb = Superblock::canonical(&Geometry::canonical());
        sb.inode_count = 7;
        let text = render(|r| r.dump_superblock(&sb));
        assert!(text.starts_with("\n=== Superblock structre ===\nMagic number: 0xd34d\n"));
        assert!(text.contains("Block size: 4096 bytes\n"));
        assert!(text.contains("Inode size: 256 bytes\n"));
        assert!(text.ends_with("Inode count: 7\n"));
    }

    #[test]
    fn inode_text_reports_reserved_size() {
        let g = Geometry::canonical();
        let mut inode = Inode::zeroed(&g);
        inode.mode = 511;
        inode.direct_block = 12;
        let text = render(|r| r.dump_inode(2, &inode));
        assert!(text.starts_with("\n---- Inode 2 -----\nMode: 511\n"));
        assert!(text.contains("Direct block pointer: 12\n"));
        assert!(text.ends_with("Reserved space: 200 bytes\n"));
        assert_eq!(text.lines().count(), 17);
    }

    #[test]
    fn violation_lines() {
        let found = vec![
            FieldViolation { inode: 0, field: InodeField::Mode },
            FieldViolation { inode: 3, field: InodeField::FileSize },
            FieldViolation { inode: 3, field: InodeField::LinksCount },
        ];
        let text = render(|r| r.field_violations(&found));
        assert_eq!(
            text,
            "Error: Inode 0 has invalid mode = 0.\n\
             Error: Inode 3 has file size = 0.\n\
             Error: Inode 3 has invalid links count = 0.\n"
        );

        let clean = render(|r| r.field_violations(&[]));
        assert_eq!(clean, "All inodes are correct and valid.\n");
    }

    #[test]
    fn bitmap_lines() {
        let text = render(|r| {
            r.data_bitmap_mismatches(&[
                DataBitmapMismatch { block: 12, inode: 2, miss: BitmapMiss::NotMarked },
                DataBitmapMismatch { block: 70, inode: 60, miss: BitmapMiss::OutsideBitmap },
            ])?;
            r.inode_bitmap_mismatches(&[InodeBitmapMismatch { inode: 5, miss: BitmapMiss::NotMarked }])
        });
        assert_eq!(
            text,
            "Error: Block 12 is referenced by inode 2 but not marked in the data bitmap.\n\
             Error: Block 70 is referenced by inode 60 but lies outside the data bitmap.\n\
             Error: Inode 5 is valid but not marked in the inode bitmap.\n"
        );
    }
}
