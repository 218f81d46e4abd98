/* Chequeos de consistencia. Todos son de solo lectura y siguen adelante
ante cada violación: nunca cortan la pasada ni modifican la imagen. */

use log::debug;

use super::fsck_types::*;
use crate::bitmap::BitmapView;
use crate::error::Result;
use crate::inode::Inode;

pub struct ConsistencyChecker<'a> {
    inodes: &'a [Inode],
    inode_bitmap: &'a BitmapView,
    data_bitmap: &'a BitmapView,
}

impl<'a> ConsistencyChecker<'a> {
    /// `inodes` es la tabla completa, en orden de índice.
    pub fn new(inodes: &'a [Inode], inode_bitmap: &'a BitmapView, data_bitmap: &'a BitmapView) -> Self {
        Self {
            inodes,
            inode_bitmap,
            data_bitmap,
        }
    }

    fn indexed(&self) -> impl Iterator<Item = (u32, &'a Inode)> {
        self.inodes.iter().enumerate().map(|(i, inode)| (i as u32, inode))
    }

    /// Todo inodo con bloques asignados debe tener su bloque directo marcado.
    pub fn check_data_bitmap(&self) -> Result<Vec<DataBitmapMismatch>> {
        let mut found = Vec::new();

        for (idx, inode) in self.indexed() {
            if inode.blocks == 0 {
                continue;
            }

            let block = inode.direct_block;
            let miss = if !self.data_bitmap.contains(block) {
                Some(BitmapMiss::OutsideBitmap)
            } else if !self.data_bitmap.is_set(block)? {
                Some(BitmapMiss::NotMarked)
            } else {
                None
            };

            if let Some(miss) = miss {
                found.push(DataBitmapMismatch {
                    block,
                    inode: idx,
                    miss,
                });
            }
        }

        debug!("bitmap de datos: {} desajustes", found.len());
        Ok(found)
    }

    /// Todo inodo vivo debe estar marcado en el bitmap de inodos.
    pub fn check_inode_bitmap(&self) -> Result<Vec<InodeBitmapMismatch>> {
        let mut found = Vec::new();

        for (idx, inode) in self.indexed() {
            if !inode.is_live() {
                continue;
            }

            let miss = if !self.inode_bitmap.contains(idx) {
                Some(BitmapMiss::OutsideBitmap)
            } else if !self.inode_bitmap.is_set(idx)? {
                Some(BitmapMiss::NotMarked)
            } else {
                None
            };

            if let Some(miss) = miss {
                found.push(InodeBitmapMismatch { inode: idx, miss });
            }
        }

        debug!("bitmap de inodos: {} desajustes", found.len());
        Ok(found)
    }

    /// Una violación por cada campo en cero; un inodo puede aportar varias.
    pub fn validate_inode_fields(&self) -> Vec<FieldViolation> {
        let mut found = Vec::new();

        for (idx, inode) in self.indexed() {
            for field in InodeField::ALL {
                // uid/gid = 0 se marca como inválido aunque normalmente sea root.
                if field_value(inode, field) == 0 {
                    found.push(FieldViolation { inode: idx, field });
                }
            }
        }

        debug!("validación de campos: {} violaciones", found.len());
        found
    }

    /// Los tres chequeos, cada uno sobre la tabla completa.
    pub fn run(&self) -> Result<FsckReport> {
        let mut report = FsckReport::new();
        report.data_bitmap = self.check_data_bitmap()?;
        report.inode_bitmap = self.check_inode_bitmap()?;
        report.field_violations = self.validate_inode_fields();
        Ok(report)
    }
}

fn field_value(inode: &Inode, field: InodeField) -> u32 {
    match field {
        InodeField::Mode => inode.mode,
        InodeField::Uid => inode.uid,
        InodeField::Gid => inode.gid,
        InodeField::FileSize => inode.file_size,
        InodeField::LinksCount => inode.links_count,
    }
}
