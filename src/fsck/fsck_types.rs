/* Tipos de los hallazgos del fsck:
desajustes entre inodos y bitmaps, campos en cero,
y el FsckReport que los junta. Ningún hallazgo detiene la corrida. */

use std::fmt;

/// Qué tan mal está la referencia a un bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapMiss {
    /// El bit existe y está en 0.
    NotMarked,
    /// El índice cae fuera del bitmap (no hay bit que mirar).
    OutsideBitmap,
}

/// Un inodo con bloques asignados cuyo bloque directo no está marcado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBitmapMismatch {
    pub block: u32,
    pub inode: u32,
    pub miss: BitmapMiss,
}

/// Un inodo vivo que no está marcado en el bitmap de inodos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InodeBitmapMismatch {
    pub inode: u32,
    pub miss: BitmapMiss,
}

/// Campos que no pueden valer 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeField {
    Mode,
    Uid,
    Gid,
    FileSize,
    LinksCount,
}

impl InodeField {
    pub const ALL: [InodeField; 5] = [
        InodeField::Mode,
        InodeField::Uid,
        InodeField::Gid,
        InodeField::FileSize,
        InodeField::LinksCount,
    ];
}

impl fmt::Display for InodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InodeField::Mode => "invalid mode",
            InodeField::Uid => "invalid user ID",
            InodeField::Gid => "invalid group ID",
            InodeField::FileSize => "file size",
            InodeField::LinksCount => "invalid links count",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
    pub inode: u32,
    pub field: InodeField,
}

#[derive(Debug, Default)]
pub struct FsckReport {
    pub data_bitmap: Vec<DataBitmapMismatch>,
    pub inode_bitmap: Vec<InodeBitmapMismatch>,
    pub field_violations: Vec<FieldViolation>,
    /// Inodos reparados cuyo bloque directo cae fuera de la región de datos.
    pub direct_blocks_outside_data: u32,
}

impl FsckReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.data_bitmap.is_empty()
            && self.inode_bitmap.is_empty()
            && self.field_violations.is_empty()
    }

    pub fn total(&self) -> usize {
        self.data_bitmap.len() + self.inode_bitmap.len() + self.field_violations.len()
    }
}
