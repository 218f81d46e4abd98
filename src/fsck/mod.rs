//! Revisión y reparación de una imagen VSFS.
//!
//! Orden de la corrida: layout, superblock antes/después de repararlo,
//! inodos sintéticos, chequeos de bitmaps, validación de campos y volcado
//! final de la tabla. La tabla de inodos se lee una sola vez después de la
//! reparación y esa copia alimenta a todos los chequeos y al volcado.

pub mod check;
pub mod fsck_types;
pub mod repair;
pub mod report;

use std::io::{Read, Seek, Write};

use log::info;

use crate::bitmap::BitmapView;
use crate::error::Result;
use crate::image::ImageStore;
use crate::inode::InodeTable;
use crate::layout::Geometry;
use crate::superblock::{read_superblock, write_superblock};

use check::ConsistencyChecker;
use fsck_types::FsckReport;
use repair::{RepairRng, Repairer};
use report::Reporter;

pub fn run_fsck<D, W>(
    store: &mut ImageStore<D>,
    geometry: &Geometry,
    rng: RepairRng,
    reporter: &mut Reporter<W>,
) -> Result<FsckReport>
where
    D: Read + Write + Seek,
    W: Write,
{
    // --- Paso 1: superblock tal como está ---
    let before = read_superblock(store, geometry)?;

    reporter.dump_layout(geometry)?;
    reporter.heading("=== before fixed superblock ===")?;
    reporter.dump_superblock(&before)?;

    // --- Paso 2: superblock canónico, persistido antes de tocar inodos ---
    let mut repairer = Repairer::new(geometry, rng);
    let fixed = repairer.fix_superblock();
    reporter.line("Fixed Superblock")?;
    write_superblock(store, geometry, &fixed)?;

    reporter.heading("=== after fixed superblock ===")?;
    reporter.dump_superblock(&fixed)?;

    // --- Paso 3: inodos ---
    let outside = repairer.fix_inodes(store)?;
    reporter.line("Fixed Inodes")?;
    store.flush()?;

    // --- Paso 4: chequeos sobre una sola lectura de la tabla ---
    let inodes = InodeTable::new(store, geometry).read_all()?;
    let data_bitmap = BitmapView::load(store, geometry, geometry.data_bitmap_block)?;
    let inode_bitmap = BitmapView::load(store, geometry, geometry.inode_bitmap_block)?;
    let checker = ConsistencyChecker::new(&inodes, &inode_bitmap, &data_bitmap);

    let mut report = checker.run()?;
    report.direct_blocks_outside_data = outside;

    reporter.data_bitmap_mismatches(&report.data_bitmap)?;
    reporter.inode_bitmap_mismatches(&report.inode_bitmap)?;
    reporter.heading("=== Inodes ===")?;
    reporter.field_violations(&report.field_violations)?;

    // --- Paso 5: volcado ---
    reporter.dump_inodes(&inodes)?;

    reporter.heading("Done with File system consistency check and repair completed.")?;
    reporter.flush()?;

    info!(
        "fsck terminado: {} hallazgos (datos = {}, inodos = {}, campos = {})",
        report.total(),
        report.data_bitmap.len(),
        report.inode_bitmap.len(),
        report.field_violations.len()
    );
    Ok(report)
}
