// -----------------------------------------------------------------------------
// Reparación: superblock canónico + inodos sintéticos
// -----------------------------------------------------------------------------
//
// No es una reparación "real": se descarta lo que hay en disco y se escribe un
// estado conocido. El llamador debe reportar el superblock anterior antes de
// llamar a `fix_superblock`.

use std::io::{Read, Seek, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};

use crate::error::Result;
use crate::image::ImageStore;
use crate::inode::{Inode, InodeTable};
use crate::layout::Geometry;
use crate::superblock::Superblock;

/// Permisos rwxrwxrwx de archivo regular.
pub const REPAIRED_MODE: u32 = 0o777;
pub const ID_RANGE: (u32, u32) = (1000, 2000);
pub const TIME_RANGE: (u32, u32) = (0, 1_000_000);
pub const DIRECT_BLOCK_BASE: u32 = 10;
pub const SINGLE_INDIRECT_BASE: u32 = 100;
/// Cada cuántos inodos se asigna un indirecto simple.
pub const SINGLE_INDIRECT_STRIDE: u32 = 5;

/// Generador xorshift con semilla; determinista en pruebas.
#[derive(Debug, Clone)]
pub struct RepairRng {
    state: u64,
}

impl RepairRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Valor en `[lo, hi)`.
    pub fn in_range(&mut self, (lo, hi): (u32, u32)) -> u32 {
        let span = u64::from(hi.saturating_sub(lo)).max(1);
        lo + (self.next_u64() % span) as u32
    }
}

pub struct Repairer<'g> {
    geometry: &'g Geometry,
    rng: RepairRng,
}

impl<'g> Repairer<'g> {
    pub fn new(geometry: &'g Geometry, rng: RepairRng) -> Self {
        Self { geometry, rng }
    }

    /// Superblock con las constantes compiladas, sin mirar lo que hay en disco.
    pub fn fix_superblock(&self) -> Superblock {
        Superblock::canonical(self.geometry)
    }

    /// Registro nuevo para el índice `index`; todo lo no asignado queda en 0.
    pub fn synthesize_inode(&mut self, index: u32) -> Inode {
        let mut inode = Inode::zeroed(self.geometry);

        inode.mode = REPAIRED_MODE;
        inode.uid = self.rng.in_range(ID_RANGE);
        inode.gid = self.rng.in_range(ID_RANGE);
        inode.file_size = 1;
        inode.blocks = 1;
        inode.atime = self.rng.in_range(TIME_RANGE);
        inode.ctime = self.rng.in_range(TIME_RANGE);
        inode.mtime = self.rng.in_range(TIME_RANGE);
        inode.dtime = 0;
        inode.direct_block = DIRECT_BLOCK_BASE + index;

        if index % SINGLE_INDIRECT_STRIDE == 0 {
            inode.single_indirect = SINGLE_INDIRECT_BASE + index;
        }

        inode
    }

    /// Reescribe cada inodo de la tabla, uno por uno (encode + write por inodo).
    /// Devuelve cuántos bloques directos quedaron fuera de la región de datos.
    pub fn fix_inodes<D: Read + Write + Seek>(&mut self, store: &mut ImageStore<D>) -> Result<u32> {
        let geometry = self.geometry;
        let count = geometry.inode_count();
        let mut outside = 0u32;

        for i in 0..count {
            let inode = self.synthesize_inode(i);

            // El bloque directo no se valida contra la geometría; solo se avisa.
            if !geometry.is_data_block(inode.direct_block) {
                warn!(
                    "inodo {}: bloque directo {} fuera de la región de datos ({}..{})",
                    i, inode.direct_block, geometry.first_data_block, geometry.total_blocks
                );
                outside += 1;
            }

            InodeTable::new(store, geometry).write(i, &inode)?;
            debug!("inodo {} reescrito (direct = {})", i, inode.direct_block);
        }

        info!("{} inodos reescritos, {} con bloque directo fuera de rango", count, outside);
        Ok(outside)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::superblock::{read_superblock, write_superblock};
    use std::io::Cursor;

    fn blank_store(g: &Geometry) -> ImageStore<Cursor<Vec<u8>>> {
        ImageStore::new(Cursor::new(vec![0u8; g.image_bytes() as usize]), g)
    }

    #[test]
    fn rng_stays_in_range() {
        let mut rng = RepairRng::new(7);
        for _ in 0..10_000 {
            let id = rng.in_range(ID_RANGE);
            assert!((1000..2000).contains(&id));
            let t = rng.in_range(TIME_RANGE);
            assert!(t < 1_000_000);
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RepairRng::new(42);
        let mut b = RepairRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn fix_superblock_ignores_disk_and_is_idempotent() {
        let g = Geometry::canonical();
        let mut store = blank_store(&g);
        store.write_range(0, &[0xab; 64]).unwrap();

        let repairer = Repairer::new(&g, RepairRng::new(1));
        write_superblock(&mut store, &g, &repairer.fix_superblock()).unwrap();
        let first = store.read_range(0, 4096).unwrap();
        write_superblock(&mut store, &g, &repairer.fix_superblock()).unwrap();
        let second = store.read_range(0, 4096).unwrap();

        assert_eq!(first, second);
        assert_eq!(read_superblock(&mut store, &g).unwrap(), Superblock::canonical(&g));
    }

    #[test]
    fn fixed_inodes_follow_the_synthesis_rules() {
        let g = Geometry::canonical();
        let mut store = blank_store(&g);
        // basura previa en toda la tabla
        let table_len = (g.inode_table_blocks() * g.block_size) as usize;
        store
            .write_range(g.block_offset(g.inode_table_start), &vec![0x5a; table_len])
            .unwrap();

        let mut repairer = Repairer::new(&g, RepairRng::new(99));
        repairer.fix_inodes(&mut store).unwrap();

        let inodes = InodeTable::new(&mut store, &g).read_all().unwrap();
        for (i, inode) in inodes.iter().enumerate() {
            let i = i as u32;
            assert_eq!(inode.mode, 0o777);
            assert!((1000..2000).contains(&inode.uid));
            assert!((1000..2000).contains(&inode.gid));
            assert_eq!(inode.file_size, 1);
            assert_eq!(inode.blocks, 1);
            assert!(inode.atime < 1_000_000);
            assert!(inode.ctime < 1_000_000);
            assert!(inode.mtime < 1_000_000);
            assert_eq!(inode.dtime, 0);
            assert_eq!(inode.links_count, 0);
            assert_eq!(inode.direct_block, 10 + i);
            if i % 5 == 0 {
                assert_eq!(inode.single_indirect, 100 + i);
            } else {
                assert_eq!(inode.single_indirect, 0);
            }
            assert_eq!(inode.double_indirect, 0);
            assert_eq!(inode.triple_indirect, 0);
            assert!(inode.reserved.iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn reports_direct_blocks_past_the_image() {
        let g = Geometry::canonical();
        let mut store = blank_store(&g);

        let mut repairer = Repairer::new(&g, RepairRng::new(3));
        // 10 + i >= 64 para i en 54..80
        assert_eq!(repairer.fix_inodes(&mut store).unwrap(), 26);
    }
}
