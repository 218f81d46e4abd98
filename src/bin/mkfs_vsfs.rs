use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use vsfs::mkfs::format_image;
use vsfs::Geometry;

/// Crea una imagen VSFS vacía con la geometría fija.
#[derive(Parser, Debug)]
#[command(name = "mkfs_vsfs", version)]
struct Cli {
    /// Archivo de imagen a crear (se sobrescribe si existe).
    #[arg(default_value = "vsfs.img")]
    image: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let geometry = Geometry::canonical();

    format_image(&cli.image, &geometry)
        .with_context(|| format!("No se pudo crear la imagen {}", cli.image.display()))?;

    println!(
        "mkfs_vsfs: imagen {} creada con {} bloques de {} bytes, {} inodos, {} bloques de datos.",
        cli.image.display(),
        geometry.total_blocks,
        geometry.block_size,
        geometry.inode_count(),
        geometry.total_blocks - geometry.first_data_block
    );
    Ok(())
}
