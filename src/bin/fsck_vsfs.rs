use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use log::info;

use vsfs::fsck::{fsck_types::FsckReport, repair::RepairRng, report::Reporter, run_fsck};
use vsfs::{Geometry, ImageStore};

/// Revisa y repara la metadata de una imagen VSFS (superblock, bitmaps, tabla de inodos).
#[derive(Parser, Debug)]
#[command(name = "fsck_vsfs", version)]
struct Cli {
    /// Imagen a revisar; se abre en lectura/escritura.
    #[arg(default_value = "vsfs.img")]
    image: PathBuf,
}

fn run(cli: &Cli) -> Result<FsckReport> {
    let geometry = Geometry::canonical();

    // ——————————————————————————————————————————
    //       ABRIR IMAGEN (se libera al salir de esta función)
    // ——————————————————————————————————————————
    let mut store = ImageStore::open(&cli.image, &geometry)
        .with_context(|| format!("Failed to open the {} file", cli.image.display()))?;

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut reporter = Reporter::new(stdout.lock(), color);

    // ——————————————————————————————————————————
    //       EJECUTAR FSCK
    // ——————————————————————————————————————————
    let report = run_fsck(&mut store, &geometry, RepairRng::from_clock(), &mut reporter)
        .with_context(|| format!("fsck aborted on {}", cli.image.display()))?;

    Ok(report)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) => {
            info!(
                "{:?}: {}",
                cli.image,
                if report.is_clean() { "limpio" } else { "con hallazgos" }
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {:#}", "✗".red().bold(), err);
            ExitCode::from(1)
        }
    }
}
