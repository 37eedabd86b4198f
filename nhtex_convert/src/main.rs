use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing::info;

use nhtex_convert::{detect_layout, tiled_to_dds, to_tiled, ConvertError, TILED_LAYOUT};

#[derive(Parser)]
#[command(version, about = "Convert console tiled textures to and from linear formats")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deswizzle tiled containers into DDS files
    ToLinear {
        /// Tiled container files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output path, only valid with a single input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Swizzle DDS files or linear containers into tiled containers
    ToTiled {
        /// DDS or linear container files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output path, only valid with a single input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the header geometry of a container
    Info {
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::ToLinear { inputs, output } => convert_files(&inputs, output, "dds", tiled_to_dds),
        Command::ToTiled { inputs, output } => convert_files(&inputs, output, "nhtex", to_tiled),
        Command::Info { input } => print_info(&input),
    }
}

fn convert_files(
    inputs: &[PathBuf],
    output: Option<PathBuf>,
    extension: &str,
    convert: fn(&[u8]) -> Result<Vec<u8>, ConvertError>,
) -> anyhow::Result<()> {
    if output.is_some() && inputs.len() != 1 {
        bail!("--output requires exactly one input file");
    }

    // Files are independent, so batches convert in parallel.
    inputs.par_iter().try_for_each(|input| -> anyhow::Result<()> {
        let data = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
        let converted =
            convert(&data).with_context(|| format!("failed to convert {}", input.display()))?;

        let path = output
            .clone()
            .unwrap_or_else(|| input.with_extension(extension));
        fs::write(&path, converted)
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!(input = %input.display(), output = %path.display(), "converted");
        Ok(())
    })
}

fn print_info(input: &Path) -> anyhow::Result<()> {
    let data = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;

    if data.starts_with(b"DDS ") {
        let dds = ddsfile::Dds::read(&mut Cursor::new(&data))?;
        println!(
            "DDS: {}x{} pixels, {} mip levels, {} payload bytes",
            dds.get_width(),
            dds.get_height(),
            dds.get_num_mipmap_levels(),
            dds.data.len()
        );
        return Ok(());
    }

    let layout = detect_layout(&data).context("not a recognized texture container")?;
    let info = layout.read_info(&mut Cursor::new(&data))?;
    let payload = info.payload(&data)?;

    let variant = if *layout == TILED_LAYOUT { "tiled" } else { "linear" };
    println!(
        "{variant} container: {}x{} pixels, {} mip levels, {} payload bytes at 0x{:X}",
        info.width,
        info.height,
        info.mip_count,
        payload.len(),
        info.data_offset
    );
    Ok(())
}
