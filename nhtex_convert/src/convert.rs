//! Conversions between the tiled container, the linear container, and DDS.
use std::io::Cursor;

use tracing::debug;

use switch_swizzle::surface::{
    deswizzle_surface, swizzle_surface, BlockDim, SurfaceGeometry, TileMode,
};

use crate::header::{
    detect_layout, write_dds, write_tiled_container, LINEAR_LAYOUT, TILED_LAYOUT,
};
use crate::ConvertError;

/// The font textures store BC4 blocks, a 4x4 pixel footprint in 8 bytes.
const BYTES_PER_BLOCK: usize = 8;

fn font_geometry(width: u32, height: u32, mip_count: u32) -> SurfaceGeometry {
    SurfaceGeometry {
        width: width as usize,
        height: height as usize,
        block_dim: BlockDim::block_4x4(),
        bytes_per_block: BYTES_PER_BLOCK,
        level_count: mip_count as usize,
        tile_mode: TileMode::BlockLinear,
        round_pitch: true,
    }
}

/// Deswizzles a tiled container into a DDS file.
pub fn tiled_to_dds(input: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let info = TILED_LAYOUT.read_info(&mut Cursor::new(input))?;
    let payload = info.payload(input)?;

    debug!(
        width = info.width,
        height = info.height,
        mip_count = info.mip_count,
        payload_len = payload.len(),
        "deswizzling tiled container"
    );

    let geometry = font_geometry(info.width, info.height, info.mip_count);
    let linear = deswizzle_surface(&geometry, payload)?;

    Ok(write_dds(info.width, info.height, info.mip_count, &linear))
}

/// Swizzles a DDS file into a tiled container.
pub fn dds_to_tiled(input: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let dds = ddsfile::Dds::read(&mut Cursor::new(input))?;
    let width = dds.get_width();
    let height = dds.get_height();
    let mip_count = dds.get_num_mipmap_levels();

    debug!(width, height, mip_count, "swizzling DDS");

    let geometry = font_geometry(width, height, mip_count);
    let tiled = swizzle_surface(&geometry, &dds.data)?;

    Ok(write_tiled_container(width, height, mip_count, &tiled))
}

/// Swizzles a linear container into a tiled container.
pub fn linear_to_tiled(input: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let info = LINEAR_LAYOUT.read_info(&mut Cursor::new(input))?;
    let payload = info.payload(input)?;

    debug!(
        width = info.width,
        height = info.height,
        mip_count = info.mip_count,
        payload_len = payload.len(),
        "swizzling linear container"
    );

    let geometry = font_geometry(info.width, info.height, info.mip_count);
    let tiled = swizzle_surface(&geometry, payload)?;

    Ok(write_tiled_container(info.width, info.height, info.mip_count, &tiled))
}

/// Swizzles a DDS file or a linear container into a tiled container,
/// dispatching on the input's magic.
pub fn to_tiled(input: &[u8]) -> Result<Vec<u8>, ConvertError> {
    if input.starts_with(b"DDS ") {
        return dds_to_tiled(input);
    }
    match detect_layout(input) {
        Some(layout) if *layout == LINEAR_LAYOUT => linear_to_tiled(input),
        _ => Err(ConvertError::UnrecognizedContainer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::StdRng, Rng, SeedableRng};
    use switch_swizzle::surface::{deswizzled_chain_size, plan_levels};

    fn random_blocks(len: usize) -> Vec<u8> {
        let seed = [13u8; 32];
        let mut rng: StdRng = SeedableRng::from_seed(seed);
        (0..len).map(|_| rng.gen_range::<u8, _>(0..=255)).collect()
    }

    // A linear container in the desktop layout around a packed payload.
    fn linear_container(width: u32, height: u32, mip_count: u32, payload: &[u8]) -> Vec<u8> {
        let index_len = 0x18 * mip_count as usize;
        let data_start = 0x78 + index_len;

        let mut out = vec![0u8; data_start];
        out[0x30] = 0x50;
        out[0x40..0x44].copy_from_slice(&width.to_le_bytes());
        out[0x44..0x48].copy_from_slice(&height.to_le_bytes());
        out[0x70..0x74].copy_from_slice(&mip_count.to_le_bytes());
        out[0x80..0x88].copy_from_slice(&((data_start - 0x80) as i64).to_le_bytes());
        out.extend_from_slice(payload);

        let total = out.len();
        out[0x18..0x20].copy_from_slice(&((total - 0x30) as i64).to_le_bytes());
        out
    }

    fn linear_chain(width: u32, height: u32, mip_count: u32) -> Vec<u8> {
        let plans = plan_levels(&font_geometry(width, height, mip_count)).unwrap();
        random_blocks(deswizzled_chain_size(&plans))
    }

    #[test]
    fn tiled_to_dds_and_back() {
        let linear = linear_chain(32, 32, 3);
        let geometry = font_geometry(32, 32, 3);
        let tiled = swizzle_surface(&geometry, &linear).unwrap();
        let container = write_tiled_container(32, 32, 3, &tiled);

        let dds = tiled_to_dds(&container).unwrap();
        assert_eq!(linear, dds[0x80..]);
        assert_eq!(32, u32::from_le_bytes(dds[0x0C..0x10].try_into().unwrap()));
        assert_eq!(3, u32::from_le_bytes(dds[0x1C..0x20].try_into().unwrap()));

        // Swizzling the DDS again reproduces the original container.
        assert_eq!(container, dds_to_tiled(&dds).unwrap());
    }

    #[test]
    fn linear_container_to_tiled() {
        let linear = linear_chain(64, 32, 2);
        let container = linear_container(64, 32, 2, &linear);

        let tiled = to_tiled(&container).unwrap();

        let info = TILED_LAYOUT.read_info(&mut Cursor::new(&tiled)).unwrap();
        assert_eq!((64, 32, 2), (info.width, info.height, info.mip_count));

        // The tiled payload deswizzles back to the source chain.
        let geometry = font_geometry(64, 32, 2);
        let roundtrip = deswizzle_surface(&geometry, info.payload(&tiled).unwrap()).unwrap();
        assert_eq!(linear, roundtrip);
    }

    #[test]
    fn to_tiled_rejects_unknown_input() {
        assert!(matches!(
            to_tiled(&[0u8; 0x90]),
            Err(ConvertError::UnrecognizedContainer)
        ));
    }

    #[test]
    fn tiled_to_dds_rejects_bad_mip_count() {
        // 16x16 pixels only supports 5 levels, so 9 must fail fast.
        let container = write_tiled_container(16, 16, 9, &[0u8; 4096]);
        assert!(matches!(
            tiled_to_dds(&container),
            Err(ConvertError::Swizzle(
                switch_swizzle::SwizzleError::UnsupportedLevelCount {
                    level_count: 9,
                    max_levels: 5
                }
            ))
        ));
    }

    #[test]
    fn tiled_to_dds_rejects_truncated_payload() {
        let container = write_tiled_container(128, 128, 1, &[0u8; 100]);
        assert!(matches!(
            tiled_to_dds(&container),
            Err(ConvertError::Swizzle(
                switch_swizzle::SwizzleError::NotEnoughData { .. }
            ))
        ));
    }
}
