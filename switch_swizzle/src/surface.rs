//! Mip chain planning and transforms for surfaces stored in a combined buffer.
//!
//! Texture containers commonly store all mip levels in one allocated region.
//! The row-major layout is tightly packed while the tiled layout aligns each
//! level and pads it to whole tiling blocks.
//! [plan_levels] computes the dimensions, stacking factor, size, and offset of
//! every level up front, and [swizzle_surface] and [deswizzle_surface] use the
//! plans to move the data in either direction.
use std::cmp::max;
use std::num::NonZeroUsize;

use crate::swizzle::{
    deswizzle_block_linear, deswizzle_pitch_linear, pitch_linear_pitch, swizzle_block_linear,
    swizzle_pitch_linear,
};
use crate::{
    block_height, deswizzled_surface_size, div_round_up, mip_block_heights, round_up,
    swizzled_surface_size, BlockHeight, SwizzleError, GOB_WIDTH_IN_BYTES, LEVEL_ALIGNMENT,
};

/// The width and height in pixels of the compressed blocks of a texture format.
/// Uncompressed formats use a single pixel per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDim {
    pub width: NonZeroUsize,
    pub height: NonZeroUsize,
}

impl BlockDim {
    /// A 1x1 block for uncompressed formats.
    pub fn uncompressed() -> Self {
        BlockDim {
            width: NonZeroUsize::new(1).unwrap(),
            height: NonZeroUsize::new(1).unwrap(),
        }
    }

    /// The 4x4 block used by BCN compressed formats.
    pub fn block_4x4() -> Self {
        BlockDim {
            width: NonZeroUsize::new(4).unwrap(),
            height: NonZeroUsize::new(4).unwrap(),
        }
    }
}

/// The physical layout of the tiled data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum TileMode {
    /// GOB based tiling, the GPU's native layout for textures.
    BlockLinear,
    /// Row-major rows with a padded stride.
    PitchLinear,
}

/// The geometry of a surface and its mip chain.
/// Dimensions are for the base mip level and given in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceGeometry {
    pub width: usize,
    pub height: usize,
    pub block_dim: BlockDim,
    pub bytes_per_block: usize,
    pub level_count: usize,
    pub tile_mode: TileMode,
    /// Round pitch linear strides up to 32 bytes.
    pub round_pitch: bool,
}

/// The layout of a single mip level derived from a [SurfaceGeometry].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelPlan {
    pub level: usize,
    pub width_in_blocks: usize,
    pub height_in_blocks: usize,
    /// The effective stacking factor for this level.
    pub block_height: BlockHeight,
    /// Row stride of the tiled data in bytes.
    pub pitch: usize,
    /// Size of the tiled level including tiling padding.
    pub tiled_size: usize,
    /// Size of the level as tightly packed row-major blocks.
    pub linear_size: usize,
    /// Aligned byte offset of this level inside the packed tiled chain.
    pub tiled_offset: usize,
    /// Byte offset of this level inside the packed row-major chain.
    pub linear_offset: usize,
}

/// Computes the layout of every mip level for `geometry`.
///
/// Fails with a geometry error for zero dimensions
/// or a level count the base dimensions can't support.
/// The level plans are otherwise total,
/// including the padding each tiled level needs.
pub fn plan_levels(geometry: &SurfaceGeometry) -> Result<Vec<LevelPlan>, SwizzleError> {
    if geometry.width == 0 || geometry.height == 0 {
        return Err(SwizzleError::InvalidDimensions {
            width: geometry.width,
            height: geometry.height,
        });
    }

    let max_levels = max_level_count(geometry.width, geometry.height);
    if geometry.level_count == 0 || geometry.level_count > max_levels {
        return Err(SwizzleError::UnsupportedLevelCount {
            level_count: geometry.level_count,
            max_levels,
        });
    }

    let level_heights: Vec<_> = (0..geometry.level_count)
        .map(|level| {
            div_round_up(
                max(1, geometry.height >> level),
                geometry.block_dim.height.get(),
            )
        })
        .collect();

    // The base level picks the stacking factor and later levels shrink it.
    let base = block_height(level_heights[0]);
    let block_heights = mip_block_heights(base, &level_heights);

    let mut plans = Vec::with_capacity(geometry.level_count);
    let mut tiled_offset = 0;
    let mut linear_offset = 0;
    for (level, block_height) in block_heights.into_iter().enumerate() {
        let width_in_blocks = div_round_up(
            max(1, geometry.width >> level),
            geometry.block_dim.width.get(),
        );
        let height_in_blocks = level_heights[level];

        let (pitch, tiled_size) = match geometry.tile_mode {
            TileMode::BlockLinear => (
                round_up(width_in_blocks * geometry.bytes_per_block, GOB_WIDTH_IN_BYTES),
                swizzled_surface_size(
                    width_in_blocks,
                    height_in_blocks,
                    block_height,
                    geometry.bytes_per_block,
                ),
            ),
            TileMode::PitchLinear => {
                let pitch = pitch_linear_pitch(
                    width_in_blocks,
                    geometry.bytes_per_block,
                    geometry.round_pitch,
                );
                (pitch, pitch * height_in_blocks)
            }
        };
        let linear_size =
            deswizzled_surface_size(width_in_blocks, height_in_blocks, geometry.bytes_per_block);

        tiled_offset = round_up(tiled_offset, LEVEL_ALIGNMENT);
        plans.push(LevelPlan {
            level,
            width_in_blocks,
            height_in_blocks,
            block_height,
            pitch,
            tiled_size,
            linear_size,
            tiled_offset,
            linear_offset,
        });

        tiled_offset += tiled_size;
        linear_offset += linear_size;
    }

    Ok(plans)
}

/// The number of mip levels needed to reach 1x1 pixels from the base dimensions.
fn max_level_count(width: usize, height: usize) -> usize {
    (usize::BITS - max(width, height).leading_zeros()) as usize
}

/// Size in bytes of the packed tiled chain described by `plans`.
pub fn swizzled_chain_size(plans: &[LevelPlan]) -> usize {
    plans
        .last()
        .map_or(0, |plan| plan.tiled_offset + plan.tiled_size)
}

/// Size in bytes of the packed row-major chain described by `plans`.
pub fn deswizzled_chain_size(plans: &[LevelPlan]) -> usize {
    plans
        .last()
        .map_or(0, |plan| plan.linear_offset + plan.linear_size)
}

/// Swizzles the row-major blocks of one mip level.
/// `source` holds the level's tightly packed blocks.
pub fn swizzle_level(
    geometry: &SurfaceGeometry,
    plan: &LevelPlan,
    source: &[u8],
) -> Result<Vec<u8>, SwizzleError> {
    match geometry.tile_mode {
        TileMode::BlockLinear => swizzle_block_linear(
            plan.width_in_blocks,
            plan.height_in_blocks,
            source,
            plan.block_height,
            geometry.bytes_per_block,
        ),
        TileMode::PitchLinear => swizzle_pitch_linear(
            plan.width_in_blocks,
            plan.height_in_blocks,
            source,
            geometry.bytes_per_block,
            geometry.round_pitch,
        ),
    }
}

/// Deswizzles the tiled blocks of one mip level.
/// `source` holds the level's tiled data including its padding.
pub fn deswizzle_level(
    geometry: &SurfaceGeometry,
    plan: &LevelPlan,
    source: &[u8],
) -> Result<Vec<u8>, SwizzleError> {
    match geometry.tile_mode {
        TileMode::BlockLinear => deswizzle_block_linear(
            plan.width_in_blocks,
            plan.height_in_blocks,
            source,
            plan.block_height,
            geometry.bytes_per_block,
        ),
        TileMode::PitchLinear => deswizzle_pitch_linear(
            plan.width_in_blocks,
            plan.height_in_blocks,
            source,
            geometry.bytes_per_block,
            geometry.round_pitch,
        ),
    }
}

/// Swizzles all the mip levels in `source` into a single tiled buffer
/// with the appropriate level alignment and padding.
///
/// `source` holds the tightly packed row-major chain, largest level first.
pub fn swizzle_surface(
    geometry: &SurfaceGeometry,
    source: &[u8],
) -> Result<Vec<u8>, SwizzleError> {
    let plans = plan_levels(geometry)?;

    let expected_size = deswizzled_chain_size(&plans);
    if source.len() < expected_size {
        return Err(SwizzleError::NotEnoughData {
            expected_size,
            actual_size: source.len(),
        });
    }

    let mut swizzled_data = vec![0u8; swizzled_chain_size(&plans)];
    for plan in &plans {
        let level = swizzle_level(
            geometry,
            plan,
            &source[plan.linear_offset..plan.linear_offset + plan.linear_size],
        )?;
        swizzled_data[plan.tiled_offset..plan.tiled_offset + plan.tiled_size]
            .copy_from_slice(&level);
    }

    Ok(swizzled_data)
}

/// Deswizzles all the mip levels in `source` into a single tightly packed
/// row-major buffer without any padding between levels.
///
/// `source` holds the packed tiled chain, largest level first.
pub fn deswizzle_surface(
    geometry: &SurfaceGeometry,
    source: &[u8],
) -> Result<Vec<u8>, SwizzleError> {
    let plans = plan_levels(geometry)?;

    let expected_size = swizzled_chain_size(&plans);
    if source.len() < expected_size {
        return Err(SwizzleError::NotEnoughData {
            expected_size,
            actual_size: source.len(),
        });
    }

    let mut deswizzled_data = vec![0u8; deswizzled_chain_size(&plans)];
    for plan in &plans {
        let level = deswizzle_level(
            geometry,
            plan,
            &source[plan.tiled_offset..plan.tiled_offset + plan.tiled_size],
        )?;
        deswizzled_data[plan.linear_offset..plan.linear_offset + plan.linear_size]
            .copy_from_slice(&level);
    }

    Ok(deswizzled_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_blocks(len: usize) -> Vec<u8> {
        let seed = [13u8; 32];
        let mut rng: StdRng = SeedableRng::from_seed(seed);
        (0..len).map(|_| rng.gen_range::<u8, _>(0..=255)).collect()
    }

    fn bc4_geometry(width: usize, height: usize, level_count: usize) -> SurfaceGeometry {
        SurfaceGeometry {
            width,
            height,
            block_dim: BlockDim::block_4x4(),
            bytes_per_block: 8,
            level_count,
            tile_mode: TileMode::BlockLinear,
            round_pitch: true,
        }
    }

    #[test]
    fn plan_zero_dimensions() {
        assert_eq!(
            Err(SwizzleError::InvalidDimensions {
                width: 0,
                height: 128
            }),
            plan_levels(&bc4_geometry(0, 128, 1))
        );
        assert_eq!(
            Err(SwizzleError::InvalidDimensions {
                width: 128,
                height: 0
            }),
            plan_levels(&bc4_geometry(128, 0, 1))
        );
    }

    #[test]
    fn plan_unsupported_level_counts() {
        // 256x64 supports levels down to 1x1 after 9 halvings.
        assert_eq!(
            Err(SwizzleError::UnsupportedLevelCount {
                level_count: 0,
                max_levels: 9
            }),
            plan_levels(&bc4_geometry(256, 64, 0))
        );
        assert_eq!(
            Err(SwizzleError::UnsupportedLevelCount {
                level_count: 10,
                max_levels: 9
            }),
            plan_levels(&bc4_geometry(256, 64, 10))
        );
        assert!(plan_levels(&bc4_geometry(256, 64, 9)).is_ok());
    }

    #[test]
    fn plan_block_linear_chain() {
        let geometry = SurfaceGeometry {
            width: 256,
            height: 64,
            block_dim: BlockDim::block_4x4(),
            bytes_per_block: 16,
            level_count: 4,
            tile_mode: TileMode::BlockLinear,
            round_pitch: true,
        };
        let plans = plan_levels(&geometry).unwrap();

        let dims: Vec<_> = plans
            .iter()
            .map(|p| (p.width_in_blocks, p.height_in_blocks))
            .collect();
        assert_eq!(vec![(64, 16), (32, 8), (16, 4), (8, 2)], dims);

        // The stacking factor shrinks starting at the first level whose
        // rounded height drops below the base threshold of 16 rows.
        let block_heights: Vec<_> = plans.iter().map(|p| p.block_height).collect();
        assert_eq!(
            vec![
                BlockHeight::Two,
                BlockHeight::One,
                BlockHeight::One,
                BlockHeight::One,
            ],
            block_heights
        );

        let tiled: Vec<_> = plans.iter().map(|p| (p.tiled_offset, p.tiled_size)).collect();
        assert_eq!(
            vec![(0, 16384), (16384, 4096), (20480, 2048), (22528, 1024)],
            tiled
        );

        let linear: Vec<_> = plans
            .iter()
            .map(|p| (p.linear_offset, p.linear_size))
            .collect();
        assert_eq!(
            vec![(0, 16384), (16384, 4096), (20480, 1024), (21504, 256)],
            linear
        );

        assert_eq!(23552, swizzled_chain_size(&plans));
        assert_eq!(21760, deswizzled_chain_size(&plans));
    }

    #[test]
    fn plan_sizes_bound_linear_sizes() {
        for level_count in 1..=8 {
            let plans = plan_levels(&bc4_geometry(640, 320, level_count)).unwrap();
            for plan in plans {
                assert!(plan.tiled_size >= plan.linear_size);
                assert_eq!(0, plan.tiled_offset % 512);
            }
        }
    }

    #[test]
    fn plan_pitch_linear_levels_align() {
        // Pitch linear levels are small enough to need alignment padding.
        let geometry = SurfaceGeometry {
            width: 8,
            height: 8,
            block_dim: BlockDim::uncompressed(),
            bytes_per_block: 4,
            level_count: 2,
            tile_mode: TileMode::PitchLinear,
            round_pitch: true,
        };
        let plans = plan_levels(&geometry).unwrap();

        assert_eq!(32, plans[0].pitch);
        assert_eq!((0, 256), (plans[0].tiled_offset, plans[0].tiled_size));
        assert_eq!((512, 128), (plans[1].tiled_offset, plans[1].tiled_size));
    }

    #[test]
    fn swizzle_deswizzle_surface_block_linear() {
        let geometry = bc4_geometry(128, 128, 3);
        let plans = plan_levels(&geometry).unwrap();
        let input = random_blocks(deswizzled_chain_size(&plans));

        let swizzled = swizzle_surface(&geometry, &input).unwrap();
        assert_eq!(swizzled_chain_size(&plans), swizzled.len());

        let deswizzled = deswizzle_surface(&geometry, &swizzled).unwrap();
        assert_eq!(input, deswizzled);
    }

    #[test]
    fn swizzle_deswizzle_surface_pitch_linear() {
        let geometry = SurfaceGeometry {
            width: 40,
            height: 24,
            block_dim: BlockDim::uncompressed(),
            bytes_per_block: 4,
            level_count: 3,
            tile_mode: TileMode::PitchLinear,
            round_pitch: true,
        };
        let plans = plan_levels(&geometry).unwrap();
        let input = random_blocks(deswizzled_chain_size(&plans));

        let swizzled = swizzle_surface(&geometry, &input).unwrap();
        let deswizzled = deswizzle_surface(&geometry, &swizzled).unwrap();
        assert_eq!(input, deswizzled);
    }

    #[test]
    fn swizzle_surface_not_enough_data() {
        let geometry = bc4_geometry(128, 128, 1);
        assert_eq!(
            Err(SwizzleError::NotEnoughData {
                expected_size: 8192,
                actual_size: 100
            }),
            swizzle_surface(&geometry, &[0u8; 100])
        );
    }

    #[test]
    fn deswizzle_surface_not_enough_data() {
        let geometry = bc4_geometry(128, 128, 1);
        assert_eq!(
            Err(SwizzleError::NotEnoughData {
                expected_size: 8192,
                actual_size: 0
            }),
            deswizzle_surface(&geometry, &[])
        );
    }

    #[test]
    fn deswizzle_surface_single_pixel() {
        // A 1x1 surface still occupies one full GOB block.
        let geometry = SurfaceGeometry {
            width: 1,
            height: 1,
            block_dim: BlockDim::uncompressed(),
            bytes_per_block: 4,
            level_count: 1,
            tile_mode: TileMode::BlockLinear,
            round_pitch: true,
        };
        let deswizzled = deswizzle_surface(&geometry, &[7u8; 512]).unwrap();
        assert_eq!(vec![7u8; 4], deswizzled);
    }
}
