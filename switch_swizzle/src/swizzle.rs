//! Functions for swizzling and deswizzling a single mip level.
//!
//! The swizzling functions work in whole compressed blocks.
//! Each block moves as one unit of `bytes_per_block` bytes,
//! so the pixel data inside a block is never reordered.
//! Blocks need a power of two size of at most one 16 byte sector
//! to map to disjoint tiled regions.
use crate::{
    deswizzled_surface_size, div_round_up, round_up, swizzled_surface_size, BlockHeight,
    SwizzleError, GOB_HEIGHT_IN_ROWS, GOB_SIZE_IN_BYTES, GOB_WIDTH_IN_BYTES,
};

/// How block coordinates map to byte offsets in the tiled data.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Addressing {
    BlockLinear { block_height: BlockHeight },
    PitchLinear { pitch: usize },
}

// Address arithmetic from the Tegra TRM, pages 1187-1188.
// The outer term selects the GOB and the remaining terms the bytes within it.

/// Returns the byte offset of the block at `(x, y)` inside a tiled surface
/// with the given stacking factor.
///
/// The function is pure and total.
/// Coordinates inside the padded region of a surface produce offsets at or past
/// the end of the allocated data, so callers bounds check before indexing.
pub fn block_linear_offset(
    x: usize,
    y: usize,
    width_in_blocks: usize,
    bytes_per_block: usize,
    block_height: BlockHeight,
) -> usize {
    let block_height = block_height as usize;
    let image_width_in_gobs =
        div_round_up(width_in_blocks * bytes_per_block, GOB_WIDTH_IN_BYTES);
    let gob_rows = GOB_HEIGHT_IN_ROWS * block_height;

    let gob_address = (y / gob_rows) * GOB_SIZE_IN_BYTES * block_height * image_width_in_gobs
        + (x * bytes_per_block / GOB_WIDTH_IN_BYTES) * GOB_SIZE_IN_BYTES * block_height
        + (y % gob_rows / GOB_HEIGHT_IN_ROWS) * GOB_SIZE_IN_BYTES;

    let x = x * bytes_per_block;
    gob_address
        + (x % 64 / 32) * 256
        + (y % 8 / 2) * 64
        + (x % 32 / 16) * 32
        + (y % 2) * 16
        + (x % 16)
}

/// Returns the byte offset of the block at `(x, y)` inside a pitch linear surface.
pub const fn pitch_linear_offset(x: usize, y: usize, pitch: usize, bytes_per_block: usize) -> usize {
    y * pitch + x * bytes_per_block
}

/// Row stride in bytes for a pitch linear surface.
/// `round_pitch` rounds the stride up to a multiple of 32 bytes.
pub const fn pitch_linear_pitch(
    width_in_blocks: usize,
    bytes_per_block: usize,
    round_pitch: bool,
) -> usize {
    if round_pitch {
        round_up(width_in_blocks * bytes_per_block, 32)
    } else {
        width_in_blocks * bytes_per_block
    }
}

/// Swizzles the blocks from row-major `source` into a new block linear surface.
///
/// `source` needs at least [deswizzled_surface_size] many bytes.
/// The output has [swizzled_surface_size] many bytes with padding left zero filled.
pub fn swizzle_block_linear(
    width_in_blocks: usize,
    height_in_blocks: usize,
    source: &[u8],
    block_height: BlockHeight,
    bytes_per_block: usize,
) -> Result<Vec<u8>, SwizzleError> {
    let mut destination = vec![
        0u8;
        swizzled_surface_size(
            width_in_blocks,
            height_in_blocks,
            block_height,
            bytes_per_block
        )
    ];

    let expected_size = deswizzled_surface_size(width_in_blocks, height_in_blocks, bytes_per_block);
    if source.len() < expected_size {
        return Err(SwizzleError::NotEnoughData {
            expected_size,
            actual_size: source.len(),
        });
    }

    swizzle_inner(
        width_in_blocks,
        height_in_blocks,
        source,
        &mut destination,
        bytes_per_block,
        Addressing::BlockLinear { block_height },
        false,
    );
    Ok(destination)
}

/// Deswizzles the blocks from a block linear `source` into a new row-major surface.
///
/// `source` needs at least [swizzled_surface_size] many bytes.
/// The output has [deswizzled_surface_size] many bytes.
pub fn deswizzle_block_linear(
    width_in_blocks: usize,
    height_in_blocks: usize,
    source: &[u8],
    block_height: BlockHeight,
    bytes_per_block: usize,
) -> Result<Vec<u8>, SwizzleError> {
    let mut destination = vec![
        0u8;
        deswizzled_surface_size(width_in_blocks, height_in_blocks, bytes_per_block)
    ];

    let expected_size = swizzled_surface_size(
        width_in_blocks,
        height_in_blocks,
        block_height,
        bytes_per_block,
    );
    if source.len() < expected_size {
        return Err(SwizzleError::NotEnoughData {
            expected_size,
            actual_size: source.len(),
        });
    }

    swizzle_inner(
        width_in_blocks,
        height_in_blocks,
        source,
        &mut destination,
        bytes_per_block,
        Addressing::BlockLinear { block_height },
        true,
    );
    Ok(destination)
}

/// Swizzles the blocks from row-major `source` into a new pitch linear surface.
pub fn swizzle_pitch_linear(
    width_in_blocks: usize,
    height_in_blocks: usize,
    source: &[u8],
    bytes_per_block: usize,
    round_pitch: bool,
) -> Result<Vec<u8>, SwizzleError> {
    let pitch = pitch_linear_pitch(width_in_blocks, bytes_per_block, round_pitch);
    let mut destination = vec![0u8; pitch * height_in_blocks];

    let expected_size = deswizzled_surface_size(width_in_blocks, height_in_blocks, bytes_per_block);
    if source.len() < expected_size {
        return Err(SwizzleError::NotEnoughData {
            expected_size,
            actual_size: source.len(),
        });
    }

    swizzle_inner(
        width_in_blocks,
        height_in_blocks,
        source,
        &mut destination,
        bytes_per_block,
        Addressing::PitchLinear { pitch },
        false,
    );
    Ok(destination)
}

/// Deswizzles the blocks from a pitch linear `source` into a new row-major surface.
pub fn deswizzle_pitch_linear(
    width_in_blocks: usize,
    height_in_blocks: usize,
    source: &[u8],
    bytes_per_block: usize,
    round_pitch: bool,
) -> Result<Vec<u8>, SwizzleError> {
    let pitch = pitch_linear_pitch(width_in_blocks, bytes_per_block, round_pitch);
    let mut destination = vec![
        0u8;
        deswizzled_surface_size(width_in_blocks, height_in_blocks, bytes_per_block)
    ];

    let expected_size = pitch * height_in_blocks;
    if source.len() < expected_size {
        return Err(SwizzleError::NotEnoughData {
            expected_size,
            actual_size: source.len(),
        });
    }

    swizzle_inner(
        width_in_blocks,
        height_in_blocks,
        source,
        &mut destination,
        bytes_per_block,
        Addressing::PitchLinear { pitch },
        true,
    );
    Ok(destination)
}

pub(crate) fn swizzle_inner(
    width_in_blocks: usize,
    height_in_blocks: usize,
    source: &[u8],
    destination: &mut [u8],
    bytes_per_block: usize,
    addressing: Addressing,
    deswizzle: bool,
) {
    // The tiled data is the source when deswizzling and the destination otherwise.
    let tiled_size = if deswizzle {
        source.len()
    } else {
        destination.len()
    };

    for y in 0..height_in_blocks {
        for x in 0..width_in_blocks {
            let tiled_offset = match addressing {
                Addressing::BlockLinear { block_height } => {
                    block_linear_offset(x, y, width_in_blocks, bytes_per_block, block_height)
                }
                Addressing::PitchLinear { pitch } => {
                    pitch_linear_offset(x, y, pitch, bytes_per_block)
                }
            };

            // Blocks that land in the tiling padding have no linear counterpart.
            // Deswizzled positions for such blocks keep their zero fill.
            if tiled_offset + bytes_per_block > tiled_size {
                continue;
            }

            let linear_offset = (y * width_in_blocks + x) * bytes_per_block;
            if deswizzle {
                destination[linear_offset..linear_offset + bytes_per_block]
                    .copy_from_slice(&source[tiled_offset..tiled_offset + bytes_per_block]);
            } else {
                destination[tiled_offset..tiled_offset + bytes_per_block]
                    .copy_from_slice(&source[linear_offset..linear_offset + bytes_per_block]);
            }
        }
    }
}
