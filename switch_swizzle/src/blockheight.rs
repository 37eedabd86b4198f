use crate::{BlockHeight, GOB_HEIGHT_IN_ROWS};

// Block height selection ported from the swizzling code shared between the
// Switch texture tools. The GPU accepts any power of two stacking factor,
// but these assets always derive it from the surface height.

/// Calculates the block height parameter for the base mip level
/// when the texture format does not store one.
///
/// The surface height is given in compressed blocks rather than pixels.
/// For a format with 4x4 pixel blocks, divide the height in pixels by 4 first.
/// # Examples
/**
```rust
use switch_swizzle::{block_height, div_round_up, BlockHeight};

let height_in_pixels = 256;
assert_eq!(BlockHeight::Eight, block_height(div_round_up(height_in_pixels, 4)));
```
*/
pub fn block_height(height_in_blocks: usize) -> BlockHeight {
    // One GOB per block until the surface spans eight block rows per GOB row.
    // next_power_of_two maps the degenerate 0 to 1, which covers 1-row mips.
    let stacked_gobs = (height_in_blocks / GOB_HEIGHT_IN_ROWS).next_power_of_two();

    match stacked_gobs {
        1 => BlockHeight::One,
        2 => BlockHeight::Two,
        4 => BlockHeight::Four,
        8 => BlockHeight::Eight,
        _ => BlockHeight::Sixteen,
    }
}

/// Calculates the effective block height for every level of a mip chain.
///
/// `level_heights_in_blocks` holds each level's height in compressed blocks,
/// starting from the base level that `base` was selected for.
/// The stacking factor halves once a level's height rounded to a power of two
/// drops below the base level's GOB rows,
/// and each reduction carries into every smaller level.
pub fn mip_block_heights(
    base: BlockHeight,
    level_heights_in_blocks: &[usize],
) -> Vec<BlockHeight> {
    // The shrink threshold stays fixed at the base level's rows per block.
    let base_gob_rows = base as usize * GOB_HEIGHT_IN_ROWS;
    let base_log2 = base.log2();

    level_heights_in_blocks
        .iter()
        .scan(0u32, |shift, &height_in_blocks| {
            if height_in_blocks.next_power_of_two() < base_gob_rows {
                *shift += 1;
            }
            let log2 = base_log2.saturating_sub(*shift);
            Some(BlockHeight::new(1 << log2).unwrap())
        })
        .collect()
}
