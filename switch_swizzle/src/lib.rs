//! # switch_swizzle
//! switch_swizzle is a CPU implementation of the block linear memory tiling
//! used for texture surfaces by the Switch's GPU.
//!
//! Block linear arranges the bytes of a surface into a 2D grid of tiling blocks
//! where blocks are laid out linearly in row-major order.
//! Groups of 512 bytes form GOBs ("group of bytes") where each GOB is 64x8 bytes.
//! The block height parameter determines how many GOBs stack vertically to form a block.
//! Tiled surfaces are padded to integral block dimensions,
//! so a tiled surface may be larger than the same data in row-major order.
//!
//! The surface functions work on compressed block coordinates rather than pixels.
//! A BC4 compressed surface with 4x4 pixel blocks of 8 bytes each
//! uses its dimensions divided by 4 and a block size of 8 bytes.
//!
//! # Getting Started
//! The following example deswizzles the mip chain of a BC4 compressed 2D surface
//! packed into a single tiled buffer.
/*!
```rust
use switch_swizzle::surface::{deswizzle_surface, BlockDim, SurfaceGeometry, TileMode};

# fn main() -> Result<(), switch_swizzle::SwizzleError> {
let tiled = vec![0u8; 10752];
let geometry = SurfaceGeometry {
    width: 128,
    height: 128,
    block_dim: BlockDim::block_4x4(),
    bytes_per_block: 8,
    level_count: 3,
    tile_mode: TileMode::BlockLinear,
    round_pitch: true,
};
let linear = deswizzle_surface(&geometry, &tiled)?;
assert_eq!(10752, linear.len());
# Ok(())
# }
```
*/
mod blockheight;
pub mod surface;
pub mod swizzle;

pub use blockheight::{block_height, mip_block_heights};

pub(crate) const GOB_WIDTH_IN_BYTES: usize = 64;
pub(crate) const GOB_HEIGHT_IN_ROWS: usize = 8;
pub(crate) const GOB_SIZE_IN_BYTES: usize = GOB_WIDTH_IN_BYTES * GOB_HEIGHT_IN_ROWS;

/// Alignment in bytes between mip levels packed into a single tiled buffer.
pub(crate) const LEVEL_ALIGNMENT: usize = 512;

/// An enumeration of supported block heights.
///
/// The block height counts how many 8-row GOBs stack vertically to form one tiling block.
/// File formats differ in how they encode this parameter.
/// Some store it using log2, so a block height of 8 would be encoded as 3.
/// For formats that do not store it at all, see [block_height].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum BlockHeight {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
    Sixteen = 16,
}

impl BlockHeight {
    /// Attempts to construct a block height from `value`.
    /// Returns [None] if `value` is not a supported block height.
    /// # Examples
    /**
    ```rust
    use switch_swizzle::BlockHeight;

    assert_eq!(Some(BlockHeight::Eight), BlockHeight::new(8));
    assert_eq!(None, BlockHeight::new(5));
    ```
    */
    pub fn new(value: usize) -> Option<Self> {
        match value {
            1 => Some(BlockHeight::One),
            2 => Some(BlockHeight::Two),
            4 => Some(BlockHeight::Four),
            8 => Some(BlockHeight::Eight),
            16 => Some(BlockHeight::Sixteen),
            _ => None,
        }
    }

    /// The base 2 logarithm of the block height.
    pub const fn log2(self) -> u32 {
        (self as usize).trailing_zeros()
    }
}

/// Errors that can occur while planning or transforming a surface.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SwizzleError {
    /// The surface dimensions do not describe a valid surface.
    #[error("surface dimensions {width}x{height} pixels do not describe a valid surface")]
    InvalidDimensions { width: usize, height: usize },

    /// The mip level count is zero or exceeds what the base dimensions support.
    #[error("a mip chain of {level_count} levels is not supported for this surface (expected 1..={max_levels})")]
    UnsupportedLevelCount { level_count: usize, max_levels: usize },

    /// The source data does not contain enough bytes.
    #[error("not enough data, expected {expected_size} bytes but found {actual_size} bytes")]
    NotEnoughData {
        expected_size: usize,
        actual_size: usize,
    },
}

/// Calculates the size in bytes of a single tiled mip level,
/// including the padding needed to round the surface up to whole tiling blocks.
/// The result is always at least as large as [deswizzled_surface_size]
/// for the same dimensions.
/// # Examples
/**
```rust
use switch_swizzle::{swizzled_surface_size, BlockHeight};

// A 128x128 pixel BC4 surface has 32x32 blocks of 8 bytes each.
assert_eq!(8192, swizzled_surface_size(32, 32, BlockHeight::Four, 8));
```
*/
pub const fn swizzled_surface_size(
    width_in_blocks: usize,
    height_in_blocks: usize,
    block_height: BlockHeight,
    bytes_per_block: usize,
) -> usize {
    let pitch = round_up(width_in_blocks * bytes_per_block, GOB_WIDTH_IN_BYTES);
    pitch * round_up(
        height_in_blocks,
        block_height as usize * GOB_HEIGHT_IN_ROWS,
    )
}

/// Calculates the size in bytes of a single row-major mip level.
/// Compare with [swizzled_surface_size].
/// # Examples
/**
```rust
use switch_swizzle::deswizzled_surface_size;

assert_eq!(8192, deswizzled_surface_size(32, 32, 8));
```
*/
pub const fn deswizzled_surface_size(
    width_in_blocks: usize,
    height_in_blocks: usize,
    bytes_per_block: usize,
) -> usize {
    width_in_blocks * height_in_blocks * bytes_per_block
}

/// Calculates the division of `x` by `d` but rounds up rather than truncating.
/// # Examples
/// Use this function when calculating dimensions in blocks for compressed formats.
/**
```rust
use switch_swizzle::div_round_up;

assert_eq!(2, div_round_up(8, 4));
assert_eq!(3, div_round_up(10, 4));
```
*/
#[inline]
pub const fn div_round_up(x: usize, d: usize) -> usize {
    (x + d - 1) / d
}

pub(crate) const fn round_up(x: usize, n: usize) -> usize {
    ((x + n - 1) / n) * n
}
