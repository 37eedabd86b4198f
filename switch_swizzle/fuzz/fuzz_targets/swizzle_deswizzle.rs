#![no_main]
use libfuzzer_sys::fuzz_target;

extern crate arbitrary;
use arbitrary::{Arbitrary, Result, Unstructured};

extern crate rand;
use rand::{rngs::StdRng, Rng, SeedableRng};

use std::num::NonZeroUsize;
use switch_swizzle::surface::{
    deswizzle_surface, deswizzled_chain_size, plan_levels, swizzle_surface, BlockDim,
    SurfaceGeometry, TileMode,
};

#[derive(Debug)]
struct Input {
    width: usize,
    height: usize,
    block_width: NonZeroUsize,
    block_height: NonZeroUsize,
    bytes_per_block: usize,
    level_count: usize,
    tile_mode: TileMode,
    round_pitch: bool,
}

impl<'a> Arbitrary<'a> for Input {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        Ok(Input {
            width: u.int_in_range(0..=256)?,
            height: u.int_in_range(0..=256)?,
            block_width: NonZeroUsize::new(u.int_in_range(1..=16)?).unwrap(),
            block_height: NonZeroUsize::new(u.int_in_range(1..=16)?).unwrap(),
            bytes_per_block: *u.choose(&[1, 2, 4, 8, 16])?,
            level_count: u.int_in_range(0..=16)?,
            tile_mode: u.arbitrary()?,
            round_pitch: u.arbitrary()?,
        })
    }
}

fuzz_target!(|input: Input| {
    let geometry = SurfaceGeometry {
        width: input.width,
        height: input.height,
        block_dim: BlockDim {
            width: input.block_width,
            height: input.block_height,
        },
        bytes_per_block: input.bytes_per_block,
        level_count: input.level_count,
        tile_mode: input.tile_mode,
        round_pitch: input.round_pitch,
    };

    // Invalid geometry should error rather than panic.
    let plans = match plan_levels(&geometry) {
        Ok(plans) => plans,
        Err(_) => return,
    };

    let seed = [13u8; 32];
    let mut rng: StdRng = SeedableRng::from_seed(seed);
    let deswizzled: Vec<_> = (0..deswizzled_chain_size(&plans))
        .map(|_| rng.gen_range::<u8, _>(0..=255))
        .collect();

    let swizzled = swizzle_surface(&geometry, &deswizzled).unwrap();
    let new_deswizzled = deswizzle_surface(&geometry, &swizzled).unwrap();

    if deswizzled != new_deswizzled {
        panic!("Swizzle deswizzle is not 1:1");
    }
});
