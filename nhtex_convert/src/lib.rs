//! Conversions between the console's tiled texture containers and linear
//! formats usable by generic texture tools.
//!
//! The container headers only differ in where they store the geometry fields,
//! so both variants share one reader parameterized by a [HeaderLayout].
//! The pixel payload is moved between layouts by the [switch_swizzle] engine.
//! Compression is out of scope here.
//! The payload always stays opaque compressed blocks,
//! produced and consumed by an external codec.
mod convert;
mod header;

pub use convert::{dds_to_tiled, linear_to_tiled, tiled_to_dds, to_tiled};
pub use header::{
    detect_layout, write_dds, write_tiled_container, HeaderLayout, TextureInfo, LINEAR_LAYOUT,
    TILED_LAYOUT,
};

/// Errors that can occur while converting a texture container.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("failed to read the container header")]
    Header(#[from] binread::Error),

    #[error("failed to parse the DDS file")]
    Dds(#[from] ddsfile::Error),

    #[error(transparent)]
    Swizzle(#[from] switch_swizzle::SwizzleError),

    /// The header describes a payload that extends past the end of the container.
    #[error("container needs {expected} bytes but has {actual}")]
    TruncatedContainer { expected: usize, actual: usize },

    #[error("the input is not a recognized texture container")]
    UnrecognizedContainer,
}
