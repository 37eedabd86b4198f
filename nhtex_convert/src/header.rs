//! Binary layouts for the texture container headers.
//!
//! All fields are little endian with byte offsets from the start of the
//! container. The linear and tiled container variants store the same geometry
//! fields at different offsets, described by [LINEAR_LAYOUT] and
//! [TILED_LAYOUT].
use std::io::{Read, Seek, SeekFrom};

use binread::BinReaderExt;

use crate::ConvertError;

/// Byte offsets of the geometry fields inside a texture container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub width: u64,
    pub height: u64,
    pub mip_count: u64,
    /// Offset of the signed relative offset to the pixel data.
    pub data_offset: u64,
    /// The stored data offset is relative to its own field position.
    pub data_offset_base: u64,
    /// Offset of the pixel data length.
    /// The linear container stores no explicit payload length,
    /// so its payload runs to the end of the container.
    pub data_size: Option<u64>,
}

/// The linear (row-major) container produced by the desktop texture pipeline.
pub const LINEAR_LAYOUT: HeaderLayout = HeaderLayout {
    width: 0x40,
    height: 0x44,
    mip_count: 0x70,
    data_offset: 0x80,
    data_offset_base: 0x80,
    data_size: None,
};

/// The tiled container consumed by the console GPU.
pub const TILED_LAYOUT: HeaderLayout = HeaderLayout {
    width: 0x50,
    height: 0x54,
    mip_count: 0x64,
    data_offset: 0x40,
    data_offset_base: 0x40,
    data_size: Some(0x48),
};

/// Geometry fields read from a container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub mip_count: u32,
    /// Absolute offset of the pixel data.
    pub data_offset: u64,
    /// Length of the pixel data when the header stores one.
    pub data_size: Option<u64>,
}

impl HeaderLayout {
    /// Reads the geometry fields of a container header.
    pub fn read_info<R: Read + Seek>(&self, reader: &mut R) -> Result<TextureInfo, ConvertError> {
        reader
            .seek(SeekFrom::Start(self.width))
            .map_err(binread::Error::Io)?;
        let width: u32 = reader.read_le()?;

        reader
            .seek(SeekFrom::Start(self.height))
            .map_err(binread::Error::Io)?;
        let height: u32 = reader.read_le()?;

        reader
            .seek(SeekFrom::Start(self.mip_count))
            .map_err(binread::Error::Io)?;
        let mip_count: u32 = reader.read_le()?;

        reader
            .seek(SeekFrom::Start(self.data_offset))
            .map_err(binread::Error::Io)?;
        let relative_offset: i64 = reader.read_le()?;
        let data_offset = relative_offset.wrapping_add(self.data_offset_base as i64) as u64;

        let data_size = match self.data_size {
            Some(offset) => {
                reader
                    .seek(SeekFrom::Start(offset))
                    .map_err(binread::Error::Io)?;
                let size: i64 = reader.read_le()?;
                Some(size as u64)
            }
            None => None,
        };

        Ok(TextureInfo {
            width,
            height,
            mip_count,
            data_offset,
            data_size,
        })
    }
}

impl TextureInfo {
    /// The pixel payload slice within `container`.
    pub fn payload<'a>(&self, container: &'a [u8]) -> Result<&'a [u8], ConvertError> {
        let start = self.data_offset as usize;
        let end = match self.data_size {
            Some(size) => start.saturating_add(size as usize),
            None => container.len().max(start),
        };

        if end > container.len() {
            return Err(ConvertError::TruncatedContainer {
                expected: end,
                actual: container.len(),
            });
        }
        Ok(&container[start..end])
    }
}

/// Identifies which container layout `input` uses.
///
/// The two variants are distinguished by the first value of the second
/// section table, 0x50 for the linear container and 0x20 for the tiled one.
pub fn detect_layout(input: &[u8]) -> Option<&'static HeaderLayout> {
    match input.get(0x30) {
        Some(&0x50) => Some(&LINEAR_LAYOUT),
        Some(&0x20) => Some(&TILED_LAYOUT),
        _ => None,
    }
}

const TILED_HEADER_LEN: usize = 0x68;

/// Serializes a tiled container around the packed tiled payload.
pub fn write_tiled_container(
    width: u32,
    height: u32,
    mip_count: u32,
    payload: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(TILED_HEADER_LEN + payload.len());

    // Section table with placeholder sizes, patched below.
    for value in [0x20i64, 0x10, 0x20, 0, 0, 0] {
        out.extend_from_slice(&value.to_le_bytes());
    }
    for value in [0x20i64, 0x18, 0x28, 0] {
        out.extend_from_slice(&value.to_le_bytes());
    }

    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    // Compression tag for the BC4 font textures.
    out.extend_from_slice(&0x49u32.to_le_bytes());
    out.extend_from_slice(&mip_count.to_le_bytes());

    out.extend_from_slice(payload);

    let total = out.len();
    out[0x18..0x20].copy_from_slice(&((total - 0x30) as i64).to_le_bytes());
    out[0x48..0x50].copy_from_slice(&((total - TILED_HEADER_LEN) as i64).to_le_bytes());
    out
}

// BC4 DDS header template.
// Only the dimensions, linear size, and mip count vary between the font
// textures, so everything else stays fixed.
const DDS_HEADER: [u8; 0x80] = [
    0x44, 0x44, 0x53, 0x20, 0x7C, 0x00, 0x00, 0x00, 0x07, 0x10, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00,
    0x04, 0x00, 0x00, 0x00, 0x42, 0x43, 0x34, 0x55, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Serializes a DDS file around the packed row-major payload.
pub fn write_dds(width: u32, height: u32, mip_count: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(DDS_HEADER.len() + payload.len());
    out.extend_from_slice(&DDS_HEADER);

    out[0x0C..0x10].copy_from_slice(&height.to_le_bytes());
    out[0x10..0x14].copy_from_slice(&width.to_le_bytes());
    out[0x14..0x18].copy_from_slice(&(height / 4 * width / 4 * 8).to_le_bytes());
    out[0x1C..0x20].copy_from_slice(&mip_count.to_le_bytes());

    out.extend_from_slice(payload);
    out
}
