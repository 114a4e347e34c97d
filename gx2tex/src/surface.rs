//! Moving whole surfaces between tiled and linear element order.

use alloc::{vec, vec::Vec};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::address::{AddressEngine, SurfaceGeometry};
use crate::format::{bits_per_element, is_block_compressed};
use crate::layout::{height_alignment, SurfaceLayout};
use crate::tile_mode::TileMode;
use crate::{Error, HardwareProfile, Result};

/// Describes a surface as stored by the GPU.
///
/// Usually filled in from a texture header. Width and height are in pixels; for block
/// compressed formats the pitch counts 4x4 blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    pub width: u32,
    pub height: u32,
    /// Number of slices
    pub depth: u32,
    /// GX2 surface format
    pub format: u32,
    pub tile_mode: TileMode,
    /// Swizzle register value; pipe and bank swizzle live in bits 8 and up
    pub swizzle: u32,
    /// Row stride in elements
    pub pitch: u32,
    pub num_samples: u32,
    pub is_depth: bool,
}

/// Which way [`retile`] moves the data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Source is tiled, destination is linear
    ToLinear,
    /// Source is linear, destination is tiled
    ToTiled,
}

impl SurfaceDescriptor {
    /// Builds the descriptor of a single slice, single sample surface with the pitch and
    /// tile mode the hardware would choose for it.
    ///
    /// * `format`    - GX2 surface format
    /// * `width`     - Width in pixels
    /// * `height`    - Height in pixels
    /// * `tile_mode` - Requested tile mode
    /// * `swizzle`   - Swizzle register value
    /// * `profile`   - Memory layout of the target GPU
    pub fn new(
        format: u32,
        width: u32,
        height: u32,
        tile_mode: TileMode,
        swizzle: u32,
        profile: &HardwareProfile,
    ) -> Result<Self> {
        let layout = SurfaceLayout::compute(format, width, height, 1, tile_mode, 1, false, profile)?;

        Ok(SurfaceDescriptor {
            width,
            height,
            depth: 1,
            format,
            tile_mode: layout.tile_mode,
            swizzle,
            pitch: layout.pitch,
            num_samples: 1,
            is_depth: false,
        })
    }

    /// Returns the number of elements per row and the number of rows.
    pub fn element_grid(&self) -> (u32, u32) {
        if is_block_compressed(self.format) {
            ((self.width + 3) / 4, (self.height + 3) / 4)
        } else {
            (self.width, self.height)
        }
    }

    pub fn bits_per_element(&self) -> Result<u32> {
        bits_per_element(self.format)
    }

    /// Size of one element in bytes.
    pub fn element_bytes(&self) -> Result<usize> {
        Ok(self.bits_per_element()? as usize / 8)
    }

    /// Number of rows the tiled surface is padded to.
    pub fn padded_height(&self, profile: &HardwareProfile) -> u32 {
        let (_, rows) = self.element_grid();
        rows.next_multiple_of(height_alignment(self.tile_mode, profile))
    }

    /// Number of slices the tiled surface is padded to.
    pub fn padded_slices(&self) -> u32 {
        self.depth.next_multiple_of(self.tile_mode.thickness())
    }

    /// Size in bytes of the surface in linear order, without any padding.
    pub fn linear_size(&self) -> Result<usize> {
        let (cols, rows) = self.element_grid();
        Ok(cols as usize
            * rows as usize
            * self.depth as usize
            * self.num_samples as usize
            * self.element_bytes()?)
    }

    /// Size in bytes of the padded tiled surface.
    pub fn tiled_size(&self, profile: &HardwareProfile) -> Result<usize> {
        Ok(self.pitch as usize
            * self.padded_height(profile) as usize
            * self.padded_slices() as usize
            * self.num_samples as usize
            * self.element_bytes()?)
    }

    /// Builds the address engine for this surface.
    pub fn address_engine(&self, profile: &HardwareProfile) -> Result<AddressEngine> {
        let geometry = SurfaceGeometry {
            bpp: self.bits_per_element()?,
            pitch: self.pitch,
            height: self.padded_height(profile),
            num_slices: self.padded_slices(),
            num_samples: self.num_samples,
            is_depth: self.is_depth,
        };
        AddressEngine::new(geometry, self.tile_mode, self.swizzle, profile)
    }

    fn validate(&self) -> Result<()> {
        let (cols, _) = self.element_grid();
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(Error::InvalidSurface("surface dimensions must be non-zero"));
        }
        if self.pitch < cols {
            return Err(Error::InvalidSurface("pitch is narrower than the surface"));
        }
        Ok(())
    }
}

/// Converts a surface between tiled and linear element order.
///
/// Linear data is tightly packed rows of elements, slice after slice and sample after
/// sample. Tiled output is sized by [`SurfaceDescriptor::tiled_size`], with padding left
/// zeroed.
///
/// * `descriptor` - The surface being converted
/// * `profile`    - Memory layout of the target GPU
/// * `source`     - Tiled or linear input, depending on `direction`
/// * `direction`  - Which way to convert
pub fn retile(
    descriptor: &SurfaceDescriptor,
    profile: &HardwareProfile,
    source: &[u8],
    direction: Direction,
) -> Result<Vec<u8>> {
    descriptor.validate()?;
    let engine = descriptor.address_engine(profile)?;

    log::debug!(
        "retiling {}x{}x{} surface {:#x} ({:?}, pitch {}) {:?}",
        descriptor.width,
        descriptor.height,
        descriptor.depth,
        descriptor.format,
        descriptor.tile_mode,
        descriptor.pitch,
        direction
    );

    match direction {
        Direction::ToLinear => untile(descriptor, &engine, source),
        Direction::ToTiled => tile(descriptor, profile, &engine, source),
    }
}

/// Splits a linear row index into (row, slice, sample).
fn row_coordinates(row_index: usize, rows: usize, depth: usize) -> (u32, u32, u32) {
    let y = row_index % rows;
    let slice = (row_index / rows) % depth;
    let sample = row_index / (rows * depth);
    (y as u32, slice as u32, sample as u32)
}

fn untile(descriptor: &SurfaceDescriptor, engine: &AddressEngine, tiled: &[u8]) -> Result<Vec<u8>> {
    let (cols, rows) = descriptor.element_grid();
    let element_bytes = descriptor.element_bytes()?;
    let row_bytes = cols as usize * element_bytes;
    let depth = descriptor.depth as usize;

    let mut linear = vec![0u8; descriptor.linear_size()?];

    #[cfg(feature = "rayon")]
    let output_rows = linear.par_chunks_mut(row_bytes);
    #[cfg(not(feature = "rayon"))]
    let output_rows = linear.chunks_mut(row_bytes);

    output_rows
        .enumerate()
        .try_for_each(|(row_index, output_row)| -> Result<()> {
            let (y, slice, sample) = row_coordinates(row_index, rows as usize, depth);

            for (x, element) in output_row.chunks_exact_mut(element_bytes).enumerate() {
                let offset = engine.address(x as u32, y, slice, sample).byte;
                let start = offset as usize;
                let source = tiled
                    .get(start..start + element_bytes)
                    .ok_or(Error::AddressOutOfRange {
                        offset,
                        len: tiled.len(),
                    })?;
                element.copy_from_slice(source);
            }
            Ok(())
        })?;

    Ok(linear)
}

fn tile(
    descriptor: &SurfaceDescriptor,
    profile: &HardwareProfile,
    engine: &AddressEngine,
    linear: &[u8],
) -> Result<Vec<u8>> {
    let needed = descriptor.linear_size()?;
    if linear.len() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            actual: linear.len(),
        });
    }

    let (cols, rows) = descriptor.element_grid();
    let element_bytes = descriptor.element_bytes()?;
    let row_bytes = cols as usize * element_bytes;
    let depth = descriptor.depth as usize;

    let mut tiled = vec![0u8; descriptor.tiled_size(profile)?];
    let tiled_len = tiled.len();

    for (row_index, input_row) in linear[..needed].chunks_exact(row_bytes).enumerate() {
        let (y, slice, sample) = row_coordinates(row_index, rows as usize, depth);

        for (x, element) in input_row.chunks_exact(element_bytes).enumerate() {
            let offset = engine.address(x as u32, y, slice, sample).byte;
            let start = offset as usize;
            let destination = tiled
                .get_mut(start..start + element_bytes)
                .ok_or(Error::AddressOutOfRange {
                    offset,
                    len: tiled_len,
                })?;
            destination.copy_from_slice(element);
        }
    }

    Ok(tiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FORMAT_BC3;
    use rstest::rstest;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + i / 251) as u8).collect()
    }

    #[test]
    fn test_descriptor_from_layout() {
        let gx2 = HardwareProfile::GX2;
        let descriptor =
            SurfaceDescriptor::new(FORMAT_BC3, 100, 60, TileMode::Tiled2DThin1, 0, &gx2).unwrap();
        assert_eq!(descriptor.element_grid(), (25, 15));
        assert_eq!(descriptor.pitch, 32);
        assert_eq!(descriptor.padded_height(&gx2), 16);
        assert_eq!(descriptor.element_bytes(), Ok(16));
        assert_eq!(descriptor.linear_size(), Ok(25 * 15 * 16));
        assert_eq!(descriptor.tiled_size(&gx2), Ok(32 * 16 * 16));

        let thick =
            SurfaceDescriptor::new(FORMAT_BC3, 64, 64, TileMode::Tiled2DThick, 0, &gx2).unwrap();
        assert_eq!(thick.tile_mode, TileMode::Tiled2DThin1);
    }

    #[test]
    fn test_blocks_land_at_tiled_offsets() {
        let gx2 = HardwareProfile::GX2;
        let descriptor =
            SurfaceDescriptor::new(FORMAT_BC3, 64, 64, TileMode::Tiled2DThin1, 0, &gx2).unwrap();

        // every block filled with its own index
        let linear: Vec<u8> = (0..16 * 16).flat_map(|block| [block as u8; 16]).collect();
        let tiled = retile(&descriptor, &gx2, &linear, Direction::ToTiled).unwrap();

        assert_eq!(&tiled[0..16], &[0u8; 16]);
        assert_eq!(&tiled[32..48], &[1u8; 16]);
        assert_eq!(&tiled[16..32], &[16u8; 16]);
    }

    #[rstest]
    #[case(FORMAT_BC3, 128, 128, TileMode::LinearGeneral)]
    #[case(FORMAT_BC3, 128, 128, TileMode::LinearAligned)]
    #[case(FORMAT_BC3, 128, 128, TileMode::Tiled1DThin1)]
    #[case(FORMAT_BC3, 128, 128, TileMode::Tiled2DThin1)]
    #[case(FORMAT_BC3, 128, 128, TileMode::Tiled2DThin2)]
    #[case(FORMAT_BC3, 128, 128, TileMode::Tiled2DThin4)]
    #[case(FORMAT_BC3, 128, 128, TileMode::Tiled2BThin1)]
    #[case(FORMAT_BC3, 128, 128, TileMode::Tiled2BThin2)]
    #[case(FORMAT_BC3, 128, 128, TileMode::Tiled2BThin4)]
    #[case(FORMAT_BC3, 128, 128, TileMode::Tiled3DThin1)]
    #[case(FORMAT_BC3, 128, 128, TileMode::Tiled3BThin1)]
    #[case(FORMAT_BC3, 128, 128, TileMode::LinearSpecial)]
    #[case(FORMAT_BC3, 512, 64, TileMode::Tiled2BThin1)]
    #[case(FORMAT_BC3, 100, 60, TileMode::Tiled2DThin1)]
    #[case(0x1a, 64, 64, TileMode::Tiled1DThick)]
    #[case(0x1a, 64, 64, TileMode::Tiled2DThick)]
    #[case(0x1a, 64, 64, TileMode::Tiled2BThick)]
    #[case(0x1a, 64, 64, TileMode::Tiled3DThick)]
    #[case(0x1a, 64, 64, TileMode::Tiled3BThick)]
    fn test_round_trip(
        #[case] format: u32,
        #[case] width: u32,
        #[case] height: u32,
        #[case] tile_mode: TileMode,
        #[values(0, 0x700)] swizzle: u32,
    ) {
        let gx2 = HardwareProfile::GX2;
        let descriptor =
            SurfaceDescriptor::new(format, width, height, tile_mode, swizzle, &gx2).unwrap();
        let linear = pattern(descriptor.linear_size().unwrap());

        let tiled = retile(&descriptor, &gx2, &linear, Direction::ToTiled).unwrap();
        assert_eq!(tiled.len(), descriptor.tiled_size(&gx2).unwrap());

        let restored = retile(&descriptor, &gx2, &tiled, Direction::ToLinear).unwrap();
        assert_eq!(restored, linear);
    }

    #[test]
    fn test_multi_slice_round_trip() {
        let gx2 = HardwareProfile::GX2;
        let descriptor = SurfaceDescriptor {
            depth: 3,
            ..SurfaceDescriptor::new(FORMAT_BC3, 64, 64, TileMode::Tiled2DThin1, 0, &gx2).unwrap()
        };
        let linear = pattern(descriptor.linear_size().unwrap());

        let tiled = retile(&descriptor, &gx2, &linear, Direction::ToTiled).unwrap();
        assert_eq!(tiled.len(), 32 * 16 * 3 * 16);
        let restored = retile(&descriptor, &gx2, &tiled, Direction::ToLinear).unwrap();
        assert_eq!(restored, linear);
    }

    #[test]
    fn test_precondition_errors() {
        let gx2 = HardwareProfile::GX2;
        let descriptor =
            SurfaceDescriptor::new(FORMAT_BC3, 64, 64, TileMode::Tiled2DThin1, 0, &gx2).unwrap();

        let short_linear = vec![0u8; 100];
        let error = retile(&descriptor, &gx2, &short_linear, Direction::ToTiled).unwrap_err();
        assert_eq!(
            error,
            Error::BufferTooSmall {
                needed: 16 * 16 * 16,
                actual: 100
            }
        );

        let short_tiled = vec![0u8; 1024];
        let error = retile(&descriptor, &gx2, &short_tiled, Direction::ToLinear).unwrap_err();
        assert!(matches!(error, Error::AddressOutOfRange { len: 1024, .. }));
    }

    #[test]
    fn test_configuration_errors() {
        let gx2 = HardwareProfile::GX2;
        let narrow = SurfaceDescriptor {
            pitch: 8,
            ..SurfaceDescriptor::new(FORMAT_BC3, 64, 64, TileMode::Tiled1DThin1, 0, &gx2).unwrap()
        };
        assert_eq!(
            retile(&narrow, &gx2, &[], Direction::ToLinear),
            Err(Error::InvalidSurface("pitch is narrower than the surface"))
        );

        let unknown = SurfaceDescriptor {
            format: 0x3f,
            ..narrow
        };
        assert!(retile(&unknown, &gx2, &[], Direction::ToLinear).is_err());
    }
}
