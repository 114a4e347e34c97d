//! Coordinate to address translation for linear, micro tiled and macro tiled surfaces.
//!
//! All offsets are computed in bits first and split into a byte offset and a bit position
//! at the end. Every format this crate moves around is a whole number of bytes wide, so
//! the bit position is zero for them.

use crate::tile_mode::{TileMode, TilingClass};
use crate::{Error, HardwareProfile, Result};

const MICRO_TILE_PIXELS: u64 = 64;

const BANK_SWAP_ORDER: [u32; 8] = [0, 1, 3, 2, 6, 7, 5, 4];

/// Location of an element inside a tiled surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitAddress {
    /// Byte offset from the start of the surface.
    pub byte: u64,
    /// Bit position within that byte.
    pub bit: u8,
}

impl BitAddress {
    fn from_bits(bits: u64) -> Self {
        BitAddress {
            byte: bits >> 3,
            bit: (bits & 7) as u8,
        }
    }
}

/// The parts of a surface description that the address computation depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceGeometry {
    /// Bits per element (pixel, or 4x4 block for BCn formats)
    pub bpp: u32,
    /// Row stride in elements
    pub pitch: u32,
    /// Padded height in elements
    pub height: u32,
    /// Number of slices
    pub num_slices: u32,
    /// Number of samples per element
    pub num_samples: u32,
    /// Whether the surface uses depth buffer element ordering
    pub is_depth: bool,
}

/// The address computation chosen for a surface, resolved once and reused for every
/// coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TilingStrategy {
    Linear,
    Micro,
    Macro,
    MacroBankSwapped {
        /// Width in elements after which the bank swap pattern advances
        swap_width: u32,
    },
}

/// Interleaves the low three bits of `x`, `y` (and `z` for thick tiles) into the index of
/// a pixel within its 8x8 micro tile.
pub fn pixel_index_within_micro_tile(
    x: u32,
    y: u32,
    z: u32,
    bpp: u32,
    tile_mode: TileMode,
    is_depth: bool,
) -> u32 {
    let x0 = x & 1;
    let x1 = (x >> 1) & 1;
    let x2 = (x >> 2) & 1;
    let y0 = y & 1;
    let y1 = (y >> 1) & 1;
    let y2 = (y >> 2) & 1;

    // bit 0 first
    let bits = if is_depth {
        [x0, y0, x1, y1, x2, y2]
    } else {
        match bpp {
            8 => [x0, x1, x2, y1, y0, y2],
            16 => [x0, x1, x2, y0, y1, y2],
            64 => [x0, y0, x1, x2, y1, y2],
            128 => [y0, x0, x1, x2, y1, y2],
            // 32 and 96 bit elements use the default ordering
            _ => [x0, x1, y0, x2, y1, y2],
        }
    };

    let mut index = bits
        .iter()
        .enumerate()
        .fold(0u32, |index, (position, bit)| index | (bit << position));

    if tile_mode.thickness() > 1 {
        index |= (z & 1) << 6;
        index |= ((z >> 1) & 1) << 7;
    }

    index
}

fn pipe_from_coord(x: u32, y: u32, profile: &HardwareProfile) -> u32 {
    match profile.pipes() {
        1 => 0,
        _ => ((y >> 3) ^ (x >> 3)) & 1,
    }
}

fn bank_from_coord(x: u32, y: u32, profile: &HardwareProfile) -> u32 {
    let pipes = profile.pipes();

    if profile.banks() == 4 {
        let bank_bit0 = ((y / (16 * pipes)) ^ (x >> 3)) & 1;
        let bank_bit1 = ((y / (8 * pipes)) ^ (x >> 4)) & 1;
        bank_bit0 | (bank_bit1 << 1)
    } else {
        let bank_bit0 = ((y / (32 * pipes)) ^ (x >> 3)) & 1;
        let bank_bit1 = ((y / (32 * pipes)) ^ (y / (16 * pipes)) ^ (x >> 4)) & 1;
        let bank_bit2 = ((y / (8 * pipes)) ^ (x >> 5)) & 1;
        bank_bit0 | (bank_bit1 << 1) | (bank_bit2 << 2)
    }
}

/// Computes how many elements wide a run of macro tiles sharing one bank swap entry is.
///
/// Returns 0 for tile modes without bank swapping.
pub fn bank_swapped_width(
    tile_mode: TileMode,
    bpp: u32,
    pitch: u32,
    num_samples: u32,
    profile: &HardwareProfile,
) -> u32 {
    if !tile_mode.is_bank_swapped() {
        return 0;
    }

    let bytes_per_sample = 8 * bpp;
    let samples_per_tile = profile.split_size() / bytes_per_sample;
    let slices_per_tile = if samples_per_tile != 0 {
        (num_samples / samples_per_tile).max(1)
    } else {
        1
    };

    let num_samples = if tile_mode.is_thick_macro_tiled() {
        4
    } else {
        num_samples
    };

    let bytes_per_tile_slice = num_samples * bytes_per_sample / slices_per_tile;
    let factor = tile_mode.macro_tile_aspect_ratio();
    let swap_tiles = ((profile.swap_size() >> 1) / bpp).max(1);

    let swap_width = swap_tiles * 8 * profile.banks();
    let height_bytes = num_samples * factor * profile.pipes() * bpp / slices_per_tile;
    let swap_max = profile.pipes() * profile.banks() * profile.row_size() / height_bytes;
    let swap_min = profile.pipe_interleave_bytes() * 8 * profile.banks() / bytes_per_tile_slice;

    let mut bank_swap_width = swap_max.min(swap_min.max(swap_width));
    while bank_swap_width >= 2 * pitch {
        bank_swap_width >>= 1;
    }

    bank_swap_width
}

/// Address of an element in a linear surface.
#[allow(clippy::too_many_arguments)]
pub fn address_linear(
    x: u32,
    y: u32,
    slice: u32,
    sample: u32,
    bpp: u32,
    pitch: u32,
    height: u32,
    num_slices: u32,
) -> BitAddress {
    let pitch = pitch as u64;
    let slice_offset = pitch * height as u64 * (slice as u64 + sample as u64 * num_slices as u64);
    let element = y as u64 * pitch + x as u64 + slice_offset;

    BitAddress::from_bits(element * bpp as u64)
}

/// Address of an element in a micro tiled (1D) surface.
#[allow(clippy::too_many_arguments)]
pub fn address_micro_tiled(
    x: u32,
    y: u32,
    slice: u32,
    bpp: u32,
    pitch: u32,
    height: u32,
    tile_mode: TileMode,
    is_depth: bool,
) -> BitAddress {
    let thickness = tile_mode.thickness() as u64;
    let bpp64 = bpp as u64;

    let micro_tile_bytes = (MICRO_TILE_PIXELS * thickness * bpp64 + 7) / 8;
    let micro_tiles_per_row = (pitch >> 3) as u64;
    let micro_tile_index_x = (x >> 3) as u64;
    let micro_tile_index_y = (y >> 3) as u64;
    let micro_tile_index_z = slice as u64 / thickness;

    let micro_tile_offset =
        micro_tile_bytes * (micro_tile_index_x + micro_tile_index_y * micro_tiles_per_row);
    let slice_bytes = (pitch as u64 * height as u64 * thickness * bpp64 + 7) / 8;
    let slice_offset = micro_tile_index_z * slice_bytes;

    let pixel_index = pixel_index_within_micro_tile(x, y, slice, bpp, tile_mode, is_depth);
    let pixel_offset = bpp64 * pixel_index as u64;

    BitAddress::from_bits((micro_tile_offset + slice_offset) * 8 + pixel_offset)
}

/// Resolves addresses for one surface.
///
/// Construction validates the surface and profile and precomputes everything that does
/// not depend on the coordinate, after which [`AddressEngine::address`] cannot fail.
#[derive(Clone, Copy, Debug)]
pub struct AddressEngine {
    strategy: TilingStrategy,
    tile_mode: TileMode,
    geometry: SurfaceGeometry,
    pipe_swizzle: u32,
    bank_swizzle: u32,
    samples_per_slice: u32,
    num_sample_splits: u32,
    profile: HardwareProfile,
}

impl AddressEngine {
    /// * `geometry`  - Element size and padded dimensions of the surface
    /// * `tile_mode` - Tile mode the surface is stored in
    /// * `swizzle`   - Surface swizzle register; pipe and bank swizzle start at bit 8
    /// * `profile`   - Memory layout of the target GPU
    pub fn new(
        geometry: SurfaceGeometry,
        tile_mode: TileMode,
        swizzle: u32,
        profile: &HardwareProfile,
    ) -> Result<Self> {
        if geometry.bpp == 0 || geometry.bpp > 128 {
            return Err(Error::UnsupportedBitsPerPixel(geometry.bpp));
        }
        if geometry.pitch == 0 {
            return Err(Error::InvalidSurface("pitch must be non-zero"));
        }
        if geometry.height == 0 || geometry.num_slices == 0 {
            return Err(Error::InvalidSurface("height and slice count must be non-zero"));
        }
        if !geometry.num_samples.is_power_of_two() {
            return Err(Error::InvalidSurface("sample count must be a power of two"));
        }

        let pipe_swizzle = (swizzle >> 8) & (profile.pipes() - 1);
        let bank_swizzle = (swizzle >> (8 + profile.pipe_bits())) & (profile.banks() - 1);

        let mut engine = AddressEngine {
            strategy: TilingStrategy::Linear,
            tile_mode,
            geometry,
            pipe_swizzle,
            bank_swizzle,
            samples_per_slice: geometry.num_samples,
            num_sample_splits: 1,
            profile: *profile,
        };

        engine.strategy = match tile_mode.class() {
            TilingClass::Linear => TilingStrategy::Linear,
            TilingClass::Micro => TilingStrategy::Micro,
            TilingClass::Macro => engine.resolve_macro_strategy()?,
        };

        log::debug!(
            "address engine for {:?}: {:?}, {} bpp, pitch {}, height {}",
            tile_mode,
            engine.strategy,
            geometry.bpp,
            geometry.pitch,
            geometry.height
        );

        Ok(engine)
    }

    fn resolve_macro_strategy(&mut self) -> Result<TilingStrategy> {
        let geometry = self.geometry;
        let thickness = self.tile_mode.thickness();
        let micro_tile_bytes =
            (geometry.num_samples as u64 * geometry.bpp as u64 * thickness as u64 * 64 + 7) / 8;

        // samples that do not fit into one split are spread over several tile slices
        if geometry.num_samples > 1 && micro_tile_bytes > self.profile.split_size() as u64 {
            let bytes_per_sample = micro_tile_bytes / geometry.num_samples as u64;
            let samples_per_slice = (self.profile.split_size() as u64 / bytes_per_sample) as u32;
            if samples_per_slice == 0 {
                return Err(Error::InvalidSurface(
                    "a single sample is larger than the tile split size",
                ));
            }
            self.samples_per_slice = samples_per_slice;
            self.num_sample_splits = geometry.num_samples / samples_per_slice;
        }

        if !self.tile_mode.is_bank_swapped() {
            return Ok(TilingStrategy::Macro);
        }

        let swap_width = bank_swapped_width(
            self.tile_mode,
            geometry.bpp,
            geometry.pitch,
            self.samples_per_slice,
            &self.profile,
        );
        log::trace!("bank swap width for {:?}: {}", self.tile_mode, swap_width);

        if swap_width == 0 {
            return Err(Error::InvalidSurface("bank swap width is zero"));
        }

        Ok(TilingStrategy::MacroBankSwapped { swap_width })
    }

    /// The address computation chosen for this surface.
    pub fn strategy(&self) -> TilingStrategy {
        self.strategy
    }

    /// Computes where the element at the given coordinate lives.
    ///
    /// * `x`, `y`  - Element coordinate (block coordinate for BCn formats)
    /// * `slice`   - Depth slice or array layer
    /// * `sample`  - Sample index for multi-sampled surfaces
    pub fn address(&self, x: u32, y: u32, slice: u32, sample: u32) -> BitAddress {
        let geometry = &self.geometry;
        match self.strategy {
            TilingStrategy::Linear => address_linear(
                x,
                y,
                slice,
                sample,
                geometry.bpp,
                geometry.pitch,
                geometry.height,
                geometry.num_slices,
            ),
            TilingStrategy::Micro => address_micro_tiled(
                x,
                y,
                slice,
                geometry.bpp,
                geometry.pitch,
                geometry.height,
                self.tile_mode,
                geometry.is_depth,
            ),
            TilingStrategy::Macro => self.address_macro_tiled(x, y, slice, sample, None),
            TilingStrategy::MacroBankSwapped { swap_width } => {
                self.address_macro_tiled(x, y, slice, sample, Some(swap_width))
            }
        }
    }

    fn address_macro_tiled(
        &self,
        x: u32,
        y: u32,
        slice: u32,
        sample: u32,
        swap_width: Option<u32>,
    ) -> BitAddress {
        let profile = &self.profile;
        let geometry = &self.geometry;
        let bpp = geometry.bpp as u64;
        let pipes = profile.pipes() as u64;
        let banks = profile.banks() as u64;
        let thickness = self.tile_mode.thickness() as u64;

        let micro_tile_bits = geometry.num_samples as u64 * bpp * thickness * MICRO_TILE_PIXELS;
        let pixel_index = pixel_index_within_micro_tile(
            x,
            y,
            slice,
            geometry.bpp,
            self.tile_mode,
            geometry.is_depth,
        ) as u64;

        let (sample_offset, pixel_offset) = if geometry.is_depth {
            (bpp * sample as u64, geometry.num_samples as u64 * bpp * pixel_index)
        } else {
            (
                sample as u64 * (micro_tile_bits / geometry.num_samples as u64),
                bpp * pixel_index,
            )
        };

        let mut elem_offset = pixel_offset + sample_offset;
        let num_sample_splits = self.num_sample_splits as u64;
        let mut sample_slice = 0;
        if num_sample_splits > 1 {
            let tile_slice_bits = micro_tile_bits / num_sample_splits;
            sample_slice = elem_offset / tile_slice_bits;
            elem_offset %= tile_slice_bits;
        }
        let bit = elem_offset & 7;
        let elem_offset = elem_offset >> 3;

        let pipe = pipe_from_coord(x, y, profile) as u64;
        let bank = bank_from_coord(x, y, profile) as u64;
        let mut bank_pipe = pipe + pipes * bank;

        let swizzle = self.pipe_swizzle as u64 + pipes * self.bank_swizzle as u64;
        let rotation = self.tile_mode.rotation(profile) as u64;
        let slice_in = if self.tile_mode.is_thick_macro_tiled() {
            slice as u64 >> 2
        } else {
            slice as u64
        };

        bank_pipe ^= (pipes * sample_slice * ((banks >> 1) + 1)) ^ (swizzle + slice_in * rotation);
        bank_pipe %= pipes * banks;
        let pipe = bank_pipe % pipes;
        let mut bank = bank_pipe / pipes;

        let samples_per_slice = self.samples_per_slice as u64;
        let slice_bytes = (geometry.height as u64
            * geometry.pitch as u64
            * thickness
            * bpp
            * samples_per_slice
            + 7)
            / 8;
        let slice_offset =
            slice_bytes * ((sample_slice + num_sample_splits * slice as u64) / thickness);

        let aspect_ratio = self.tile_mode.macro_tile_aspect_ratio() as u64;
        let macro_tile_pitch = 8 * banks / aspect_ratio;
        let macro_tile_height = 8 * pipes * aspect_ratio;

        let macro_tiles_per_row = geometry.pitch as u64 / macro_tile_pitch;
        let macro_tile_bytes =
            (samples_per_slice * thickness * bpp * macro_tile_height * macro_tile_pitch + 7) / 8;
        let macro_tile_index_x = x as u64 / macro_tile_pitch;
        let macro_tile_index_y = y as u64 / macro_tile_height;
        let macro_tile_offset =
            (macro_tile_index_x + macro_tiles_per_row * macro_tile_index_y) * macro_tile_bytes;

        if let Some(swap_width) = swap_width {
            let swap_index = macro_tile_pitch * macro_tile_index_x / swap_width as u64;
            bank ^= BANK_SWAP_ORDER[(swap_index & (banks - 1)) as usize] as u64;
        }

        let group_bits = profile.group_bits();
        let pipe_bits = profile.pipe_bits();
        let group_mask = (1u64 << group_bits) - 1;
        let num_swizzle_bits = profile.bank_bits() + pipe_bits;

        let total_offset = elem_offset + ((macro_tile_offset + slice_offset) >> num_swizzle_bits);
        let offset_high = (total_offset & !group_mask) << num_swizzle_bits;
        let offset_low = total_offset & group_mask;

        let byte = (bank << (pipe_bits + group_bits)) | (pipe << group_bits) | offset_low | offset_high;

        BitAddress {
            byte,
            bit: bit as u8,
        }
    }
}

/// Computes the address of a single element.
///
/// Prefer building an [`AddressEngine`] once when addressing many elements of the same
/// surface.
#[allow(clippy::too_many_arguments)]
pub fn compute_address(
    x: u32,
    y: u32,
    slice: u32,
    sample: u32,
    geometry: &SurfaceGeometry,
    tile_mode: TileMode,
    swizzle: u32,
    profile: &HardwareProfile,
) -> Result<BitAddress> {
    let engine = AddressEngine::new(*geometry, tile_mode, swizzle, profile)?;
    Ok(engine.address(x, y, slice, sample))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    fn geometry(bpp: u32, pitch: u32, height: u32) -> SurfaceGeometry {
        SurfaceGeometry {
            bpp,
            pitch,
            height,
            num_slices: 1,
            num_samples: 1,
            is_depth: false,
        }
    }

    fn byte_address(x: u32, y: u32, geometry: &SurfaceGeometry, tile_mode: TileMode) -> u64 {
        compute_address(x, y, 0, 0, geometry, tile_mode, 0, &HardwareProfile::GX2)
            .unwrap()
            .byte
    }

    #[test]
    fn test_pixel_index_patterns() {
        let thin = TileMode::Tiled1DThin1;
        // x = 0b101, y = 0b011
        assert_eq!(pixel_index_within_micro_tile(5, 3, 0, 8, thin, false), 0b011101);
        assert_eq!(pixel_index_within_micro_tile(5, 3, 0, 16, thin, false), 0b011101);
        assert_eq!(pixel_index_within_micro_tile(5, 3, 0, 32, thin, false), 0b011101);
        assert_eq!(pixel_index_within_micro_tile(5, 3, 0, 64, thin, false), 0b011011);
        assert_eq!(pixel_index_within_micro_tile(5, 3, 0, 128, thin, false), 0b011011);
        assert_eq!(pixel_index_within_micro_tile(5, 3, 0, 96, thin, false), 0b011101);
        assert_eq!(pixel_index_within_micro_tile(5, 3, 0, 32, thin, true), 0b011011);
        assert_eq!(pixel_index_within_micro_tile(1, 0, 0, 128, thin, false), 0b10);
    }

    #[test]
    fn test_unknown_bpp_uses_default_pattern() {
        let thin = TileMode::Tiled1DThin1;
        for (x, y) in [(0, 0), (3, 6), (7, 7), (2, 5)] {
            assert_eq!(
                pixel_index_within_micro_tile(x, y, 0, 24, thin, false),
                pixel_index_within_micro_tile(x, y, 0, 32, thin, false)
            );
        }
    }

    #[test]
    fn test_pixel_index_thick_uses_slice() {
        let thick = TileMode::Tiled1DThick;
        assert_eq!(pixel_index_within_micro_tile(0, 0, 1, 32, thick, false), 1 << 6);
        assert_eq!(pixel_index_within_micro_tile(0, 0, 2, 32, thick, false), 1 << 7);
        assert_eq!(pixel_index_within_micro_tile(0, 0, 3, 32, TileMode::Tiled1DThin1, false), 0);
    }

    #[test]
    fn test_linear_address() {
        let address = address_linear(3, 2, 1, 0, 128, 64, 16, 2);
        assert_eq!(address.byte, (3 + 2 * 64 + 64 * 16) * 16);
        assert_eq!(address.bit, 0);

        let sampled = address_linear(0, 0, 0, 1, 32, 8, 4, 3);
        assert_eq!(sampled.byte, 3 * 8 * 4 * 4);
    }

    #[test]
    fn test_linear_bit_position() {
        let address = address_linear(3, 0, 0, 0, 4, 16, 1, 1);
        assert_eq!(address, BitAddress { byte: 1, bit: 4 });
    }

    #[test]
    fn test_micro_tiled_address() {
        let g = geometry(128, 64, 64);
        let mode = TileMode::Tiled1DThin1;
        let expected = [(0, 0, 0), (1, 0, 32), (0, 1, 16), (8, 0, 1024), (0, 8, 8192), (9, 3, 1328)];
        for (x, y, byte) in expected {
            assert_eq!(byte_address(x, y, &g, mode), byte, "({x}, {y})");
        }

        let g = geometry(64, 64, 64);
        let expected = [(1, 0, 8), (0, 1, 16), (8, 0, 512), (0, 8, 4096), (9, 3, 664)];
        for (x, y, byte) in expected {
            assert_eq!(byte_address(x, y, &g, mode), byte, "({x}, {y})");
        }
    }

    #[test]
    fn test_macro_tiled_address() {
        let g = geometry(128, 64, 64);
        let mode = TileMode::Tiled2DThin1;
        let expected = [
            (0, 0, 0),
            (1, 0, 32),
            (0, 1, 16),
            (8, 0, 768),
            (0, 8, 256),
            (9, 3, 2864),
            (33, 17, 25648),
        ];
        for (x, y, byte) in expected {
            assert_eq!(byte_address(x, y, &g, mode), byte, "({x}, {y})");
        }
    }

    #[test]
    fn test_macro_tiled_swizzle() {
        let g = geometry(128, 64, 64);
        let profile = HardwareProfile::GX2;
        let mode = TileMode::Tiled2DThin1;
        let address = |x, y| {
            compute_address(x, y, 0, 0, &g, mode, 0x300, &profile)
                .unwrap()
                .byte
        };
        assert_eq!(address(0, 0), 768);
        assert_eq!(address(1, 0), 800);
        assert_eq!(address(8, 0), 0);
    }

    #[test]
    fn test_bank_swapped_address() {
        let g = geometry(128, 64, 64);
        let mode = TileMode::Tiled2BThin1;
        assert_eq!(byte_address(0, 0, &g, mode), 0);
        assert_eq!(byte_address(32, 0, &g, mode), 8704);
        assert_eq!(byte_address(40, 9, &g, mode), 8208);
    }

    #[test]
    fn test_bank_swapped_width() {
        let gx2 = HardwareProfile::GX2;
        assert_eq!(bank_swapped_width(TileMode::Tiled2BThin1, 128, 64, 1, &gx2), 32);
        // halved until narrower than twice the pitch
        assert_eq!(bank_swapped_width(TileMode::Tiled2BThin1, 128, 16, 1, &gx2), 16);
        assert_eq!(bank_swapped_width(TileMode::Tiled2BThin1, 64, 256, 1, &gx2), 64);
        assert_eq!(bank_swapped_width(TileMode::Tiled2BThin1, 8, 1024, 1, &gx2), 512);
        assert_eq!(bank_swapped_width(TileMode::Tiled2DThin1, 128, 64, 1, &gx2), 0);
    }

    #[test]
    fn test_strategy_selection() {
        let g = geometry(128, 64, 64);
        let profile = HardwareProfile::GX2;
        let strategy = |mode| AddressEngine::new(g, mode, 0, &profile).unwrap().strategy();

        assert_eq!(strategy(TileMode::LinearSpecial), TilingStrategy::Linear);
        assert_eq!(strategy(TileMode::Tiled1DThick), TilingStrategy::Micro);
        assert_eq!(strategy(TileMode::Tiled3DThin1), TilingStrategy::Macro);
        assert_eq!(
            strategy(TileMode::Tiled2BThin1),
            TilingStrategy::MacroBankSwapped { swap_width: 32 }
        );
    }

    #[test]
    fn test_invalid_geometry() {
        let profile = HardwareProfile::GX2;
        let mode = TileMode::Tiled2DThin1;
        assert_eq!(
            AddressEngine::new(geometry(0, 64, 64), mode, 0, &profile).unwrap_err(),
            Error::UnsupportedBitsPerPixel(0)
        );
        assert_eq!(
            AddressEngine::new(geometry(256, 64, 64), mode, 0, &profile).unwrap_err(),
            Error::UnsupportedBitsPerPixel(256)
        );
        assert!(AddressEngine::new(geometry(128, 0, 64), mode, 0, &profile).is_err());

        let mut multi = geometry(128, 64, 64);
        multi.num_samples = 3;
        assert!(AddressEngine::new(multi, mode, 0, &profile).is_err());
    }

    #[rstest]
    #[case(TileMode::LinearGeneral)]
    #[case(TileMode::LinearAligned)]
    #[case(TileMode::Tiled1DThin1)]
    #[case(TileMode::Tiled2DThin1)]
    #[case(TileMode::Tiled2DThin2)]
    #[case(TileMode::Tiled2DThin4)]
    #[case(TileMode::Tiled2BThin1)]
    #[case(TileMode::Tiled2BThin2)]
    #[case(TileMode::Tiled2BThin4)]
    #[case(TileMode::Tiled3DThin1)]
    #[case(TileMode::Tiled3BThin1)]
    #[case(TileMode::LinearSpecial)]
    fn test_thin_addresses_are_a_permutation(
        #[case] tile_mode: TileMode,
        #[values(64, 128)] bpp: u32,
        #[values(0, 0x100, 0x700)] swizzle: u32,
    ) {
        let profile = HardwareProfile::GX2;
        let (pitch, height) = (64, 128);
        let g = geometry(bpp, pitch, height);
        let engine = AddressEngine::new(g, tile_mode, swizzle, &profile).unwrap();
        let element_bytes = (bpp / 8) as u64;

        let mut seen = HashSet::new();
        for y in 0..height {
            for x in 0..pitch {
                let address = engine.address(x, y, 0, 0);
                assert_eq!(address.bit, 0);
                assert_eq!(address.byte % element_bytes, 0);
                assert!(seen.insert(address.byte), "collision at ({x}, {y})");
            }
        }

        let surface_bytes = pitch as u64 * height as u64 * element_bytes;
        assert!(seen.iter().all(|&byte| byte + element_bytes <= surface_bytes));
    }

    #[rstest]
    #[case(TileMode::Tiled1DThick)]
    #[case(TileMode::Tiled2DThick)]
    #[case(TileMode::Tiled2BThick)]
    #[case(TileMode::Tiled3DThick)]
    #[case(TileMode::Tiled3BThick)]
    fn test_thick_addresses_are_a_permutation(#[case] tile_mode: TileMode) {
        let profile = HardwareProfile::GX2;
        let g = SurfaceGeometry {
            num_slices: 4,
            ..geometry(32, 64, 64)
        };
        let engine = AddressEngine::new(g, tile_mode, 0x200, &profile).unwrap();

        let mut seen = HashSet::new();
        for slice in 0..4 {
            for y in 0..64 {
                for x in 0..64 {
                    let address = engine.address(x, y, slice, 0);
                    assert!(address.byte < 64 * 64 * 4 * 4);
                    assert!(seen.insert(address.byte));
                }
            }
        }
        assert_eq!(seen.len(), 64 * 64 * 4);
    }

    #[test]
    fn test_eight_bank_addresses_are_a_permutation() {
        let profile = HardwareProfile::new(2, 8, 256, 2048, 256, 2048).unwrap();
        let g = geometry(128, 128, 64);
        for tile_mode in [TileMode::Tiled2DThin1, TileMode::Tiled2BThin1, TileMode::Tiled3DThin1] {
            let engine = AddressEngine::new(g, tile_mode, 0x300, &profile).unwrap();
            let mut seen = HashSet::new();
            for y in 0..64 {
                for x in 0..128 {
                    let address = engine.address(x, y, 0, 0);
                    assert!(address.byte < 128 * 64 * 16);
                    assert!(seen.insert(address.byte), "{tile_mode:?} ({x}, {y})");
                }
            }
        }
    }
}
