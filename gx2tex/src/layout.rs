//! Padded dimensions and alignments of the base level of a surface.

use crate::address::bank_swapped_width;
use crate::format::{bits_per_element, is_block_compressed};
use crate::tile_mode::{TileMode, TilingClass};
use crate::{Error, HardwareProfile, Result};

/// Pitch, height and size of the base level of a surface after padding.
///
/// Pitch and height are in elements, i.e. in 4x4 blocks for block compressed formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceLayout {
    /// Tile mode the surface is actually stored in, which may be simpler than the one
    /// requested.
    pub tile_mode: TileMode,
    pub bpp: u32,
    pub pitch: u32,
    pub height: u32,
    pub num_slices: u32,
    /// Size of the padded surface in bytes.
    pub size: u64,
    pub base_alignment: u32,
    pub pitch_alignment: u32,
    pub height_alignment: u32,
    pub depth_alignment: u32,
}

struct Alignments {
    base: u32,
    pitch: u32,
    height: u32,
}

/// Row alignment, in elements, of surfaces stored in `tile_mode`.
///
/// This is also the granularity the padded height of a tiled surface is a multiple of.
pub fn height_alignment(tile_mode: TileMode, profile: &HardwareProfile) -> u32 {
    match tile_mode {
        TileMode::LinearGeneral | TileMode::LinearAligned | TileMode::LinearSpecial => 1,
        TileMode::Tiled1DThin1 | TileMode::Tiled1DThick => 8,
        _ => tile_mode.macro_tile_aspect_ratio() * 8 * profile.pipes(),
    }
}

/// Number of slices a single micro tile is split into when it is larger than the split
/// size.
fn tile_slices(tile_mode: TileMode, bpp: u32, num_samples: u32, profile: &HardwareProfile) -> u32 {
    let bytes_per_sample = ((bpp << 6) + 7) >> 3;
    let num_samples = if tile_mode.thickness() > 1 {
        4
    } else {
        num_samples
    };

    match profile.split_size() / bytes_per_sample {
        0 => 1,
        samples_per_tile => (num_samples / samples_per_tile).max(1),
    }
}

/// Picks the tile mode the base level is stored in.
///
/// Thick and multi-slice variants fall back to their thin counterparts when a micro tile
/// would not fit into a tile split.
fn effective_tile_mode(
    tile_mode: TileMode,
    bpp: u32,
    num_samples: u32,
    is_depth: bool,
    profile: &HardwareProfile,
) -> TileMode {
    let interleave = profile.pipe_interleave_bytes();
    let split = profile.split_size();
    let splits_micro_tile =
        num_samples > 1 || tile_slices(tile_mode, bpp, num_samples, profile) > 1 || is_depth;

    let mode = match tile_mode {
        TileMode::Tiled2DThin2 if 2 * interleave > split => TileMode::Tiled2DThin1,
        TileMode::Tiled2DThin4 if 4 * interleave > split => TileMode::Tiled2DThin2,
        TileMode::Tiled2BThin2 if 2 * interleave > split => TileMode::Tiled2BThin1,
        TileMode::Tiled2BThin4 if 4 * interleave > split => TileMode::Tiled2BThin2,
        TileMode::Tiled2DThick if splits_micro_tile => TileMode::Tiled2DThin1,
        TileMode::Tiled2BThick if splits_micro_tile => TileMode::Tiled2BThin1,
        TileMode::Tiled3DThick if splits_micro_tile => TileMode::Tiled3DThin1,
        TileMode::Tiled3BThick if splits_micro_tile => TileMode::Tiled3BThin1,
        TileMode::Tiled1DThin1 if num_samples > 1 => TileMode::Tiled2DThin1,
        TileMode::Tiled1DThick if matches!(num_samples, 2 | 4) => TileMode::Tiled2DThick,
        TileMode::Tiled1DThick if num_samples > 1 || is_depth => TileMode::Tiled1DThin1,
        other => other,
    };

    // 3D modes only make sense when the slice rotation moves to another pipe
    if mode.rotation(profile) % profile.pipes() == 0 {
        match mode {
            TileMode::Tiled3DThin1 => TileMode::Tiled2DThin1,
            TileMode::Tiled3DThick => TileMode::Tiled2DThick,
            TileMode::Tiled3BThin1 => TileMode::Tiled2BThin1,
            TileMode::Tiled3BThick => TileMode::Tiled2BThick,
            other => other,
        }
    } else {
        mode
    }
}

fn linear_alignments(tile_mode: TileMode, bpp: u32, profile: &HardwareProfile) -> Alignments {
    match tile_mode {
        TileMode::LinearGeneral => Alignments {
            base: 1,
            pitch: if bpp != 1 { 1 } else { 8 },
            height: 1,
        },
        TileMode::LinearAligned => Alignments {
            base: profile.pipe_interleave_bytes(),
            pitch: 64u32.max(8 * profile.pipe_interleave_bytes() / bpp),
            height: 1,
        },
        _ => Alignments {
            base: 1,
            pitch: 1,
            height: 1,
        },
    }
}

fn micro_tiled_alignments(
    tile_mode: TileMode,
    bpp: u32,
    num_samples: u32,
    profile: &HardwareProfile,
) -> Alignments {
    let bpp = reduce_expanded_bpp(bpp);
    let thickness = tile_mode.thickness();

    Alignments {
        base: profile.pipe_interleave_bytes(),
        pitch: 8u32.max(profile.pipe_interleave_bytes() / bpp / num_samples / thickness),
        height: 8,
    }
}

fn macro_tiled_alignments(
    tile_mode: TileMode,
    bpp: u32,
    num_samples: u32,
    profile: &HardwareProfile,
) -> Alignments {
    let bpp = match reduce_expanded_bpp(bpp) {
        3 => 1,
        bpp => bpp,
    };
    let group_bytes = profile.pipe_interleave_bytes();
    let aspect_ratio = tile_mode.macro_tile_aspect_ratio();
    let thickness = tile_mode.thickness();

    let macro_tile_width = 8 * profile.banks() / aspect_ratio;
    let macro_tile_height = aspect_ratio * 8 * profile.pipes();

    let pitch = macro_tile_width
        .max(macro_tile_width * (group_bytes / bpp / (8 * thickness) / num_samples));
    let height = macro_tile_height;

    let macro_tile_bytes = num_samples * ((bpp * macro_tile_height * macro_tile_width + 7) >> 3);
    let base = if thickness == 1 {
        macro_tile_bytes.max((num_samples * height * bpp * pitch + 7) >> 3)
    } else {
        group_bytes.max((4 * height * bpp * pitch + 7) >> 3)
    };

    let micro_tile_bytes = (thickness * num_samples * (bpp << 6) + 7) >> 3;
    let slices_per_micro_tile = if micro_tile_bytes < profile.split_size() {
        1
    } else {
        micro_tile_bytes / profile.split_size()
    };

    Alignments {
        base: base / slices_per_micro_tile,
        pitch,
        height,
    }
}

/// 24, 48 and 96 bit formats are aligned like their single channel counterparts.
fn reduce_expanded_bpp(bpp: u32) -> u32 {
    match bpp {
        24 | 48 | 96 => bpp / 3,
        _ => bpp,
    }
}

impl SurfaceLayout {
    /// Computes the layout of mip level 0 of a 2D or 3D surface.
    ///
    /// * `format`      - GX2 surface format
    /// * `width`       - Width in pixels
    /// * `height`      - Height in pixels
    /// * `depth`       - Number of slices
    /// * `tile_mode`   - Requested tile mode
    /// * `num_samples` - Samples per pixel, a power of two
    /// * `is_depth`    - Whether this is a depth buffer
    /// * `profile`     - Memory layout of the target GPU
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        format: u32,
        width: u32,
        height: u32,
        depth: u32,
        tile_mode: TileMode,
        num_samples: u32,
        is_depth: bool,
        profile: &HardwareProfile,
    ) -> Result<Self> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(Error::InvalidSurface("surface dimensions must be non-zero"));
        }
        if !num_samples.is_power_of_two() {
            return Err(Error::InvalidSurface("sample count must be a power of two"));
        }

        let bpp = bits_per_element(format)?;
        let (width, height) = if is_block_compressed(format) {
            ((width + 3) / 4, (height + 3) / 4)
        } else {
            (width, height)
        };

        if tile_mode == TileMode::LinearSpecial {
            let size =
                (bpp as u64 * num_samples as u64 * depth as u64 * height as u64 * width as u64) >> 3;
            return Ok(SurfaceLayout {
                tile_mode,
                bpp,
                pitch: width,
                height,
                num_slices: depth,
                size,
                base_alignment: 1,
                pitch_alignment: 1,
                height_alignment: 1,
                depth_alignment: 1,
            });
        }

        let effective = effective_tile_mode(tile_mode, bpp, num_samples, is_depth, profile);
        let thickness = effective.thickness();

        let mut alignments = match effective.class() {
            TilingClass::Linear => linear_alignments(effective, bpp, profile),
            TilingClass::Micro => micro_tiled_alignments(effective, bpp, num_samples, profile),
            TilingClass::Macro => macro_tiled_alignments(effective, bpp, num_samples, profile),
        };

        if effective.class() == TilingClass::Macro {
            let swap_width = bank_swapped_width(effective, bpp, width, num_samples, profile);
            alignments.pitch = alignments.pitch.max(swap_width);
        }

        let pitch = width.next_multiple_of(alignments.pitch);
        let padded_height = height.next_multiple_of(alignments.height);
        let num_slices = if thickness > 1 {
            depth.next_multiple_of(thickness)
        } else {
            depth
        };

        let surface_elements = padded_height as u64 * pitch as u64;
        let size = match effective.class() {
            // linear surfaces count the sample dimension twice
            TilingClass::Linear => {
                let slices = (num_slices * num_samples / thickness) as u64;
                (surface_elements * slices * bpp as u64 * num_samples as u64 + 7) / 8
            }
            _ => {
                (surface_elements * num_slices as u64 * bpp as u64 * num_samples as u64 + 7) / 8
            }
        };

        log::debug!(
            "layout for {:?} (stored as {:?}): pitch {}, height {}, {} bytes",
            tile_mode,
            effective,
            pitch,
            padded_height,
            size
        );

        Ok(SurfaceLayout {
            tile_mode: effective,
            bpp,
            pitch,
            height: padded_height,
            num_slices,
            size,
            base_alignment: alignments.base,
            pitch_alignment: alignments.pitch,
            height_alignment: alignments.height,
            depth_alignment: thickness,
        })
    }
}
