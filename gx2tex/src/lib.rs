// Copyright (c) 2006 Simon Brown <si@sjbrown.co.uk>
// Copyright (c) 2018-2021 Jan Solanti <jhs@psonet.com>
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to	deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS
// OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE
// SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Wii U (GX2) texture surfaces: tiled addressing and a BC3/DXT5 compressor and
//! decompressor.
//!
//! GX2 surfaces are stored in one of the R600 address library tile modes:
//! * linear: rows of elements one after another
//! * micro tiled (1D): 8x8 element tiles with an interleaved element order
//! * macro tiled (2D/3D): micro tiles further distributed across memory pipes and banks,
//!   optionally with bank swapping
//!
//! [`AddressEngine`] maps element coordinates to byte offsets, [`retile`] moves whole
//! surfaces between tiled and linear order, and [`BC3`] converts between linear blocks and
//! RGBA pixels. [`decode_surface`] and [`encode_surface`] combine both steps.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod address;
mod alpha;
mod bc3;
mod colourblock;
mod error;
mod format;
mod layout;
mod pipeline;
mod profile;
mod surface;
mod tile_mode;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

pub use address::{
    address_linear, address_micro_tiled, bank_swapped_width, compute_address,
    pixel_index_within_micro_tile, AddressEngine, BitAddress, SurfaceGeometry, TilingStrategy,
};
pub use bc3::BC3;
pub use error::{Error, ErrorKind, Result};
pub use format::{bits_per_element, is_bc3, is_block_compressed, BITS_PER_ELEMENT, FORMAT_BC3};
pub use layout::{height_alignment, SurfaceLayout};
pub use pipeline::{decode_linear, decode_surface, encode_linear, encode_surface};
pub use profile::{HardwareProfile, MAX_PROFILE_SIZE};
pub use surface::{retile, Direction, SurfaceDescriptor};
pub use tile_mode::{TileMode, TilingClass};

/// Returns number of blocks needed for an image of given dimension
fn num_blocks(size: usize) -> usize {
    (size + 3) / 4
}

/// Copies the 4x4 block at (`block_x`, `block_y`) out of an RGBA image.
///
/// Returns the pixels together with a mask of the ones inside the image; the others are
/// left zeroed.
fn gather_block(
    rgba: &[u8],
    width: usize,
    height: usize,
    block_x: usize,
    block_y: usize,
) -> ([[u8; 4]; 16], u32) {
    let mut block = [[0u8; 4]; 16];
    let mut mask = 0u32;

    for py in 0..4 {
        for px in 0..4 {
            let index = 4 * py + px;

            // get position in source image
            let sx = 4 * block_x + px;
            let sy = 4 * block_y + py;

            // enable pixel if within bounds
            if sx < width && sy < height {
                let src_index = 4 * (width * sy + sx);
                block[index].copy_from_slice(&rgba[src_index..src_index + 4]);
                mask |= 1 << index;
            }
        }
    }

    (block, mask)
}

fn check_len(needed: usize, actual: usize) -> Result<()> {
    if actual < needed {
        return Err(Error::BufferTooSmall { needed, actual });
    }
    Ok(())
}

/// This module is used for sealing traits.
/// See <https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed>
mod private {
    pub trait Format {
        /// Returns how many bytes a 4x4 block of pixels will compress into.
        fn block_size() -> usize;
    }

    pub trait Decoder: Format {
        /// Decompresses a 4x4 block of pixels
        ///
        /// * `block`  - The compressed block of pixels
        fn decompress_block(block: &[u8]) -> [[u8; 4]; 16];
    }

    pub trait Encoder: Format {
        /// Compresses a 4x4 block of pixels, masking out some pixels e.g. for padding the
        /// image to a multiple of the block size.
        ///
        /// * `rgba`   - The uncompressed block of pixels
        /// * `mask`   - The valid pixel mask
        /// * `output` - Storage for the compressed block
        fn compress_block_masked(rgba: [[u8; 4]; 16], mask: u32, output: &mut [u8]);
    }
}

/// Abstraction over any decoder for any format.
/// Note that this trait is sealed, i.e. it can not be implemented outside of this crate.
pub trait Decoder: private::Decoder {
    /// Decompresses an image in memory
    ///
    /// * `data`   - The compressed image data, blocks in row-major order
    /// * `width`  - The width of the source image
    /// * `height` - The height of the source image
    /// * `output` - Space to store the decompressed image, 4 bytes per pixel
    fn decompress(data: &[u8], width: usize, height: usize, output: &mut [u8]) -> Result<()> {
        let blocks_wide = num_blocks(width);
        let block_size = Self::block_size();

        check_len(blocks_wide * num_blocks(height) * block_size, data.len())?;
        check_len(width * height * 4, output.len())?;
        if width == 0 || height == 0 {
            return Ok(());
        }
        let output = &mut output[..width * height * 4];

        #[cfg(feature = "rayon")]
        let output_rows = output.par_chunks_mut(width * 4 * 4);
        #[cfg(not(feature = "rayon"))]
        let output_rows = output.chunks_mut(width * 4 * 4);

        // loop over blocks
        output_rows.enumerate().for_each(|(y, output_row)| {
            for x in 0..blocks_wide {
                // decompress the block
                let bidx = (x + y * blocks_wide) * block_size;
                let rgba = Self::decompress_block(&data[bidx..bidx + block_size]);

                // write the decompressed pixels to the correct image location
                for py in 0..4 {
                    for px in 0..4 {
                        // get target location
                        let sx = 4 * x + px;
                        let sy = 4 * y + py;

                        if sx < width && sy < height {
                            let target = 4 * (sx + py * width);
                            output_row[target..target + 4].copy_from_slice(&rgba[px + py * 4]);
                        }
                    }
                }
            }
        });

        Ok(())
    }
}

/// Abstraction over any encoder for any format.
/// Note that this trait is sealed, i.e. it can not be implemented outside of this crate.
pub trait Encoder: private::Encoder {
    /// Computes the amount of space in bytes needed for an image of given size,
    /// accounting for padding to a multiple of 4x4 pixels
    ///
    /// * `width`  - Width of the uncompressed image
    /// * `height` - Height of the uncompressed image
    fn compressed_size(width: usize, height: usize) -> usize {
        // Number of blocks required for image of given dimensions
        let blocks = num_blocks(width) * num_blocks(height);
        blocks * Self::block_size()
    }

    /// Compresses an image in memory
    ///
    /// * `rgba`   - The uncompressed pixel data, 4 bytes per pixel
    /// * `width`  - The width of the source image
    /// * `height` - The height of the source image
    /// * `output` - Output buffer for the compressed image. Must have at least as much
    ///   space available as `compressed_size` suggests.
    fn compress(rgba: &[u8], width: usize, height: usize, output: &mut [u8]) -> Result<()> {
        let compressed_size = Self::compressed_size(width, height);
        check_len(width * height * 4, rgba.len())?;
        check_len(compressed_size, output.len())?;
        if width == 0 || height == 0 {
            return Ok(());
        }

        let block_size = Self::block_size();
        let blocks_wide = num_blocks(width);
        let output = &mut output[..compressed_size];

        #[cfg(feature = "rayon")]
        let output_rows = output.par_chunks_mut(blocks_wide * block_size);
        #[cfg(not(feature = "rayon"))]
        let output_rows = output.chunks_mut(blocks_wide * block_size);

        output_rows.enumerate().for_each(|(y, output_row)| {
            let output_blocks = output_row.chunks_mut(block_size);

            output_blocks.enumerate().for_each(|(x, output_block)| {
                let (source_rgba, mask) = gather_block(rgba, width, height, x, y);
                Self::compress_block_masked(source_rgba, mask, output_block);
            });
        });

        Ok(())
    }
}

//--------------------------------------------------------------------------------
// Unit tests
//--------------------------------------------------------------------------------
