//! Whole-surface conversions between tiled BC3 data and RGBA pixels.

use alloc::{vec, vec::Vec};

use crate::format::is_bc3;
use crate::surface::{retile, Direction, SurfaceDescriptor};
use crate::{Decoder, Encoder, Error, HardwareProfile, Result, BC3};

/// Decompresses BC3 blocks stored in row-major order into RGBA pixels.
///
/// * `blocks` - The compressed blocks, `BC3::compressed_size(width, height)` bytes
/// * `width`  - Width of the image in pixels
/// * `height` - Height of the image in pixels
pub fn decode_linear(blocks: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let mut rgba = vec![0u8; width * height * 4];
    BC3::decompress(blocks, width, height, &mut rgba)?;
    Ok(rgba)
}

/// Compresses RGBA pixels into BC3 blocks in row-major order.
///
/// * `rgba`   - The pixels, 4 bytes each in R, G, B, A order
/// * `width`  - Width of the image in pixels
/// * `height` - Height of the image in pixels
pub fn encode_linear(rgba: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let mut blocks = vec![0u8; BC3::compressed_size(width, height)];
    BC3::compress(rgba, width, height, &mut blocks)?;
    Ok(blocks)
}

/// Number of separate images in a surface (slices times samples) and the pixel
/// dimensions of each.
fn images(descriptor: &SurfaceDescriptor) -> Result<(usize, usize, usize)> {
    if !is_bc3(descriptor.format) {
        return Err(Error::UnsupportedFormat(descriptor.format));
    }
    Ok((
        descriptor.depth as usize * descriptor.num_samples as usize,
        descriptor.width as usize,
        descriptor.height as usize,
    ))
}

/// Untiles a BC3 surface and decompresses it.
///
/// Returns the RGBA pixels of every slice one after another, followed by the slices of
/// any further samples.
///
/// * `tiled`      - The surface as stored by the GPU
/// * `descriptor` - Layout of the surface
/// * `profile`    - Memory layout of the GPU the surface was tiled for
pub fn decode_surface(
    tiled: &[u8],
    descriptor: &SurfaceDescriptor,
    profile: &HardwareProfile,
) -> Result<Vec<u8>> {
    let (count, width, height) = images(descriptor)?;
    log::debug!(
        "decoding {} BC3 image(s) of {}x{} from {:?}",
        count,
        width,
        height,
        descriptor.tile_mode
    );

    let blocks = retile(descriptor, profile, tiled, Direction::ToLinear)?;

    let image_blocks = BC3::compressed_size(width, height);
    let image_bytes = width * height * 4;
    let mut rgba = vec![0u8; count * image_bytes];
    for (source, output) in blocks
        .chunks_exact(image_blocks)
        .zip(rgba.chunks_exact_mut(image_bytes))
    {
        BC3::decompress(source, width, height, output)?;
    }

    Ok(rgba)
}

/// Compresses RGBA pixels and tiles the result into a BC3 surface.
///
/// The pixels are laid out as [`decode_surface`] returns them. The result is sized by
/// [`SurfaceDescriptor::tiled_size`].
///
/// * `rgba`       - The pixels, 4 bytes each in R, G, B, A order
/// * `descriptor` - Layout of the surface to produce
/// * `profile`    - Memory layout of the target GPU
pub fn encode_surface(
    rgba: &[u8],
    descriptor: &SurfaceDescriptor,
    profile: &HardwareProfile,
) -> Result<Vec<u8>> {
    let (count, width, height) = images(descriptor)?;
    log::debug!(
        "encoding {} BC3 image(s) of {}x{} to {:?}",
        count,
        width,
        height,
        descriptor.tile_mode
    );

    let image_bytes = width * height * 4;
    let needed = count * image_bytes;
    if rgba.len() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            actual: rgba.len(),
        });
    }

    let image_blocks = BC3::compressed_size(width, height);
    let mut blocks = vec![0u8; count * image_blocks];
    for (source, output) in rgba[..needed]
        .chunks_exact(image_bytes.max(1))
        .zip(blocks.chunks_exact_mut(image_blocks.max(1)))
    {
        BC3::compress(source, width, height, output)?;
    }

    retile(descriptor, profile, &blocks, Direction::ToTiled)
}
