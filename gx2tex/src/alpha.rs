//! The 8 byte alpha half of a BC3 block: two 8 bit endpoints followed by sixteen 3-bit
//! palette indices.

/// Alpha values at or beyond these are treated as fully transparent or fully opaque.
const ALPHA_LOW: u8 = 0x02;
const ALPHA_HIGH: u8 = 0xFD;

/// How the endpoints of an alpha block were chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaMode {
    /// Endpoints span the range of the block, upper end first
    Direct,
    /// Endpoints span the samples seen before the first extreme one, lower end first
    Partial,
}

/// Alpha endpoints of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlphaEndpoints {
    pub alpha0: u8,
    pub alpha1: u8,
    pub mode: AlphaMode,
}

/// Chooses the alpha endpoints for a set of samples.
///
/// Once a sample at or beyond the extreme thresholds has been seen, later samples no
/// longer update the partial range.
pub fn fit_endpoints<I>(samples: I) -> AlphaEndpoints
where
    I: IntoIterator<Item = u8>,
{
    let mut partial_min = 255u8;
    let mut partial_max = 0u8;
    let mut min = 255u8;
    let mut max = 0u8;
    let mut seen_extreme = false;

    for alpha in samples {
        if alpha <= ALPHA_LOW || alpha >= ALPHA_HIGH {
            seen_extreme = true;
        }
        if !seen_extreme {
            partial_min = partial_min.min(alpha);
            partial_max = partial_max.max(alpha);
        }
        min = min.min(alpha);
        max = max.max(alpha);
    }

    let near_extreme = max <= 0x15
        || (min <= 0x05 && max <= 0x30)
        || min >= 0xEA
        || (max >= 0xFA && min >= 0xCF);

    let mode = if seen_extreme && !near_extreme {
        AlphaMode::Partial
    } else {
        AlphaMode::Direct
    };
    if !near_extreme {
        min = partial_min;
        max = partial_max;
    }

    match mode {
        AlphaMode::Direct => {
            if min == max {
                // 0 steps down to 254, not 255
                max = match max {
                    0 => 254,
                    max => max - 1,
                };
            }
            AlphaEndpoints {
                alpha0: max,
                alpha1: min,
                mode,
            }
        }
        AlphaMode::Partial => AlphaEndpoints {
            alpha0: min,
            alpha1: max,
            mode,
        },
    }
}

/// Builds the eight entry alpha palette.
pub fn palette(alpha0: u8, alpha1: u8) -> [u8; 8] {
    let a0 = alpha0 as u32;
    let a1 = alpha1 as u32;

    let mut codes = [0u8; 8];
    codes[0] = alpha0;
    codes[1] = alpha1;
    if alpha0 > alpha1 {
        for k in 2..8u32 {
            codes[k as usize] = (((8 - k) * a0 + (k - 1) * a1) / 7) as u8;
        }
    } else {
        for k in 2..6u32 {
            codes[k as usize] = (((6 - k) * a0 + (k - 1) * a1) / 5) as u8;
        }
        codes[6] = 0;
        codes[7] = 255;
    }
    codes
}

fn nearest_index(alpha: u8, codes: &[u8; 8]) -> u64 {
    let mut best_index = 0;
    let mut best_distance = u32::MAX;

    for (index, &code) in codes.iter().enumerate() {
        if code == alpha {
            return index as u64;
        }

        let distance = (alpha as i32 - code as i32).unsigned_abs();
        if distance < best_distance {
            best_distance = distance;
            best_index = index as u64;
        }
    }

    best_index
}

/// Compresses one channel of a 4x4 block into a BC3 alpha block.
///
/// * `rgba`    - The block of pixels
/// * `channel` - Which channel of each pixel to compress
/// * `mask`    - The valid pixel mask
/// * `output`  - Storage for the 8 byte alpha block
pub fn compress_bc3(rgba: &[[u8; 4]; 16], channel: usize, mask: u32, output: &mut [u8]) {
    let enabled = |i: &usize| (mask >> *i) & 1 != 0;

    let endpoints = fit_endpoints((0..16).filter(enabled).map(|i| rgba[i][channel]));
    let codes = palette(endpoints.alpha0, endpoints.alpha1);

    let mut indices = 0u64;
    if (0..16).filter(enabled).all(|i| rgba[i][channel] == 0) {
        // every pixel, enabled or not, points at the first slot holding 0
        let zero = codes.iter().position(|&code| code == 0).unwrap_or(0) as u64;
        for i in 0..16 {
            indices |= zero << (3 * i);
        }
    } else {
        for i in (0..16).filter(enabled) {
            indices |= nearest_index(rgba[i][channel], &codes) << (3 * i);
        }
    }

    output[0] = endpoints.alpha0;
    output[1] = endpoints.alpha1;
    output[2..8].copy_from_slice(&indices.to_le_bytes()[..6]);
}

/// Decompresses a BC3 alpha block into one channel of a 4x4 block.
///
/// * `rgba`    - The decompressed pixels to write into
/// * `channel` - Which channel of each pixel to overwrite
/// * `bytes`   - The 8 byte alpha block
pub fn decompress_bc3(rgba: &mut [[u8; 4]; 16], channel: usize, bytes: &[u8]) {
    let codes = palette(bytes[0], bytes[1]);

    let mut packed = [0u8; 8];
    packed[..6].copy_from_slice(&bytes[2..8]);
    let indices = u64::from_le_bytes(packed);

    for (i, pixel) in rgba.iter_mut().enumerate() {
        pixel[channel] = codes[((indices >> (3 * i)) & 7) as usize];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[0xff; 16], 0xfe, 0xff, AlphaMode::Direct)]
    #[case(&[0x10, 0x80, 0xf0], 0xf0, 0x10, AlphaMode::Direct)]
    #[case(&[0x40, 0x80, 0x90], 0x90, 0x40, AlphaMode::Direct)]
    #[case(&[0x00; 16], 0xfe, 0x00, AlphaMode::Direct)]
    #[case(&[0x01; 16], 0x00, 0x01, AlphaMode::Direct)]
    #[case(&[0x00, 0x80], 0xff, 0x00, AlphaMode::Partial)]
    // partial tracking stops at the first extreme sample
    #[case(&[0x80, 0xff, 0x40], 0x80, 0x80, AlphaMode::Partial)]
    #[case(&[0x40, 0x90, 0x00, 0xff], 0x40, 0x90, AlphaMode::Partial)]
    // near-extreme bands use the true range
    #[case(&[0x03, 0x00, 0x30], 0x30, 0x00, AlphaMode::Direct)]
    #[case(&[0xd0, 0xff], 0xff, 0xd0, AlphaMode::Direct)]
    fn test_fit_endpoints(
        #[case] samples: &[u8],
        #[case] alpha0: u8,
        #[case] alpha1: u8,
        #[case] mode: AlphaMode,
    ) {
        assert_eq!(
            fit_endpoints(samples.iter().copied()),
            AlphaEndpoints {
                alpha0,
                alpha1,
                mode
            }
        );
    }

    #[test]
    fn test_palette() {
        assert_eq!(palette(200, 50), [200, 50, 178, 157, 135, 114, 92, 71]);
        assert_eq!(palette(0, 255), [0, 255, 51, 102, 153, 204, 0, 255]);
        assert_eq!(palette(255, 0), [255, 0, 218, 182, 145, 109, 72, 36]);
    }

    #[test]
    fn test_transparent_indices() {
        let mut block = [0u8; 8];
        compress_bc3(&[[10, 20, 30, 0]; 16], 3, 0xffff, &mut block);
        // slot 1 holds zero, repeated sixteen times
        assert_eq!(block, [0xfe, 0x00, 0x49, 0x92, 0x24, 0x49, 0x92, 0x24]);
    }

    #[test]
    fn test_round_trip_picks_nearest() {
        let mut rgba = [[0u8; 4]; 16];
        for (i, pixel) in rgba.iter_mut().enumerate() {
            pixel[3] = (i * 0x11) as u8;
        }

        let mut block = [0u8; 8];
        compress_bc3(&rgba, 3, 0xffff, &mut block);
        let codes = palette(block[0], block[1]);

        let mut decoded = [[0u8; 4]; 16];
        decompress_bc3(&mut decoded, 3, &block);
        for (source, decoded) in rgba.iter().zip(decoded.iter()) {
            let error = |code: u8| (source[3] as i32 - code as i32).abs();
            let best = codes.iter().map(|&code| error(code)).min().unwrap();
            assert_eq!(error(decoded[3]), best);
        }
    }

    #[test]
    fn test_masked_pixels_keep_index_zero() {
        let mut rgba = [[0u8; 4]; 16];
        rgba[0][3] = 0x80;
        let mut block = [0u8; 8];
        compress_bc3(&rgba, 3, 0b1, &mut block);
        // a single value is widened downwards, which flips the palette to five steps
        assert_eq!(block, [0x7f, 0x80, 0x01, 0, 0, 0, 0, 0]);
    }
}
