//! The 8 byte colour half of a BC3 block: two RGB565 endpoints followed by sixteen
//! 2-bit palette indices.

/// Packs an 8 bit per channel colour into RGB565 by truncation.
pub fn pack_565(colour: [u8; 3]) -> u16 {
    let r = (colour[0] >> 3) as u16;
    let g = (colour[1] >> 2) as u16;
    let b = (colour[2] >> 3) as u16;
    (r << 11) | (g << 5) | b
}

/// Expands an RGB565 colour to 8 bits per channel, replicating the high bits into the
/// low ones.
pub fn unpack_565(packed: u16) -> [u8; 3] {
    let r = ((packed >> 11) & 0x1f) as u8;
    let g = ((packed >> 5) & 0x3f) as u8;
    let b = (packed & 0x1f) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

/// Builds the four colour palette: both endpoints, then the points one and two thirds of
/// the way from `colour0` to `colour1`.
pub fn palette(colour0: u16, colour1: u16) -> [[u8; 3]; 4] {
    let a = unpack_565(colour0);
    let b = unpack_565(colour1);

    let mut codes = [a, b, [0; 3], [0; 3]];
    for i in 0..3 {
        let (a, b) = (a[i] as u16, b[i] as u16);
        codes[2][i] = ((2 * a + b) / 3) as u8;
        codes[3][i] = ((a + 2 * b) / 3) as u8;
    }
    codes
}

/// Finds the palette entry closest to `colour` under a per-channel weighted absolute
/// difference. Ties go to the lower index.
fn nearest_index(colour: [u8; 3], codes: &[[u8; 3]; 4], weights: [u32; 3]) -> u32 {
    let mut best_index = 0;
    let mut best_distance = u32::MAX;

    for (index, code) in codes.iter().enumerate() {
        if *code == colour {
            return index as u32;
        }

        let distance: u32 = (0..3)
            .map(|c| (colour[c] as i32 - code[c] as i32).unsigned_abs() * weights[c])
            .sum();
        if distance < best_distance {
            best_distance = distance;
            best_index = index as u32;
        }
    }

    best_index
}

fn write_colour_block(colour0: u16, colour1: u16, indices: u32, block: &mut [u8]) {
    block[0..2].copy_from_slice(&colour0.to_le_bytes());
    block[2..4].copy_from_slice(&colour1.to_le_bytes());
    block[4..8].copy_from_slice(&indices.to_le_bytes());
}

/// Compresses the colour of a 4x4 block.
///
/// The endpoints span the bounding box of all enabled pixels with non-zero alpha. A block
/// without any such pixel is written as a fixed transparent pattern.
///
/// * `rgba`   - The block of pixels
/// * `mask`   - The valid pixel mask
/// * `output` - Storage for the 8 byte colour block
pub fn compress(rgba: &[[u8; 4]; 16], mask: u32, output: &mut [u8]) {
    let enabled = |i: usize| (mask >> i) & 1 != 0;

    let mut min = [255u8; 3];
    let mut max = [0u8; 3];
    let mut transparent = true;
    for pixel in (0..16).filter(|&i| enabled(i) && rgba[i][3] != 0).map(|i| rgba[i]) {
        transparent = false;
        for c in 0..3 {
            min[c] = min[c].min(pixel[c]);
            max[c] = max[c].max(pixel[c]);
        }
    }

    if transparent {
        // endpoints of a black box, bumped apart
        write_colour_block(1, 0, u32::MAX, output);
        return;
    }

    let mut colour0 = pack_565(max);
    let colour1 = pack_565(min);
    if colour0 == colour1 {
        colour0 = colour0.wrapping_add(1);
    }

    let codes = palette(colour0, colour1);
    let weights = [
        256 - (max[0] - min[0]) as u32,
        256 - (max[1] - min[1]) as u32,
        256 - (max[2] - min[2]) as u32,
    ];

    let mut indices = 0u32;
    for i in (0..16).filter(|&i| enabled(i)) {
        let [r, g, b, _] = rgba[i];
        indices |= nearest_index([r, g, b], &codes, weights) << (2 * i);
    }

    write_colour_block(colour0, colour1, indices, output);
}

/// Decompresses the colour of a 4x4 block. Alpha is left at 255.
///
/// * `bytes` - The 8 byte colour block
pub fn decompress(bytes: &[u8]) -> [[u8; 4]; 16] {
    let colour0 = u16::from_le_bytes([bytes[0], bytes[1]]);
    let colour1 = u16::from_le_bytes([bytes[2], bytes[3]]);
    let indices = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let codes = palette(colour0, colour1);

    let mut rgba = [[0u8; 4]; 16];
    for (i, pixel) in rgba.iter_mut().enumerate() {
        let [r, g, b] = codes[((indices >> (2 * i)) & 3) as usize];
        *pixel = [r, g, b, 255];
    }
    rgba
}
