use crate::{alpha, colourblock, private, Decoder, Encoder};

/// BC3 (DXT5): an interpolated alpha block followed by a four colour block.
pub struct BC3 {}

impl private::Format for BC3 {
    fn block_size() -> usize {
        16
    }
}

impl private::Decoder for BC3 {
    fn decompress_block(block: &[u8]) -> [[u8; 4]; 16] {
        // decompress colour block
        let mut rgba = colourblock::decompress(&block[8..16]);
        // decompress alpha block
        alpha::decompress_bc3(&mut rgba, 3, &block[..8]);
        rgba
    }
}

impl Decoder for BC3 {}

impl private::Encoder for BC3 {
    fn compress_block_masked(rgba: [[u8; 4]; 16], mask: u32, output: &mut [u8]) {
        colourblock::compress(&rgba, mask, &mut output[8..16]);
        alpha::compress_bc3(&rgba, 3, mask, &mut output[..8]);
    }
}

impl Encoder for BC3 {}

impl BC3 {
    /// Compresses a single 4x4 block of an image.
    ///
    /// Pixels of the block that fall outside the image are ignored.
    ///
    /// * `texels`  - The block of pixels, row by row
    /// * `width`   - The width of the image the block belongs to
    /// * `height`  - The height of the image the block belongs to
    /// * `block_x` - Column of the block within the image
    /// * `block_y` - Row of the block within the image
    pub fn encode_block(
        texels: &[[u8; 4]; 16],
        width: usize,
        height: usize,
        block_x: usize,
        block_y: usize,
    ) -> [u8; 16] {
        let mut mask = 0u32;
        for py in 0..4 {
            for px in 0..4 {
                if 4 * block_x + px < width && 4 * block_y + py < height {
                    mask |= 1 << (4 * py + px);
                }
            }
        }

        let mut output = [0u8; 16];
        <BC3 as private::Encoder>::compress_block_masked(*texels, mask, &mut output);
        output
    }

    /// Decompresses a single block into 16 pixels, row by row.
    pub fn decode_block(block: &[u8; 16]) -> [[u8; 4]; 16] {
        <BC3 as private::Decoder>::decompress_block(block)
    }
}
