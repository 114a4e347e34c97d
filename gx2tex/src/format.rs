use crate::{Error, Result};

/// Hardware format code of BC3 (DXT5).
pub const FORMAT_BC3: u32 = 0x33;

/// Bits per element for each GX2 hardware format, indexed by `format & 0x3F`.
/// Block compressed formats list the size of a whole 4x4 block.
pub static BITS_PER_ELEMENT: [u8; 64] = [
    0, 8, 8, 0, 0, 16, 16, 16, // 0x00
    16, 16, 16, 16, 16, 32, 32, 32, // 0x08
    32, 32, 0, 32, 0, 0, 32, 0, // 0x10
    0, 32, 32, 32, 64, 64, 64, 64, // 0x18
    64, 0, 128, 128, 0, 0, 0, 16, // 0x20
    16, 32, 32, 32, 0, 0, 0, 96, // 0x28
    96, 64, 128, 128, 64, 128, 0, 0, // 0x30
    0, 0, 0, 0, 0, 0, 0, 0, // 0x38
];

fn hardware_format(format: u32) -> u32 {
    format & 0x3F
}

/// Looks up the element size of a surface format.
pub fn bits_per_element(format: u32) -> Result<u32> {
    match BITS_PER_ELEMENT[hardware_format(format) as usize] {
        0 => Err(Error::UnsupportedFormat(format)),
        bits => Ok(bits as u32),
    }
}

/// Returns true for BC1 to BC5, whose elements are 4x4 pixel blocks.
pub fn is_block_compressed(format: u32) -> bool {
    (0x31..=0x35).contains(&hardware_format(format))
}

/// Returns true for BC3, in both its UNORM and sRGB variants.
pub fn is_bc3(format: u32) -> bool {
    hardware_format(format) == FORMAT_BC3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_compressed_sizes() {
        // BC1, BC2, BC3, BC4, BC5
        assert_eq!(bits_per_element(0x31), Ok(64));
        assert_eq!(bits_per_element(0x32), Ok(128));
        assert_eq!(bits_per_element(0x33), Ok(128));
        assert_eq!(bits_per_element(0x34), Ok(64));
        assert_eq!(bits_per_element(0x35), Ok(128));
        // sRGB and signed variants share the hardware format
        assert_eq!(bits_per_element(0x433), Ok(128));
        assert_eq!(bits_per_element(0x234), Ok(64));
    }

    #[test]
    fn test_uncompressed_sizes() {
        assert_eq!(bits_per_element(0x01), Ok(8));
        assert_eq!(bits_per_element(0x1a), Ok(32));
        assert_eq!(bits_per_element(0x1f), Ok(64));
        assert_eq!(bits_per_element(0x22), Ok(128));
        assert_eq!(bits_per_element(0x00), Err(Error::UnsupportedFormat(0)));
        assert_eq!(bits_per_element(0x3f), Err(Error::UnsupportedFormat(0x3f)));
    }

    #[test]
    fn test_classification() {
        assert!(is_block_compressed(0x431));
        assert!(!is_block_compressed(0x1a));
        assert!(is_bc3(0x433));
        assert!(!is_bc3(0x32));
    }
}
