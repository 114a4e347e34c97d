use crate::{Error, Result};

/// Largest interleave, row, swap or split size accepted by [`HardwareProfile::new`].
pub const MAX_PROFILE_SIZE: u32 = 1 << 16;

/// Memory interleaving constants of the GPU a surface is tiled for.
///
/// The address engine reads every hardware-dependent quantity from here, so surfaces
/// for different targets can be handled side by side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HardwareProfile {
    pipes: u32,
    banks: u32,
    pipe_interleave_bytes: u32,
    row_size: u32,
    swap_size: u32,
    split_size: u32,
}

impl HardwareProfile {
    /// The Wii U GPU: 2 pipes, 4 banks, 256 byte pipe interleave.
    pub const GX2: HardwareProfile = HardwareProfile {
        pipes: 2,
        banks: 4,
        pipe_interleave_bytes: 256,
        row_size: 2048,
        swap_size: 256,
        split_size: 2048,
    };

    /// Creates a profile after checking that the constants describe a layout the address
    /// engine supports.
    ///
    /// * `pipes`                 - Number of memory pipes (1 or 2)
    /// * `banks`                 - Number of memory banks (4 or 8)
    /// * `pipe_interleave_bytes` - Bytes per pipe before switching to the next one
    /// * `row_size`              - DRAM row size in bytes
    /// * `swap_size`             - Bank swap size in bytes
    /// * `split_size`            - Tile split size in bytes
    ///
    /// The four sizes must be powers of two no larger than [`MAX_PROFILE_SIZE`].
    pub fn new(
        pipes: u32,
        banks: u32,
        pipe_interleave_bytes: u32,
        row_size: u32,
        swap_size: u32,
        split_size: u32,
    ) -> Result<Self> {
        // the pipe selection is only defined for up to two pipes
        if !matches!(pipes, 1 | 2) {
            return Err(Error::InvalidProfile("pipe count must be 1 or 2"));
        }
        if !matches!(banks, 4 | 8) {
            return Err(Error::InvalidProfile("bank count must be 4 or 8"));
        }
        for size in [pipe_interleave_bytes, row_size, swap_size, split_size] {
            if !size.is_power_of_two() || size > MAX_PROFILE_SIZE {
                return Err(Error::InvalidProfile(
                    "interleave, row, swap and split sizes must be powers of two up to 64 KiB",
                ));
            }
        }

        Ok(HardwareProfile {
            pipes,
            banks,
            pipe_interleave_bytes,
            row_size,
            swap_size,
            split_size,
        })
    }

    pub fn pipes(&self) -> u32 {
        self.pipes
    }

    pub fn banks(&self) -> u32 {
        self.banks
    }

    pub fn pipe_interleave_bytes(&self) -> u32 {
        self.pipe_interleave_bytes
    }

    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    pub fn swap_size(&self) -> u32 {
        self.swap_size
    }

    pub fn split_size(&self) -> u32 {
        self.split_size
    }

    pub(crate) fn pipe_bits(&self) -> u32 {
        self.pipes.trailing_zeros()
    }

    pub(crate) fn bank_bits(&self) -> u32 {
        self.banks.trailing_zeros()
    }

    pub(crate) fn group_bits(&self) -> u32 {
        self.pipe_interleave_bytes.trailing_zeros()
    }
}

impl Default for HardwareProfile {
    fn default() -> Self {
        HardwareProfile::GX2
    }
}
