use crate::{Error, HardwareProfile};

/// Address library tile modes.
///
/// The numbering follows the hardware; GX2 headers store the same values except that
/// their "linear special" mode is 16.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TileMode {
    LinearGeneral = 0,
    LinearAligned = 1,
    Tiled1DThin1 = 2,
    Tiled1DThick = 3,
    Tiled2DThin1 = 4,
    Tiled2DThin2 = 5,
    Tiled2DThin4 = 6,
    Tiled2DThick = 7,
    Tiled2BThin1 = 8,
    Tiled2BThin2 = 9,
    Tiled2BThin4 = 10,
    Tiled2BThick = 11,
    Tiled3DThin1 = 12,
    Tiled3DThick = 13,
    Tiled3BThin1 = 14,
    Tiled3BThick = 15,
    LinearSpecial = 16,
}

/// Which family of address computation a tile mode belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TilingClass {
    Linear,
    Micro,
    Macro,
}

impl TileMode {
    pub fn class(self) -> TilingClass {
        match self {
            TileMode::LinearGeneral | TileMode::LinearAligned | TileMode::LinearSpecial => {
                TilingClass::Linear
            }
            TileMode::Tiled1DThin1 | TileMode::Tiled1DThick => TilingClass::Micro,
            _ => TilingClass::Macro,
        }
    }

    /// Number of slices sharing one micro tile.
    pub fn thickness(self) -> u32 {
        match self {
            TileMode::Tiled1DThick
            | TileMode::Tiled2DThick
            | TileMode::Tiled2BThick
            | TileMode::Tiled3DThick
            | TileMode::Tiled3BThick => 4,
            _ => 1,
        }
    }

    pub fn is_thick_macro_tiled(self) -> bool {
        matches!(
            self,
            TileMode::Tiled2DThick
                | TileMode::Tiled2BThick
                | TileMode::Tiled3DThick
                | TileMode::Tiled3BThick
        )
    }

    pub fn is_bank_swapped(self) -> bool {
        matches!(
            self,
            TileMode::Tiled2BThin1
                | TileMode::Tiled2BThin2
                | TileMode::Tiled2BThin4
                | TileMode::Tiled2BThick
                | TileMode::Tiled3BThin1
                | TileMode::Tiled3BThick
        )
    }

    /// Height to width ratio of a macro tile.
    pub fn macro_tile_aspect_ratio(self) -> u32 {
        match self {
            TileMode::Tiled2DThin2 | TileMode::Tiled2BThin2 => 2,
            TileMode::Tiled2DThin4 | TileMode::Tiled2BThin4 => 4,
            _ => 1,
        }
    }

    /// Pipe/bank rotation applied per slice.
    pub fn rotation(self, profile: &HardwareProfile) -> u32 {
        match self as u32 {
            4..=11 => profile.pipes() * ((profile.banks() >> 1) - 1),
            12..=15 => {
                if profile.pipes() >= 4 {
                    (profile.pipes() >> 1) - 1
                } else {
                    1
                }
            }
            _ => 0,
        }
    }
}

impl TryFrom<u32> for TileMode {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        const MODES: [TileMode; 17] = [
            TileMode::LinearGeneral,
            TileMode::LinearAligned,
            TileMode::Tiled1DThin1,
            TileMode::Tiled1DThick,
            TileMode::Tiled2DThin1,
            TileMode::Tiled2DThin2,
            TileMode::Tiled2DThin4,
            TileMode::Tiled2DThick,
            TileMode::Tiled2BThin1,
            TileMode::Tiled2BThin2,
            TileMode::Tiled2BThin4,
            TileMode::Tiled2BThick,
            TileMode::Tiled3DThin1,
            TileMode::Tiled3DThick,
            TileMode::Tiled3BThin1,
            TileMode::Tiled3BThick,
            TileMode::LinearSpecial,
        ];

        MODES
            .get(value as usize)
            .copied()
            .ok_or(Error::UnsupportedTileMode(value))
    }
}

impl From<TileMode> for u32 {
    fn from(mode: TileMode) -> u32 {
        mode as u32
    }
}
