use thiserror::Error;

/// Broad classification of an [`Error`].
///
/// Neither kind is transient: every operation in this crate is a pure function of its
/// inputs, so retrying with the same arguments always fails the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The surface or hardware profile asks for something this crate does not implement.
    Configuration,

    /// The caller handed in a buffer that does not match the surface it describes.
    Precondition,
}

/// Errors returned by the tiling engine and the BC3 codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Tile mode outside the address library's `0..=16` range.
    #[error("Unsupported tile mode: {0}")]
    UnsupportedTileMode(u32),

    /// Surface format with no entry in the bits-per-element table, or one the codec
    /// does not handle.
    #[error("Unsupported surface format: {0:#x}")]
    UnsupportedFormat(u32),

    /// Element size the address engine cannot work with.
    #[error("Unsupported bits per element: {0}")]
    UnsupportedBitsPerPixel(u32),

    /// Hardware profile constants that do not describe a supported memory layout.
    #[error("Invalid hardware profile: {0}")]
    InvalidProfile(&'static str),

    /// Surface description that cannot be addressed.
    #[error("Invalid surface: {0}")]
    InvalidSurface(&'static str),

    /// Input or output buffer is smaller than the surface requires.
    #[error("Buffer too small: needed {needed}, got {actual}")]
    BufferTooSmall {
        /// The required buffer size.
        needed: usize,
        /// The actual buffer size provided.
        actual: usize,
    },

    /// A computed tiled address lies past the end of the supplied buffer.
    #[error("Tiled address {offset:#x} is out of range for a buffer of {len} bytes")]
    AddressOutOfRange {
        /// Byte offset of the element that did not fit.
        offset: u64,
        /// Length of the tiled buffer.
        len: usize,
    },
}

impl Error {
    /// Returns whether this is a configuration error or a caller precondition violation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedTileMode(_)
            | Error::UnsupportedFormat(_)
            | Error::UnsupportedBitsPerPixel(_)
            | Error::InvalidProfile(_)
            | Error::InvalidSurface(_) => ErrorKind::Configuration,
            Error::BufferTooSmall { .. } | Error::AddressOutOfRange { .. } => {
                ErrorKind::Precondition
            }
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
