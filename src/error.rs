use std::fmt::{Debug, Display, Formatter};

/// Broad classification of a [`QoiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The stream is not a QOI stream at all.
    Format,
    /// A chunk or the header needs more bytes than the buffer holds.
    Truncated,
    /// Header values or pixel buffers that violate the format's constraints.
    Validation,
    /// The chunk stream disagrees with the header. Only reported in strict mode.
    Corrupt,
}

/// Errors possible while encoding or decoding
#[derive(Clone, PartialEq, Eq)]
pub enum QoiError {
    /// The stream does not start with the `qoif` magic bytes
    WrongMagic([u8; 4]),
    /// The buffer ended early
    ///
    /// # Arguments
    /// - `needed`: bytes the current header or chunk requires
    /// - `remaining`: bytes actually left in the buffer
    Truncated { needed: usize, remaining: usize },
    /// Width or height is zero
    ZeroDimensions { width: u32, height: u32 },
    /// Channel count other than `3` or `4`
    UnknownChannels(u8),
    /// Colorspace code other than `0` or `1`
    UnknownColorspace(u8),
    /// The pixel buffer handed to the encoder doesn't match the header
    PixelCountMismatch { expected: usize, found: usize },
    /// A flat RGBA buffer whose length isn't `width * height * 4` bytes
    ByteCountMismatch { expected: usize, found: usize },
    /// Dimensions above the configured limits, or too large to address
    TooLarge { width: u32, height: u32 },
    /// A run chunk repeats more pixels than the image has left
    RunOverflow { run: usize, remaining: usize },
    /// The bytes after the last pixel are not the end marker
    MissingEndMarker { offset: usize },
}

impl QoiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QoiError::WrongMagic(_) => ErrorKind::Format,
            QoiError::Truncated { .. } => ErrorKind::Truncated,
            QoiError::ZeroDimensions { .. }
            | QoiError::UnknownChannels(_)
            | QoiError::UnknownColorspace(_)
            | QoiError::PixelCountMismatch { .. }
            | QoiError::ByteCountMismatch { .. }
            | QoiError::TooLarge { .. } => ErrorKind::Validation,
            QoiError::RunOverflow { .. } | QoiError::MissingEndMarker { .. } => {
                ErrorKind::Corrupt
            }
        }
    }
}

impl Debug for QoiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QoiError::WrongMagic(found) => {
                write!(f, "not a recognized image stream, expected `qoif` but found {found:?}")
            }
            QoiError::Truncated { needed, remaining } => {
                write!(
                    f,
                    "truncated stream, required {needed} bytes but only {remaining} remain"
                )
            }
            QoiError::ZeroDimensions { width, height } => {
                write!(f, "image dimensions must be positive, found {width}x{height}")
            }
            QoiError::UnknownChannels(channels) => {
                write!(f, "unknown channel count {channels}, expected either 3 or 4")
            }
            QoiError::UnknownColorspace(colorspace) => {
                write!(f, "unknown colorspace {colorspace}, expected either 0 or 1")
            }
            QoiError::PixelCountMismatch { expected, found } => {
                write!(f, "expected {expected} pixels but found {found}")
            }
            QoiError::ByteCountMismatch { expected, found } => {
                write!(f, "expected {expected} bytes of RGBA pixels but found {found}")
            }
            QoiError::TooLarge { width, height } => {
                write!(f, "image dimensions {width}x{height} exceed the allowed limits")
            }
            QoiError::RunOverflow { run, remaining } => {
                write!(
                    f,
                    "run of {run} pixels overflows the image, only {remaining} pixels remain"
                )
            }
            QoiError::MissingEndMarker { offset } => {
                write!(f, "end marker not found at offset {offset}")
            }
        }
    }
}

impl Display for QoiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for QoiError {}

impl From<QoiError> for std::io::Error {
    fn from(err: QoiError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    }
}
