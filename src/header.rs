use log::warn;

use crate::{QoiError, QOI_HEADER_SIZE, QOI_MAGIC};

/// Number of channels recorded in the header.
///
/// Informational only: pixels are always encoded and decoded as RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Rgb = 3,
    Rgba = 4,
}

impl TryFrom<u8> for Channels {
    type Error = QoiError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Channels::Rgb),
            4 => Ok(Channels::Rgba),
            _ => Err(QoiError::UnknownChannels(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colorspace {
    /// sRGB with linear alpha
    Srgb = 0,
    /// all channels linear
    Linear = 1,
}

impl TryFrom<u8> for Colorspace {
    type Error = QoiError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Colorspace::Srgb),
            1 => Ok(Colorspace::Linear),
            _ => Err(QoiError::UnknownColorspace(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    width: u32,  // image width in pixels (BE)
    height: u32, // image height in pixels (BE)
    channels: Channels,
    colorspace: Colorspace,
}

impl Header {
    /// Validates and builds a header from raw field values.
    pub fn new(width: u32, height: u32, channels: u8, colorspace: u8) -> Result<Self, QoiError> {
        if width == 0 || height == 0 {
            return Err(QoiError::ZeroDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            channels: Channels::try_from(channels)?,
            colorspace: Colorspace::try_from(colorspace)?,
        })
    }

    /// Header for a 4 channel sRGB image.
    pub fn rgba(width: u32, height: u32) -> Result<Self, QoiError> {
        Self::new(width, height, Channels::Rgba as u8, Colorspace::Srgb as u8)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn colorspace(&self) -> Colorspace {
        self.colorspace
    }

    /// Number of pixels the chunk stream must describe.
    ///
    /// Fails if `width * height` can't be addressed on this platform.
    pub fn pixel_count(&self) -> Result<usize, QoiError> {
        usize::try_from(u64::from(self.width) * u64::from(self.height)).map_err(|_| {
            QoiError::TooLarge {
                width: self.width,
                height: self.height,
            }
        })
    }

    pub fn to_bytes(&self) -> [u8; QOI_HEADER_SIZE] {
        let mut bytes = [0; QOI_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&QOI_MAGIC.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.width.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.height.to_be_bytes());
        bytes[12] = self.channels as u8;
        bytes[13] = self.colorspace as u8;
        bytes
    }

    /// Parses the header at the start of `data`.
    ///
    /// The magic is checked first, so a short buffer holding the wrong magic
    /// is reported as a format error rather than truncation. Unknown channel
    /// or colorspace bytes don't affect decoding, they are logged and read as
    /// `Rgba` / `Srgb`.
    pub fn parse(data: &[u8]) -> Result<Self, QoiError> {
        Self::parse_with(data, false)
    }

    /// Like [`Header::parse`], rejecting unknown channel or colorspace bytes
    /// when `strict` is set.
    pub(crate) fn parse_with(data: &[u8], strict: bool) -> Result<Self, QoiError> {
        let magic_len = data.len().min(4);
        if data[..magic_len] != QOI_MAGIC.to_le_bytes()[..magic_len] {
            let mut found = [0; 4];
            found[..magic_len].copy_from_slice(&data[..magic_len]);
            return Err(QoiError::WrongMagic(found));
        }
        if data.len() < QOI_HEADER_SIZE {
            return Err(QoiError::Truncated {
                needed: QOI_HEADER_SIZE,
                remaining: data.len(),
            });
        }

        let width = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        let height = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);
        if width == 0 || height == 0 {
            return Err(QoiError::ZeroDimensions { width, height });
        }

        let channels = Channels::try_from(data[12]).or_else(|err| {
            if strict {
                return Err(err);
            }
            warn!("{err}, decoding as RGBA");
            Ok(Channels::Rgba)
        })?;
        let colorspace = Colorspace::try_from(data[13]).or_else(|err| {
            if strict {
                return Err(err);
            }
            warn!("{err}, assuming sRGB");
            Ok(Colorspace::Srgb)
        })?;

        Ok(Self {
            width,
            height,
            channels,
            colorspace,
        })
    }
}
