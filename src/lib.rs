//! Encoder and decoder for the Quite Ok Image format.
//!
//! Pixels are always handled as 8 bit RGBA. The header's channel count and
//! colorspace are carried through untouched.

mod chunk;
mod container;
mod decoder;
mod encoder;
mod error;
mod header;
mod options;
mod reader;

pub use {
    chunk::Chunk,
    container::{decode_image, encode_image, QoiDecoder},
    decoder::Decoder,
    encoder::Encoder,
    error::{ErrorKind, QoiError},
    header::{Channels, Colorspace, Header},
    options::DecoderOptions,
    reader::QoiReader,
};

/// `qoif` read as a little endian u32
pub const QOI_MAGIC: u32 = 0x6669_6F71;
pub const QOI_HEADER_SIZE: usize = 14;
pub const QOI_END_MARKER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];
/// Longest run a single chunk can hold
pub const QOI_MAX_RUN: u8 = 62;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    /// Contents of a cache slot that has never been written.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);
    /// The "previous pixel" at the start of every stream.
    pub const INIT: Self = Self::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Cache slot for this colour, always below 64.
    pub fn hash(self) -> u8 {
        let Self { r, g, b, a } = self;
        ((usize::from(r) * 3 + usize::from(g) * 5 + usize::from(b) * 7 + usize::from(a) * 11)
            % 64) as u8
    }

    pub fn bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        let [r, g, b, a] = bytes;
        Self { r, g, b, a }
    }
}

/// 64 slot direct mapped table of recently seen colours.
///
/// A colour always lands in `slot[colour.hash()]`, replacing whatever was
/// there, so an encoder and decoder fed the same pixels hold the same table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ColourCache {
    slots: [Colour; 64],
}

impl Default for ColourCache {
    fn default() -> Self {
        Self {
            slots: [Colour::ZERO; 64],
        }
    }
}

impl ColourCache {
    pub fn lookup(&self, index: u8) -> Colour {
        self.slots[usize::from(index & 0b0011_1111)]
    }

    pub fn store(&mut self, colour: Colour) {
        self.slots[usize::from(colour.hash())] = colour;
    }
}

/// Running state shared by both sides of the codec.
#[derive(Debug, Clone)]
pub(crate) struct CodecState {
    pub(crate) cache: ColourCache,
    pub(crate) previous: Colour,
}

impl CodecState {
    pub(crate) fn new() -> Self {
        Self {
            cache: ColourCache::default(),
            previous: Colour::INIT,
        }
    }

    pub(crate) fn advance(&mut self, pixel: Colour) {
        self.cache.store(pixel);
        self.previous = pixel;
    }
}

/// Encodes `pixels`, laid out row-major, as a complete QOI stream.
pub fn encode(header: &Header, pixels: &[Colour]) -> Result<Vec<u8>, QoiError> {
    let expected = header.pixel_count()?;
    if pixels.len() != expected {
        return Err(QoiError::PixelCountMismatch {
            expected,
            found: pixels.len(),
        });
    }

    let mut encoder = Encoder::new(*header);
    for &pixel in pixels {
        encoder.push(pixel);
    }
    Ok(encoder.finish())
}

/// Decodes a complete QOI stream with the default options.
pub fn decode(data: &[u8]) -> Result<(Header, Vec<Colour>), QoiError> {
    let decoder = Decoder::new(data)?;
    let header = *decoder.header();
    Ok((header, decoder.decode()?))
}

/// Encodes a flat `R, G, B, A` byte buffer of `width * height` pixels.
pub fn encode_rgba(bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, QoiError> {
    let header = Header::rgba(width, height)?;
    let expected = header.pixel_count()?.saturating_mul(4);
    if bytes.len() != expected {
        return Err(QoiError::ByteCountMismatch {
            expected,
            found: bytes.len(),
        });
    }

    let mut encoder = Encoder::new(header);
    for px in bytes.chunks_exact(4) {
        encoder.push(Colour::new(px[0], px[1], px[2], px[3]));
    }
    Ok(encoder.finish())
}

/// Decodes a QOI stream into a flat `R, G, B, A` byte buffer.
pub fn decode_rgba(data: &[u8]) -> Result<(Header, Vec<u8>), QoiError> {
    let (header, pixels) = decode(data)?;
    Ok((header, pixels.into_iter().flat_map(Colour::bytes).collect()))
}
