use log::{debug, trace, warn};

use crate::{
    Chunk, CodecState, Colour, ColourCache, DecoderOptions, Header, QoiError, QOI_END_MARKER,
    QOI_HEADER_SIZE,
};

/// Quite Ok Image decoder
///
/// The header is parsed by [`Decoder::new`], pixels are then produced one at
/// a time by [`Decoder::next_pixel`] or all at once by [`Decoder::decode`].
/// Decoding stops after exactly `width * height` pixels.
///
/// ```
/// use qoif::{Colour, Decoder};
///
/// let stream = qoif::encode_rgba(&[1, 2, 3, 255], 1, 1).unwrap();
/// let decoder = Decoder::new(stream.as_slice()).unwrap();
/// assert_eq!(decoder.header().width(), 1);
/// assert_eq!(decoder.decode().unwrap(), [Colour::new(1, 2, 3, 255)]);
/// ```
pub struct Decoder<B> {
    data: B,
    pos: usize,
    header: Header,
    options: DecoderOptions,
    state: CodecState,
    remaining: usize,
    run: usize,
    /// Chunks never extend past this offset, the end marker sits behind it
    chunks_end: usize,
}

impl<B: AsRef<[u8]>> Decoder<B> {
    pub fn new(data: B) -> Result<Self, QoiError> {
        Self::with_options(data, DecoderOptions::default())
    }

    pub fn with_options(data: B, options: DecoderOptions) -> Result<Self, QoiError> {
        let bytes = data.as_ref();
        let header = Header::parse_with(bytes, options.strict_mode())?;

        if header.width() > options.max_width() || header.height() > options.max_height() {
            return Err(QoiError::TooLarge {
                width: header.width(),
                height: header.height(),
            });
        }
        let remaining = header.pixel_count()?;

        debug!("Image width: {}", header.width());
        debug!("Image height: {}", header.height());
        debug!("Image channels: {:?}", header.channels());
        debug!("Image colorspace: {:?}", header.colorspace());

        let chunks_end = if bytes.ends_with(&QOI_END_MARKER) {
            (bytes.len() - QOI_END_MARKER.len()).max(QOI_HEADER_SIZE)
        } else {
            bytes.len()
        };

        Ok(Self {
            data,
            pos: QOI_HEADER_SIZE,
            header,
            options,
            state: CodecState::new(),
            remaining,
            run: 0,
            chunks_end,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn cache(&self) -> &ColourCache {
        &self.state.cache
    }

    /// Pixels still to be produced.
    pub fn remaining_pixels(&self) -> usize {
        self.remaining
    }

    /// Produces the next pixel, or `None` once the image is complete.
    pub fn next_pixel(&mut self) -> Result<Option<Colour>, QoiError> {
        if self.remaining == 0 {
            return Ok(None);
        }

        if self.run == 0 {
            let (chunk, len) = Chunk::read(&self.data.as_ref()[self.pos..self.chunks_end])?;
            trace!("{chunk:?}");
            self.pos += len;

            match chunk {
                Chunk::Run(run) => self.run = self.clamp_run(usize::from(run))?,
                chunk => {
                    let cache = &self.state.cache;
                    let pixel = chunk.pixel(self.state.previous, |index| cache.lookup(index));
                    return Ok(Some(self.produce(pixel)));
                }
            }
        }

        self.run -= 1;
        Ok(Some(self.produce(self.state.previous)))
    }

    /// Checks that exactly the end marker follows the last chunk.
    ///
    /// Only meaningful once every pixel has been produced.
    pub fn check_end_marker(&self) -> Result<(), QoiError> {
        let rest = &self.data.as_ref()[self.pos..];
        if rest == QOI_END_MARKER {
            return Ok(());
        }
        if self.options.strict_mode() {
            return Err(QoiError::MissingEndMarker { offset: self.pos });
        }
        warn!(
            "Expected end marker at offset {}, found {} trailing bytes instead",
            self.pos,
            rest.len()
        );
        Ok(())
    }

    /// Decodes every remaining pixel and verifies the end marker.
    pub fn decode(mut self) -> Result<Vec<Colour>, QoiError> {
        let mut pixels = Vec::with_capacity(self.remaining);
        while let Some(pixel) = self.next_pixel()? {
            pixels.push(pixel);
        }
        self.check_end_marker()?;
        Ok(pixels)
    }

    fn clamp_run(&self, run: usize) -> Result<usize, QoiError> {
        if run <= self.remaining {
            return Ok(run);
        }
        if self.options.strict_mode() {
            return Err(QoiError::RunOverflow {
                run,
                remaining: self.remaining,
            });
        }
        warn!(
            "Run of {run} pixels overflows the image, truncating to {}",
            self.remaining
        );
        Ok(self.remaining)
    }

    fn produce(&mut self, pixel: Colour) -> Colour {
        self.state.advance(pixel);
        self.remaining -= 1;
        pixel
    }
}
