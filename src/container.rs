use std::io::Read;

use image::{
    error::{DecodingError, EncodingError, ImageFormatHint},
    DynamicImage, ImageDecoder, ImageError, ImageResult, RgbaImage,
};

use crate::{encode_rgba, Decoder, DecoderOptions, QoiError, QoiReader};

fn format_hint() -> ImageFormatHint {
    ImageFormatHint::Name("QOI".to_string())
}

impl From<QoiError> for ImageError {
    fn from(err: QoiError) -> Self {
        ImageError::Decoding(DecodingError::new(format_hint(), err))
    }
}

/// Adapts [`Decoder`] to the `image` crate, so QOI streams can be loaded
/// with `DynamicImage::from_decoder`.
///
/// Output is always `Rgba8`.
pub struct QoiDecoder {
    decoder: Decoder<Vec<u8>>,
}

impl QoiDecoder {
    pub fn new<R: Read>(read: R) -> ImageResult<Self> {
        Self::with_options(read, DecoderOptions::default())
    }

    pub fn with_options<R: Read>(mut read: R, options: DecoderOptions) -> ImageResult<Self> {
        let mut data = Vec::new();
        read.read_to_end(&mut data)?;
        let decoder = Decoder::with_options(data, options)?;
        Ok(Self { decoder })
    }
}

impl<'a> ImageDecoder<'a> for QoiDecoder {
    type Reader = QoiReader<Vec<u8>>;

    fn dimensions(&self) -> (u32, u32) {
        let header = self.decoder.header();
        (header.width(), header.height())
    }

    fn color_type(&self) -> image::ColorType {
        image::ColorType::Rgba8
    }

    fn into_reader(self) -> ImageResult<Self::Reader> {
        Ok(QoiReader::new(self.decoder))
    }
}

/// Encodes any image as a 4 channel QOI stream.
pub fn encode_image(image: &DynamicImage) -> ImageResult<Vec<u8>> {
    let rgba = image.to_rgba8();
    encode_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .map_err(|err| ImageError::Encoding(EncodingError::new(format_hint(), err)))
}

/// Decodes a QOI stream into an `image` buffer ready to be displayed or saved.
pub fn decode_image(data: &[u8]) -> ImageResult<RgbaImage> {
    let decoder = QoiDecoder::new(data)?;
    Ok(DynamicImage::from_decoder(decoder)?.into_rgba8())
}
