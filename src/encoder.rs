use log::trace;

use crate::{
    Chunk, CodecState, Colour, ColourCache, Header, QOI_END_MARKER, QOI_HEADER_SIZE, QOI_MAX_RUN,
};

/// Quite Ok Image encoder
///
/// Pixels are pushed one at a time in row-major order, `finish` flushes any
/// pending run and appends the end marker.
///
/// ```
/// use qoif::{Colour, Encoder, Header};
///
/// let mut encoder = Encoder::new(Header::rgba(2, 1).unwrap());
/// encoder.push(Colour::new(0, 0, 0, 255));
/// encoder.push(Colour::new(1, 1, 1, 255));
/// let stream = encoder.finish();
/// assert_eq!(stream.len(), 14 + 2 + 8);
/// ```
pub struct Encoder {
    header: Header,
    state: CodecState,
    run: u8,
    out: Vec<u8>,
}

impl Encoder {
    pub fn new(header: Header) -> Self {
        // room for the header, the end marker and a modestly compressible image
        let capacity = header
            .pixel_count()
            .map_or(0, |count| count.min(1 << 20) * 2);
        let mut out = Vec::with_capacity(QOI_HEADER_SIZE + capacity + QOI_END_MARKER.len());
        out.extend_from_slice(&header.to_bytes());

        Self {
            header,
            state: CodecState::new(),
            run: 0,
            out,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn cache(&self) -> &ColourCache {
        &self.state.cache
    }

    pub fn push(&mut self, cur: Colour) {
        if cur == self.state.previous {
            self.run += 1;
            if self.run == QOI_MAX_RUN {
                self.flush_run();
            }
            return;
        }
        self.flush_run();

        let index = cur.hash();
        let chunk = if self.state.cache.lookup(index) == cur {
            Chunk::Index(index)
        } else {
            Chunk::delta(self.state.previous, cur)
        };
        self.emit(chunk);
        self.state.advance(cur);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.flush_run();
        self.out.extend_from_slice(&QOI_END_MARKER);
        self.out
    }

    /// Length of the run waiting to be written.
    pub(crate) fn pending_run(&self) -> u8 {
        self.run
    }

    fn flush_run(&mut self) {
        if self.run > 0 {
            self.emit(Chunk::Run(self.run));
            self.run = 0;
            // no-op unless the run repeats the initial colour
            let previous = self.state.previous;
            self.state.cache.store(previous);
        }
    }

    fn emit(&mut self, chunk: Chunk) {
        trace!("{chunk:?}");
        chunk.write(&mut self.out);
    }
}

#[cfg(test)]
mod tests {
    use super::Encoder;
    use crate::{encode, Chunk, Colour, Header, QOI_END_MARKER, QOI_HEADER_SIZE};

    fn chunks(stream: &[u8]) -> Vec<Chunk> {
        let mut data = &stream[QOI_HEADER_SIZE..stream.len() - QOI_END_MARKER.len()];
        let mut chunks = vec![];
        while !data.is_empty() {
            let (chunk, len) = Chunk::read(data).unwrap();
            chunks.push(chunk);
            data = &data[len..];
        }
        chunks
    }

    #[test]
    fn single_white_pixel() {
        let header = Header::rgba(1, 1).unwrap();
        let stream = encode(&header, &[Colour::new(255, 255, 255, 255)]).unwrap();

        assert_eq!(&stream[..QOI_HEADER_SIZE], b"qoif\0\0\0\x01\0\0\0\x01\x04\0");
        // (-1, -1, -1) from the initial pixel once wrapped
        assert_eq!(&stream[QOI_HEADER_SIZE..], &[0x55, 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn run_of_four() {
        let header = Header::rgba(4, 1).unwrap();
        let colour = Colour::new(10, 20, 30, 255);
        let stream = encode(&header, &[colour; 4]).unwrap();

        assert_eq!(
            chunks(&stream),
            [Chunk::Rgb { r: 10, g: 20, b: 30 }, Chunk::Run(3)]
        );
    }

    #[test]
    fn run_of_four_from_start() {
        let header = Header::rgba(4, 1).unwrap();
        let stream = encode(&header, &[Colour::INIT; 4]).unwrap();
        assert_eq!(chunks(&stream), [Chunk::Run(4)]);
    }

    #[test]
    fn runs_are_capped() {
        let header = Header::rgba(200, 1).unwrap();
        let stream = encode(&header, &[Colour::INIT; 200]).unwrap();

        let runs = chunks(&stream);
        assert_eq!(
            runs,
            [Chunk::Run(62), Chunk::Run(62), Chunk::Run(62), Chunk::Run(14)]
        );
    }

    #[test]
    fn diff_after_run() {
        let header = Header::rgba(2, 1).unwrap();
        let stream = encode(&header, &[Colour::INIT, Colour::new(1, 1, 1, 255)]).unwrap();
        assert_eq!(
            chunks(&stream),
            [Chunk::Run(1), Chunk::Diff { dr: 1, dg: 1, db: 1 }]
        );
    }

    #[test]
    fn alpha_change_needs_rgba() {
        let header = Header::rgba(2, 1).unwrap();
        let from = Colour::new(5, 5, 5, 255);
        let to = Colour::new(5, 5, 5, 0);
        let stream = encode(&header, &[from, to]).unwrap();
        assert_eq!(chunks(&stream)[1], Chunk::Rgba(to));
    }

    #[test]
    fn index_beats_diff() {
        let a = Colour::new(100, 100, 100, 255);
        let b = Colour::new(101, 100, 100, 255);
        let header = Header::rgba(3, 1).unwrap();
        let stream = encode(&header, &[a, b, a]).unwrap();

        // `a` is one step of red away from `b`, but cached
        assert_eq!(
            chunks(&stream),
            [
                Chunk::Rgb {
                    r: 100,
                    g: 100,
                    b: 100
                },
                Chunk::Diff { dr: 1, dg: 0, db: 0 },
                Chunk::Index(a.hash()),
            ]
        );
    }

    #[test]
    fn colliding_colours_replace_each_other() {
        let first = Colour::new(10, 0, 0, 255);
        let second = Colour::new(74, 0, 0, 255);
        assert_eq!(first.hash(), second.hash());

        let header = Header::rgba(3, 1).unwrap();
        let stream = encode(&header, &[first, second, first]).unwrap();
        assert!(chunks(&stream)
            .iter()
            .all(|chunk| matches!(chunk, Chunk::Rgb { .. })));
    }

    #[test]
    fn distinct_pixels_never_index() {
        // 65 distinct colours, two of which share a cache slot
        let mut pixels: Vec<Colour> = (0..64_u8)
            .map(|i| Colour::new(i * 4, 255 - i, i / 2, 200))
            .collect();
        let twin = (0..=255)
            .map(|r| Colour::new(r, pixels[0].g, pixels[0].b, pixels[0].a))
            .find(|c| *c != pixels[0] && c.hash() == pixels[0].hash() && !pixels.contains(c))
            .unwrap();
        pixels.push(twin);

        let header = Header::rgba(65, 1).unwrap();
        let stream = encode(&header, &pixels).unwrap();
        let chunks = chunks(&stream);
        assert_eq!(chunks.len(), 65);
        assert!(!chunks.iter().any(|c| matches!(c, Chunk::Index(_))));
    }

    #[test]
    fn cache_tracks_emitted_pixels() {
        let mut encoder = Encoder::new(Header::rgba(3, 1).unwrap());
        let colour = Colour::new(3, 4, 5, 6);
        encoder.push(colour);
        assert_eq!(encoder.cache().lookup(colour.hash()), colour);

        encoder.push(Colour::INIT);
        encoder.push(Colour::INIT);
        assert_eq!(encoder.cache().lookup(Colour::INIT.hash()), Colour::INIT);
    }
}
