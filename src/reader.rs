use std::io::Read;

use crate::{Decoder, Header};

/// Streams decoded pixels as flat `R, G, B, A` bytes.
pub struct QoiReader<B> {
    decoder: Decoder<B>,
    remain: QoiRemaining,
    finished: bool,
}

impl<B: AsRef<[u8]>> QoiReader<B> {
    pub fn new(decoder: Decoder<B>) -> Self {
        Self {
            decoder,
            remain: QoiRemaining {
                bytes: [0; 4],
                count: 0,
            },
            finished: false,
        }
    }

    pub fn header(&self) -> &Header {
        self.decoder.header()
    }
}

/// we don't always have the liberty of writing a whole pixel since
/// the buffer may be full, so this holds what's left of the last one
struct QoiRemaining {
    bytes: [u8; 4],
    count: usize,
}

impl Read for QoiRemaining {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.count);
        let start = self.bytes.len() - self.count;
        buf[..n].copy_from_slice(&self.bytes[start..start + n]);
        self.count -= n;
        Ok(n)
    }
}

impl<B: AsRef<[u8]>> Read for QoiReader<B> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut written = 0;

        while written < buf.len() {
            if self.remain.count == 0 {
                match self.decoder.next_pixel()? {
                    Some(pixel) => {
                        self.remain = QoiRemaining {
                            bytes: pixel.bytes(),
                            count: 4,
                        }
                    }
                    None => {
                        if !self.finished {
                            self.finished = true;
                            self.decoder.check_end_marker()?;
                        }
                        break;
                    }
                }
            }
            written += self.remain.read(&mut buf[written..])?;
        }

        Ok(written)
    }
}
