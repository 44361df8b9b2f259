use crate::{Colour, QoiError};

const QOI_OP_INDEX: u8 = 0b0000_0000;
const QOI_OP_DIFF: u8 = 0b0100_0000;
const QOI_OP_LUMA: u8 = 0b1000_0000;
const QOI_OP_RUN: u8 = 0b1100_0000;
const QOI_OP_RGB: u8 = 0b1111_1110;
const QOI_OP_RGBA: u8 = 0b1111_1111;

const QOI_MASK_2: u8 = 0b1100_0000;
const QOI_MASK_6: u8 = 0b0011_1111;

/// A single unit of the chunk stream.
///
/// Deltas are stored unbiased, i.e. `Diff { dr: -2, .. }` is written as a `0`
/// in the red field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk {
    /// Slot of the colour cache, `0..64`
    Index(u8),
    /// Per channel deltas in `-2..=1`
    Diff { dr: i8, dg: i8, db: i8 },
    /// Green delta in `-32..=31`, red and blue relative to it in `-8..=7`
    Luma { dg: i8, dr_dg: i8, db_dg: i8 },
    /// Repeats the previous pixel, length in `1..=62`
    Run(u8),
    Rgb { r: u8, g: u8, b: u8 },
    Rgba(Colour),
}

impl Chunk {
    /// Smallest delta or literal chunk describing `cur` relative to `previous`.
    pub(crate) fn delta(previous: Colour, cur: Colour) -> Chunk {
        if cur.a != previous.a {
            return Chunk::Rgba(cur);
        }

        let dr = cur.r.wrapping_sub(previous.r) as i8;
        let dg = cur.g.wrapping_sub(previous.g) as i8;
        let db = cur.b.wrapping_sub(previous.b) as i8;

        if [dr, dg, db].iter().all(|d| (-2..=1).contains(d)) {
            return Chunk::Diff { dr, dg, db };
        }

        let dr_dg = dr.wrapping_sub(dg);
        let db_dg = db.wrapping_sub(dg);

        if (-32..=31).contains(&dg) && (-8..=7).contains(&dr_dg) && (-8..=7).contains(&db_dg) {
            return Chunk::Luma { dg, dr_dg, db_dg };
        }

        Chunk::Rgb {
            r: cur.r,
            g: cur.g,
            b: cur.b,
        }
    }

    /// The pixel this chunk produces. Runs produce `previous`.
    pub(crate) fn pixel(self, previous: Colour, lookup: impl FnOnce(u8) -> Colour) -> Colour {
        match self {
            Chunk::Index(index) => lookup(index),
            Chunk::Diff { dr, dg, db } => Colour {
                r: previous.r.wrapping_add_signed(dr),
                g: previous.g.wrapping_add_signed(dg),
                b: previous.b.wrapping_add_signed(db),
                a: previous.a,
            },
            Chunk::Luma { dg, dr_dg, db_dg } => Colour {
                r: previous.r.wrapping_add_signed(dr_dg.wrapping_add(dg)),
                g: previous.g.wrapping_add_signed(dg),
                b: previous.b.wrapping_add_signed(db_dg.wrapping_add(dg)),
                a: previous.a,
            },
            Chunk::Run(_) => previous,
            Chunk::Rgb { r, g, b } => Colour {
                r,
                g,
                b,
                a: previous.a,
            },
            Chunk::Rgba(colour) => colour,
        }
    }

    /// Encoded size in bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match self {
            Chunk::Index(_) | Chunk::Diff { .. } | Chunk::Run(_) => 1,
            Chunk::Luma { .. } => 2,
            Chunk::Rgb { .. } => 4,
            Chunk::Rgba(_) => 5,
        }
    }

    pub fn write(self, out: &mut Vec<u8>) {
        match self {
            Chunk::Index(index) => out.push(QOI_OP_INDEX | (index & QOI_MASK_6)),
            Chunk::Diff { dr, dg, db } => out.push(
                QOI_OP_DIFF
                    | (bias(dr, 2) & 0b11) << 4
                    | (bias(dg, 2) & 0b11) << 2
                    | (bias(db, 2) & 0b11),
            ),
            Chunk::Luma { dg, dr_dg, db_dg } => out.extend_from_slice(&[
                QOI_OP_LUMA | (bias(dg, 32) & QOI_MASK_6),
                (bias(dr_dg, 8) & 0b1111) << 4 | (bias(db_dg, 8) & 0b1111),
            ]),
            Chunk::Run(run) => out.push(QOI_OP_RUN | (run.wrapping_sub(1) & QOI_MASK_6)),
            Chunk::Rgb { r, g, b } => out.extend_from_slice(&[QOI_OP_RGB, r, g, b]),
            Chunk::Rgba(colour) => {
                out.push(QOI_OP_RGBA);
                out.extend_from_slice(&colour.bytes());
            }
        }
    }

    /// Reads the chunk at the start of `data`, returning it with the number
    /// of bytes it occupies.
    pub fn read(data: &[u8]) -> Result<(Chunk, usize), QoiError> {
        let Some(&tag) = data.first() else {
            return Err(QoiError::Truncated {
                needed: 1,
                remaining: 0,
            });
        };

        let chunk = match tag {
            QOI_OP_RGBA => Chunk::Rgba(Colour::from_bytes(payload(data)?)),
            QOI_OP_RGB => {
                let [r, g, b] = payload(data)?;
                Chunk::Rgb { r, g, b }
            }
            _ => match tag & QOI_MASK_2 {
                QOI_OP_INDEX => Chunk::Index(tag & QOI_MASK_6),
                QOI_OP_DIFF => Chunk::Diff {
                    dr: unbias((tag >> 4) & 0b11, 2),
                    dg: unbias((tag >> 2) & 0b11, 2),
                    db: unbias(tag & 0b11, 2),
                },
                QOI_OP_LUMA => {
                    let [dr_db] = payload(data)?;
                    Chunk::Luma {
                        dg: unbias(tag & QOI_MASK_6, 32),
                        dr_dg: unbias(dr_db >> 4, 8),
                        db_dg: unbias(dr_db & 0b1111, 8),
                    }
                }
                _ => Chunk::Run((tag & QOI_MASK_6) + 1),
            },
        };

        Ok((chunk, chunk.len()))
    }
}

fn bias(value: i8, by: i8) -> u8 {
    value.wrapping_add(by) as u8
}

fn unbias(value: u8, by: i8) -> i8 {
    (value as i8).wrapping_sub(by)
}

/// The `N` bytes following the tag.
fn payload<const N: usize>(data: &[u8]) -> Result<[u8; N], QoiError> {
    data.get(1..=N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(QoiError::Truncated {
            needed: N + 1,
            remaining: data.len(),
        })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::Chunk;
    use crate::{Colour, ErrorKind};

    #[test_case(Chunk::Index(17), &[0x11])]
    #[test_case(Chunk::Diff { dr: 1, dg: 1, db: 1 }, &[0b01_11_11_11])]
    #[test_case(Chunk::Diff { dr: -2, dg: 0, db: -1 }, &[0b01_00_10_01])]
    #[test_case(Chunk::Luma { dg: -32, dr_dg: 7, db_dg: -8 }, &[0b10_000000, 0xF0])]
    #[test_case(Chunk::Luma { dg: 31, dr_dg: 0, db_dg: 1 }, &[0b10_111111, 0x89])]
    #[test_case(Chunk::Run(1), &[0xC0])]
    #[test_case(Chunk::Run(62), &[0xFD])]
    #[test_case(Chunk::Rgb { r: 1, g: 2, b: 3 }, &[0xFE, 1, 2, 3])]
    #[test_case(Chunk::Rgba(Colour::new(1, 2, 3, 4)), &[0xFF, 1, 2, 3, 4])]
    fn packing(chunk: Chunk, bytes: &[u8]) {
        let mut out = vec![];
        chunk.write(&mut out);
        assert_eq!(out, bytes);
        assert_eq!(chunk.len(), bytes.len());
        assert_eq!(Chunk::read(bytes).unwrap(), (chunk, bytes.len()));
    }

    #[test_case(&[] ; "empty")]
    #[test_case(&[0xFF, 1, 2, 3] ; "rgba missing alpha")]
    #[test_case(&[0xFE, 1] ; "rgb missing blue")]
    #[test_case(&[0b10_000000] ; "luma missing second byte")]
    fn truncated(bytes: &[u8]) {
        assert_eq!(Chunk::read(bytes).unwrap_err().kind(), ErrorKind::Truncated);
    }

    #[test]
    fn read_ignores_trailing_bytes() {
        let (chunk, len) = Chunk::read(&[0x55, 0xFF, 0xFF]).unwrap();
        assert_eq!(chunk, Chunk::Diff { dr: -1, dg: -1, db: -1 });
        assert_eq!(len, 1);
    }

    #[test_case(Colour::new(1, 1, 1, 255), Chunk::Diff { dr: 1, dg: 1, db: 1 } ; "diff")]
    #[test_case(Colour::new(255, 255, 255, 255), Chunk::Diff { dr: -1, dg: -1, db: -1 } ; "diff wraps")]
    #[test_case(Colour::new(2, 0, 0, 255), Chunk::Luma { dg: 0, dr_dg: 2, db_dg: 0 } ; "luma")]
    #[test_case(Colour::new(20, 25, 30, 255), Chunk::Luma { dg: 25, dr_dg: -5, db_dg: 5 } ; "luma wide green")]
    #[test_case(Colour::new(0, 32, 0, 255), Chunk::Rgb { r: 0, g: 32, b: 0 } ; "green out of range")]
    #[test_case(Colour::new(9, 0, 0, 255), Chunk::Rgb { r: 9, g: 0, b: 0 } ; "red out of range")]
    #[test_case(Colour::new(0, 0, 0, 254), Chunk::Rgba(Colour::new(0, 0, 0, 254)) ; "alpha change")]
    fn delta_from_init(cur: Colour, expected: Chunk) {
        let chunk = Chunk::delta(Colour::INIT, cur);
        assert_eq!(chunk, expected);
        assert_eq!(chunk.pixel(Colour::INIT, |_| unreachable!()), cur);
    }

    #[test]
    fn luma_wraps_around() {
        let previous = Colour::new(250, 3, 1, 9);
        let cur = Colour::new(4, 10, 0, 9);
        let chunk = Chunk::delta(previous, cur);
        assert_eq!(
            chunk,
            Chunk::Luma {
                dg: 7,
                dr_dg: 3,
                db_dg: -8
            }
        );
        assert_eq!(chunk.pixel(previous, |_| unreachable!()), cur);
    }
}
