//! Map interchange: row-major bytes, run-length and zlib payloads, CRC-32.
//!
//! Everything here is a pure function of its inputs.  Nothing touches a live
//! [`TileGrid`] until [`TileGrid::load_snapshot`] (or
//! [`TileGrid::from_snapshot`]) is called, and those validate the whole
//! snapshot before the first write.
//!
//! # Container layout (`MapSnapshot::write_to`)
//!
//! | Offset | Size | Field                                         |
//! |--------|------|-----------------------------------------------|
//! | 0      | 4    | magic `b"GNAV"`                               |
//! | 4      | 1    | format version (`1`)                          |
//! | 5      | 1    | encoding (`0` raw, `1` RLE, `2` zlib)         |
//! | 6      | 1    | floor count                                   |
//! | 7      | 1    | reserved (`0`)                                |
//! | 8      | 4    | width, little-endian                          |
//! | 12     | 4    | height, little-endian                         |
//! | 16     | 4    | CRC-32 of the *raw* row-major bytes           |
//! | 20     | 4    | payload length                                |
//! | 24     | n    | payload                                       |
//!
//! Raw bytes are floor-major: floor 0's `width × height` row-major layer,
//! then floor 1's, and so on.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use tracing::{info, warn};

use gn_core::FloorId;

use crate::{AddressingMode, GridError, GridResult, TileGrid};

const MAGIC: &[u8; 4] = b"GNAV";
const VERSION: u8 = 1;
const HEADER_LEN: usize = 24;

// ── Checksum ──────────────────────────────────────────────────────────────────

/// CRC-32 (IEEE) of `bytes`.
pub fn checksum(bytes: &[u8]) -> u32 {
    let mut crc = flate2::Crc::new();
    crc.update(bytes);
    crc.sum()
}

// ── Run-length encoding ───────────────────────────────────────────────────────

/// Encode as `(run_length, value)` pairs with runs of 1..=255.
pub fn rle_encode(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut iter = bytes.iter().copied().peekable();
    while let Some(value) = iter.next() {
        let mut run: u8 = 1;
        while run < u8::MAX && iter.peek() == Some(&value) {
            iter.next();
            run += 1;
        }
        out.push(run);
        out.push(value);
    }
    out
}

/// Decode `(run_length, value)` pairs, producing at most `max_len` bytes.
///
/// # Errors
///
/// `Corrupt` on an odd-length input, a zero-length run, or output that
/// would exceed `max_len`.
pub fn rle_decode(encoded: &[u8], max_len: usize) -> GridResult<Vec<u8>> {
    if encoded.len() % 2 != 0 {
        return Err(GridError::Corrupt("RLE stream has odd length".into()));
    }
    let mut out = Vec::with_capacity(encoded.len().min(max_len));
    for pair in encoded.chunks_exact(2) {
        let (run, value) = (pair[0], pair[1]);
        if run == 0 {
            return Err(GridError::Corrupt("RLE stream contains a zero-length run".into()));
        }
        if out.len() + run as usize > max_len {
            return Err(GridError::Corrupt(format!("RLE stream expands past {max_len} bytes")));
        }
        out.extend(std::iter::repeat_n(value, run as usize));
    }
    Ok(out)
}

// ── Generic byte-stream compression ───────────────────────────────────────────

/// zlib-compress `bytes`.
pub fn compress(bytes: &[u8]) -> GridResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Inverse of [`compress`], producing at most `max_len` bytes.
///
/// # Errors
///
/// `Corrupt` on an invalid stream or output that would exceed `max_len`.
pub fn decompress(bytes: &[u8], max_len: usize) -> GridResult<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(bytes)
        .take(max_len as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| GridError::Corrupt(format!("zlib stream: {e}")))?;
    if out.len() > max_len {
        return Err(GridError::Corrupt(format!("zlib stream expands past {max_len} bytes")));
    }
    Ok(out)
}

// ── MapEncoding ───────────────────────────────────────────────────────────────

/// Payload encoding of a [`MapSnapshot`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MapEncoding {
    Raw,
    #[default]
    Rle,
    Zlib,
}

impl MapEncoding {
    fn to_u8(self) -> u8 {
        match self {
            MapEncoding::Raw  => 0,
            MapEncoding::Rle  => 1,
            MapEncoding::Zlib => 2,
        }
    }

    fn from_u8(v: u8) -> GridResult<Self> {
        match v {
            0 => Ok(MapEncoding::Raw),
            1 => Ok(MapEncoding::Rle),
            2 => Ok(MapEncoding::Zlib),
            other => Err(GridError::Corrupt(format!("unknown map encoding {other}"))),
        }
    }
}

// ── MapSnapshot ───────────────────────────────────────────────────────────────

/// Self-describing persisted/transport form of a grid's terrain.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapSnapshot {
    pub width:    u32,
    pub height:   u32,
    pub floors:   u8,
    pub encoding: MapEncoding,
    /// CRC-32 of the decoded raw bytes.
    pub checksum: u32,
    pub payload:  Vec<u8>,
}

impl MapSnapshot {
    /// Encode floor-major raw bytes into a snapshot.
    pub fn encode(
        width:    u32,
        height:   u32,
        floors:   u8,
        raw:      &[u8],
        encoding: MapEncoding,
    ) -> GridResult<Self> {
        let expected = width as usize * height as usize * floors as usize;
        if raw.len() != expected {
            return Err(GridError::InvalidDimensions {
                expected,
                got:  raw.len(),
                what: "raw map length",
            });
        }
        let payload = match encoding {
            MapEncoding::Raw  => raw.to_vec(),
            MapEncoding::Rle  => rle_encode(raw),
            MapEncoding::Zlib => compress(raw)?,
        };
        Ok(Self { width, height, floors, encoding, checksum: checksum(raw), payload })
    }

    /// Decode and validate the payload, returning the raw floor-major bytes.
    ///
    /// # Errors
    ///
    /// `Corrupt` if the payload cannot be decoded or expands past the
    /// header's `width × height × floors`, `InvalidDimensions` if the
    /// decoded length disagrees with the header, `ChecksumMismatch` if the
    /// CRC differs.
    pub fn decode(&self) -> GridResult<Vec<u8>> {
        let expected = self.width as usize * self.height as usize * self.floors as usize;
        let raw = match self.encoding {
            MapEncoding::Raw if self.payload.len() != expected => {
                return Err(GridError::InvalidDimensions {
                    expected,
                    got:  self.payload.len(),
                    what: "raw payload length",
                });
            }
            MapEncoding::Raw  => self.payload.clone(),
            MapEncoding::Rle  => rle_decode(&self.payload, expected)?,
            MapEncoding::Zlib => decompress(&self.payload, expected)?,
        };
        if raw.len() != expected {
            return Err(GridError::InvalidDimensions {
                expected,
                got:  raw.len(),
                what: "decoded map length",
            });
        }
        let computed = checksum(&raw);
        if computed != self.checksum {
            warn!(expected = self.checksum, computed, "map checksum mismatch");
            return Err(GridError::ChecksumMismatch { expected: self.checksum, computed });
        }
        Ok(raw)
    }

    /// Serialise the container (see module docs for the layout).
    pub fn write_to<W: Write>(&self, mut w: W) -> GridResult<()> {
        w.write_all(MAGIC)?;
        w.write_all(&[VERSION, self.encoding.to_u8(), self.floors, 0])?;
        w.write_all(&self.width.to_le_bytes())?;
        w.write_all(&self.height.to_le_bytes())?;
        w.write_all(&self.checksum.to_le_bytes())?;
        let len = u32::try_from(self.payload.len())
            .map_err(|_| GridError::Corrupt("payload exceeds 4 GiB".into()))?;
        w.write_all(&len.to_le_bytes())?;
        w.write_all(&self.payload)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> GridResult<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Parse a container.  Does not decode or checksum the payload; call
    /// [`decode`](Self::decode) for that.
    pub fn read_from<R: Read>(mut r: R) -> GridResult<Self> {
        let mut header = [0u8; HEADER_LEN];
        r.read_exact(&mut header).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => GridError::Corrupt("truncated header".into()),
            _ => GridError::Io(e),
        })?;
        if &header[0..4] != MAGIC {
            return Err(GridError::Corrupt("bad magic".into()));
        }
        if header[4] != VERSION {
            return Err(GridError::UnsupportedVersion(header[4]));
        }
        let encoding = MapEncoding::from_u8(header[5])?;
        let floors   = header[6];
        let width    = read_u32(&header[8..12]);
        let height   = read_u32(&header[12..16]);
        let checksum = read_u32(&header[16..20]);
        let len      = read_u32(&header[20..24]) as usize;

        let mut payload = Vec::with_capacity(len.min(1 << 24));
        r.take(len as u64).read_to_end(&mut payload)?;
        if payload.len() != len {
            return Err(GridError::Corrupt(format!(
                "payload truncated: header says {len} bytes, found {}",
                payload.len()
            )));
        }
        Ok(Self { width, height, floors, encoding, checksum, payload })
    }

    pub fn from_bytes(bytes: &[u8]) -> GridResult<Self> {
        Self::read_from(bytes)
    }
}

fn read_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

// ── TileGrid integration ──────────────────────────────────────────────────────

impl TileGrid {
    /// Export all floors into a snapshot.
    pub fn export_snapshot(&self, encoding: MapEncoding) -> GridResult<MapSnapshot> {
        let mut raw = Vec::with_capacity(self.cells_per_floor() * self.floors() as usize);
        for f in 0..self.floors() {
            raw.extend_from_slice(&self.export_row_major(FloorId(f)));
        }
        let snapshot = MapSnapshot::encode(self.width(), self.height(), self.floors(), &raw, encoding)?;
        info!(
            width = self.width(),
            height = self.height(),
            floors = self.floors(),
            encoding = ?encoding,
            bytes = snapshot.payload.len(),
            "exported map snapshot"
        );
        Ok(snapshot)
    }

    /// Build a new grid from a validated snapshot.
    pub fn from_snapshot(snapshot: &MapSnapshot, mode: AddressingMode) -> GridResult<Self> {
        let mut grid = TileGrid::new(snapshot.width, snapshot.height, snapshot.floors, mode)?;
        grid.load_snapshot(snapshot)?;
        Ok(grid)
    }

    /// Replace every floor from `snapshot`.
    ///
    /// The snapshot must match this grid's dimensions exactly.  All floors
    /// are decoded and checked before any cell is written.
    pub fn load_snapshot(&mut self, snapshot: &MapSnapshot) -> GridResult<()> {
        if snapshot.width != self.width() {
            return Err(GridError::InvalidDimensions {
                expected: self.width() as usize,
                got:      snapshot.width as usize,
                what:     "snapshot width",
            });
        }
        if snapshot.height != self.height() {
            return Err(GridError::InvalidDimensions {
                expected: self.height() as usize,
                got:      snapshot.height as usize,
                what:     "snapshot height",
            });
        }
        if snapshot.floors != self.floors() {
            return Err(GridError::InvalidDimensions {
                expected: self.floors() as usize,
                got:      snapshot.floors as usize,
                what:     "snapshot floor count",
            });
        }

        let raw = snapshot.decode()?;
        let per_floor = self.cells_per_floor();

        // Validate every byte on a scratch copy so a bad tile in floor N
        // cannot leave floors 0..N already overwritten.
        let mut staged = self.clone();
        for (f, layer) in raw.chunks_exact(per_floor).enumerate() {
            staged.load_row_major(FloorId(f as u8), layer)?;
        }
        *self = staged;

        info!(
            width = self.width(),
            height = self.height(),
            floors = self.floors(),
            "loaded map snapshot"
        );
        Ok(())
    }
}
