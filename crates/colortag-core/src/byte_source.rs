//! Bounded random-access byte sources
//!
//! A [`BoundedByteSource`] owns an immutable byte buffer and hands out copies of
//! sub-ranges. Range requests use the block addressing of older decoders: a
//! 64-bit offset that must fit in an `i32`, and a signed 32-bit length. Every
//! request is checked in widened arithmetic before any byte is copied, so an
//! `offset + length` that would wrap in 32 bits is rejected instead of
//! producing a short or aliased read.
//!
//! Sequential consumers use [`BoundedByteSource::open_stream`], which returns an
//! independent cursor over the same storage.

use std::io::{self, BufRead, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use crate::{Error, Result};

/// Immutable byte buffer with overflow-safe ranged reads
#[derive(Debug, Clone)]
pub struct BoundedByteSource {
    bytes: Arc<[u8]>,
    name: Option<String>,
}

impl BoundedByteSource {
    /// Create a source over `bytes`
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            name: None,
        }
    }

    /// Create a source that remembers where its bytes came from
    pub fn with_name(bytes: impl Into<Arc<[u8]>>, name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            name: Some(name.into()),
        }
    }

    /// Read a whole file into a source named after the file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::with_name(bytes, name))
    }

    /// Name given at construction, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Total number of bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Copy `length` bytes starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] when `offset` does not fit in an `i32`, when
    /// `length` is negative, or when `offset + length` exceeds `i32::MAX` or
    /// the size of the source. Nothing is copied on failure.
    pub fn read_range(&self, offset: u64, length: i32) -> Result<Vec<u8>> {
        let range_error = || Error::Range {
            offset,
            length,
            size: self.size(),
        };

        let start = i32::try_from(offset).map_err(|_| range_error())?;
        if length < 0 {
            return Err(range_error());
        }

        let end = i64::from(start) + i64::from(length);
        if end > i64::from(i32::MAX) || end > self.bytes.len() as i64 {
            return Err(range_error());
        }

        Ok(self.bytes[start as usize..end as usize].to_vec())
    }

    /// Open an independent sequential reader positioned at offset 0
    pub fn open_stream(&self) -> ByteStream {
        ByteStream {
            cursor: Cursor::new(Arc::clone(&self.bytes)),
        }
    }
}

impl From<Vec<u8>> for BoundedByteSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Sequential view over a [`BoundedByteSource`]
///
/// Each stream keeps its own position; streams never affect each other or
/// the source they were opened from.
#[derive(Debug, Clone)]
pub struct ByteStream {
    cursor: Cursor<Arc<[u8]>>,
}

impl ByteStream {
    /// Current read position
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Bytes left before the end of the source
    pub fn remaining(&self) -> u64 {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position())
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl BufRead for ByteStream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.cursor.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.cursor.consume(amt)
    }
}

impl Seek for ByteStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_24() -> BoundedByteSource {
        BoundedByteSource::new((0u8..24).collect::<Vec<_>>())
    }

    #[test]
    fn test_read_range_tail() {
        let source = source_24();
        let bytes = source.read_range(20, 4).unwrap();
        assert_eq!(bytes, vec![20, 21, 22, 23]);
    }

    #[test]
    fn test_read_range_past_end_reports_request() {
        let source = source_24();
        match source.read_range(20, 10) {
            Err(Error::Range {
                offset,
                length,
                size,
            }) => {
                assert_eq!(offset, 20);
                assert_eq!(length, 10);
                assert_eq!(size, 24);
            }
            other => panic!("expected range error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_range_error_message() {
        let err = source_24().read_range(20, 10).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not read block (block start: 20, block length: 10, data length: 24)"
        );
    }

    #[test]
    fn test_read_range_rejects_negative_length() {
        assert!(matches!(
            source_24().read_range(0, -1),
            Err(Error::Range { .. })
        ));
    }

    #[test]
    fn test_read_range_rejects_wide_offset() {
        let source = source_24();
        assert!(source.read_range(i32::MAX as u64 + 1, 0).is_err());
        assert!(source.read_range(u64::MAX, 1).is_err());
    }

    #[test]
    fn test_read_range_rejects_32bit_wrap() {
        // Would wrap negative in i32 arithmetic
        let source = source_24();
        assert!(matches!(
            source.read_range(16, i32::MAX),
            Err(Error::Range { .. })
        ));
    }

    #[test]
    fn test_read_range_empty() {
        let source = source_24();
        assert!(source.read_range(24, 0).unwrap().is_empty());
        assert!(source.read_range(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_read_range_returns_copy() {
        let source = source_24();
        let mut bytes = source.read_range(0, 4).unwrap();
        bytes[0] = 0xFF;
        assert_eq!(source.read_range(0, 4).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_streams_are_independent() {
        let source = source_24();
        let mut a = source.open_stream();
        let mut b = source.open_stream();

        let mut buf = [0u8; 8];
        a.read_exact(&mut buf).unwrap();
        assert_eq!(a.position(), 8);
        assert_eq!(b.position(), 0);

        let mut one = [0u8; 1];
        b.read_exact(&mut one).unwrap();
        assert_eq!(one[0], 0);
        assert_eq!(a.remaining(), 16);

        // Ranged reads do not disturb streams
        source.read_range(4, 4).unwrap();
        a.read_exact(&mut one).unwrap();
        assert_eq!(one[0], 8);
    }

    #[test]
    fn test_stream_seek() {
        let mut stream = source_24().open_stream();
        stream.seek(SeekFrom::End(-2)).unwrap();
        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, vec![22, 23]);
    }

    #[test]
    fn test_named_source() {
        let source = BoundedByteSource::with_name(vec![1, 2, 3], "cover.jpg");
        assert_eq!(source.name(), Some("cover.jpg"));
        assert_eq!(source.size(), 3);
        assert_eq!(source_24().name(), None);
    }

    #[test]
    fn test_from_missing_file() {
        let result = BoundedByteSource::from_file("/nonexistent/colortag/input.bin");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
