use crate::constant::{FORMAT_VERSION, ROW_HEADER_LEN};
use crate::error::{Error, Result};
use zerocopy::byteorder::little_endian::U32 as U32LE;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Encoded row header (zero-copy)
///
/// Layout:
/// - version: 1 byte
/// - size: 4 bytes (little-endian, total row length including this header)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, IntoBytes)]
pub struct RowHeader {
    version: u8,
    size: U32LE,
}

impl RowHeader {
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Total row length in bytes, header included
    pub fn size(&self) -> usize {
        self.size.get() as usize
    }
}

/// Read and validate a row header at the start of `data`
pub fn read_row_header(data: &[u8]) -> Result<&RowHeader> {
    let bytes = data.get(..ROW_HEADER_LEN).ok_or(Error::UnexpectedEof)?;
    let header = RowHeader::ref_from_bytes(bytes).map_err(|_| Error::InvalidPayload)?;
    if header.version() != FORMAT_VERSION {
        return Err(Error::InvalidPayload);
    }
    Ok(header)
}

/// One finalized, immutable encoded row.
///
/// Produced by `RowEncoder::build`; ownership moves to the caller, which
/// hands the bytes to the insert/transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRow {
    bytes: Vec<u8>,
}

impl EncodedRow {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

/// Read `N` bytes of `row` starting at `offset`
pub(crate) fn fixed_bytes<const N: usize>(row: &[u8], offset: usize) -> Result<[u8; N]> {
    let end = offset.checked_add(N).ok_or(Error::UnexpectedEof)?;
    let bytes = row.get(offset..end).ok_or(Error::UnexpectedEof)?;
    <[u8; N]>::try_from(bytes).map_err(|_| Error::UnexpectedEof)
}
