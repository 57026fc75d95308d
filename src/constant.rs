use bitflags::bitflags;

/// Row format version written into every row header.
pub const FORMAT_VERSION: u8 = 1;

/// Row header length: version (1 byte) + total row size (4 bytes, little-endian).
pub const ROW_HEADER_LEN: usize = 5;

/// Width of a string column's slot: a `u32` body offset from the row start.
pub const STRING_SLOT_LEN: usize = 4;

/// Scalar column kinds understood by the row codec
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bool = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    Float = 5,
    Double = 6,
    /// Milliseconds since the Unix epoch, stored as i64
    Timestamp = 7,
    /// Engine-packed calendar date, stored as i32
    Date = 8,
    /// Variable-length UTF-8, stored via the row's string offset table
    String = 9,
}

impl ColumnType {
    /// Encoded width for fixed-width types, `None` for `String`
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            ColumnType::Bool => Some(1),
            ColumnType::Int16 => Some(2),
            ColumnType::Int32 | ColumnType::Float | ColumnType::Date => Some(4),
            ColumnType::Int64 | ColumnType::Double | ColumnType::Timestamp => Some(8),
            ColumnType::String => None,
        }
    }

    /// Width of the column's slot in the fixed region of a row.
    ///
    /// Fixed-width types store the value itself; `String` stores the `u32`
    /// offset of its body.
    pub fn slot_size(self) -> usize {
        self.fixed_size().unwrap_or(STRING_SLOT_LEN)
    }
}

bitflags! {
    /// Per-column constraints carried by the schema
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ColumnFlags: u16 {
        const NOT_NULL = 0x0001;
    }
}
