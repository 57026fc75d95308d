use tracing::trace;

use crate::constant::{ColumnType, FORMAT_VERSION, ROW_HEADER_LEN};
use crate::error::{Error, Result, eyre};
use crate::protocol::layout::RowLayout;
use crate::protocol::row::EncodedRow;
use crate::schema::Schema;

/// Staged builder for one encoded row.
///
/// Values are appended strictly in schema order, one typed append per
/// column, then the row is finalized once with [`RowEncoder::build`]. The
/// encoder owns its buffer until finalization; a row that was never built
/// is never a valid wire row.
///
/// `str_size` declares the capacity reserved for all string bodies of the
/// row. Appending more string bytes than declared is an error; unused
/// capacity is trimmed at build time.
#[derive(Debug)]
pub struct RowEncoder<'a> {
    schema: &'a Schema,
    layout: RowLayout,
    buf: Vec<u8>,
    next_col: usize,
    str_cursor: usize,
    finished: bool,
}

impl<'a> RowEncoder<'a> {
    pub fn new(schema: &'a Schema, str_size: usize) -> Result<Self> {
        let layout = RowLayout::new(schema);
        if layout.str_field_cnt() == 0 && str_size > 0 {
            return Err(Error::Size(format!(
                "schema has no string columns but {str_size} string bytes were declared"
            )));
        }
        let total = layout.base_size() + str_size;
        if u32::try_from(total).is_err() {
            return Err(Error::Size(format!(
                "row size {total} exceeds the u32 wire limit"
            )));
        }

        let mut buf = vec![0u8; total];
        buf[0] = FORMAT_VERSION;
        let str_cursor = layout.base_size();
        Ok(Self {
            schema,
            layout,
            buf,
            next_col: 0,
            str_cursor,
            finished: false,
        })
    }

    /// True iff every column has received its append
    pub fn is_complete(&self) -> bool {
        self.next_col == self.schema.column_count()
    }

    /// Check that the current append position accepts `appended`, returning
    /// the column index
    fn expect_column(&self, appended: ColumnType) -> Result<usize> {
        if self.finished {
            return Err(Error::OutOfOrder("append after build"));
        }
        let index = self.next_col;
        let Some(col) = self.schema.column(index) else {
            return Err(Error::OutOfOrder("every column has already been appended"));
        };
        if col.column_type != appended {
            return Err(Error::SchemaMismatch {
                index,
                declared: col.column_type,
                appended,
            });
        }
        Ok(index)
    }

    /// Write `bytes` into the column's slot and advance the append position
    fn put_slot<const N: usize>(&mut self, index: usize, bytes: [u8; N]) -> Result<()> {
        let offset = self.layout.slot(index);
        let end = offset + N;
        let buf_len = self.buf.len();
        let Some(dst) = self.buf.get_mut(offset..end) else {
            return Err(Error::LibraryBug(eyre!(
                "slot {offset}..{end} of column {index} exceeds the row buffer ({buf_len} bytes)"
            )));
        };
        dst.copy_from_slice(&bytes);
        self.next_col += 1;
        Ok(())
    }

    pub fn append_bool(&mut self, v: bool) -> Result<()> {
        let index = self.expect_column(ColumnType::Bool)?;
        self.put_slot(index, [u8::from(v)])
    }

    pub fn append_int16(&mut self, v: i16) -> Result<()> {
        let index = self.expect_column(ColumnType::Int16)?;
        self.put_slot(index, v.to_le_bytes())
    }

    pub fn append_int32(&mut self, v: i32) -> Result<()> {
        let index = self.expect_column(ColumnType::Int32)?;
        self.put_slot(index, v.to_le_bytes())
    }

    pub fn append_int64(&mut self, v: i64) -> Result<()> {
        let index = self.expect_column(ColumnType::Int64)?;
        self.put_slot(index, v.to_le_bytes())
    }

    pub fn append_float(&mut self, v: f32) -> Result<()> {
        let index = self.expect_column(ColumnType::Float)?;
        self.put_slot(index, v.to_bits().to_le_bytes())
    }

    pub fn append_double(&mut self, v: f64) -> Result<()> {
        let index = self.expect_column(ColumnType::Double)?;
        self.put_slot(index, v.to_bits().to_le_bytes())
    }

    /// Append a timestamp as milliseconds since the Unix epoch
    pub fn append_timestamp(&mut self, millis: i64) -> Result<()> {
        let index = self.expect_column(ColumnType::Timestamp)?;
        self.put_slot(index, millis.to_le_bytes())
    }

    /// Append an engine-packed calendar date
    pub fn append_date(&mut self, date: i32) -> Result<()> {
        let index = self.expect_column(ColumnType::Date)?;
        self.put_slot(index, date.to_le_bytes())
    }

    pub fn append_string(&mut self, s: &str) -> Result<()> {
        let index = self.expect_column(ColumnType::String)?;
        let bytes = s.as_bytes();
        let end = self.str_cursor + bytes.len();
        if end > self.buf.len() {
            return Err(Error::Size(format!(
                "string of {} bytes at column {index} overflows the declared string capacity",
                bytes.len()
            )));
        }

        // Total size fits in u32 (checked in new), so the offset does too.
        let offset = self.str_cursor as u32;
        self.put_slot(index, offset.to_le_bytes())?;

        let str_cursor = self.str_cursor;
        let Some(dst) = self.buf.get_mut(str_cursor..end) else {
            return Err(Error::LibraryBug(eyre!(
                "string body {str_cursor}..{end} exceeds the row buffer"
            )));
        };
        dst.copy_from_slice(bytes);
        self.str_cursor = end;
        Ok(())
    }

    /// Append NULL for the current column.
    ///
    /// Fixed-width slots stay zero-filled; a string column records the
    /// current body position so later string offsets stay monotonic.
    pub fn append_null(&mut self) -> Result<()> {
        if self.finished {
            return Err(Error::OutOfOrder("append after build"));
        }
        let index = self.next_col;
        let Some(col) = self.schema.column(index) else {
            return Err(Error::OutOfOrder("every column has already been appended"));
        };
        if col.is_not_null() {
            return Err(Error::NullNotAllowed(index));
        }

        let byte_pos = ROW_HEADER_LEN + (index >> 3);
        let Some(byte) = self.buf.get_mut(byte_pos) else {
            return Err(Error::LibraryBug(eyre!(
                "null bitmap byte {byte_pos} exceeds the row buffer"
            )));
        };
        *byte |= 1 << (index & 7);

        if col.column_type == ColumnType::String {
            let offset = self.str_cursor as u32;
            self.put_slot(index, offset.to_le_bytes())
        } else {
            self.next_col += 1;
            Ok(())
        }
    }

    /// Finalize the row and hand the encoded bytes to the caller.
    ///
    /// The encoder is write-locked afterwards; further appends or a second
    /// `build` fail with `OutOfOrder`.
    pub fn build(&mut self) -> Result<EncodedRow> {
        if self.finished {
            return Err(Error::OutOfOrder("build called twice"));
        }
        if !self.is_complete() {
            return Err(Error::IncompleteRow {
                appended: self.next_col,
                expected: self.schema.column_count(),
            });
        }

        self.buf.truncate(self.str_cursor);
        // Fits in u32: never larger than the size checked in new.
        let size = self.buf.len() as u32;
        let Some(dst) = self.buf.get_mut(1..ROW_HEADER_LEN) else {
            return Err(Error::LibraryBug(eyre!("row buffer lost its header")));
        };
        dst.copy_from_slice(&size.to_le_bytes());
        self.finished = true;

        trace!(size, columns = self.schema.column_count(), "row finalized");
        Ok(EncodedRow::new(std::mem::take(&mut self.buf)))
    }
}
