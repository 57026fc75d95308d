use tracing::trace;

use crate::constant::{ColumnType, ROW_HEADER_LEN};
use crate::error::{Error, Result};
use crate::protocol::layout::RowLayout;
use crate::protocol::primitive::read_bytes_fix;
use crate::protocol::resultset::read_resultset_header;
use crate::protocol::row::{fixed_bytes, read_row_header};
use crate::schema::{ColumnDef, Schema};
use crate::value::{NullBitmap, Value};
use simdutf8::basic::from_utf8;

/// Forward-only typed reader over a schema-described result payload.
///
/// The payload is borrowed read-only for the cursor's lifetime; string
/// accessors return slices borrowed from it. The cursor starts before the
/// first row; each `next` advances one row until the terminal exhausted
/// state.
///
/// Framing (row count, per-row headers, exact payload consumption) is
/// validated up front in [`ResultCursor::new`], so `next` itself cannot
/// fail. Field reads come in two families: checked accessors that verify
/// position, column index, declared type, and NULL-ness, and an
/// `*_unchecked` family that skips every check as a deliberate performance
/// escape hatch for callers that already know the schema.
#[derive(Debug)]
pub struct ResultCursor<'a> {
    schema: &'a Schema,
    layout: RowLayout,
    row_count: usize,
    rest: &'a [u8],
    current: Option<&'a [u8]>,
    consumed: usize,
}

impl<'a> ResultCursor<'a> {
    pub fn new(schema: &'a Schema, payload: &'a [u8]) -> Result<Self> {
        let layout = RowLayout::new(schema);
        let (row_count, rows) = read_resultset_header(payload)?;
        let row_count = row_count as usize;

        // Validate framing once so that advancing never fails.
        let mut walk = rows;
        for _ in 0..row_count {
            let header = read_row_header(walk)?;
            let size = header.size();
            if size < layout.base_size() || size > walk.len() {
                return Err(Error::InvalidPayload);
            }
            walk = &walk[size..];
        }
        if !walk.is_empty() {
            return Err(Error::InvalidPayload);
        }

        trace!(rows = row_count, "result payload opened");
        Ok(Self {
            schema,
            layout,
            row_count,
            rest: rows,
            current: None,
            consumed: 0,
        })
    }

    /// Total number of rows in the payload
    pub fn size(&self) -> usize {
        self.row_count
    }

    /// The schema this cursor decodes against
    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Advance to the next row.
    ///
    /// Returns false once all rows are consumed; the exhausted state is
    /// terminal and further calls keep returning false.
    #[expect(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.consumed == self.row_count {
            self.current = None;
            return false;
        }
        // Framing was validated in new; re-derive the split fallibly anyway
        // so a logic error degrades into exhaustion instead of a panic.
        let size = match read_row_header(self.rest) {
            Ok(header) => header.size(),
            Err(_) => {
                self.current = None;
                self.consumed = self.row_count;
                return false;
            }
        };
        match read_bytes_fix(self.rest, size) {
            Ok((row, rest)) => {
                self.current = Some(row);
                self.rest = rest;
                self.consumed += 1;
                true
            }
            Err(_) => {
                self.current = None;
                self.consumed = self.row_count;
                false
            }
        }
    }

    fn current_row(&self) -> Result<&'a [u8]> {
        self.current
            .ok_or_else(|| Error::OutOfRange("cursor is not positioned on a row".to_owned()))
    }

    fn column_def(&self, col: usize) -> Result<&'a ColumnDef> {
        self.schema
            .column(col)
            .ok_or_else(|| Error::OutOfRange(format!("column index {col} out of range")))
    }

    fn null_bitmap(&self, row: &'a [u8]) -> NullBitmap<'a> {
        let bitmap = row
            .get(ROW_HEADER_LEN..ROW_HEADER_LEN + self.layout.bitmap_len())
            .unwrap_or(&[]);
        NullBitmap::new(bitmap)
    }

    /// Resolve the current row for a typed read of column `col`
    fn typed_row(&self, col: usize, requested: ColumnType) -> Result<&'a [u8]> {
        let row = self.current_row()?;
        let def = self.column_def(col)?;
        if def.column_type != requested {
            return Err(Error::TypeMismatch {
                index: col,
                declared: def.column_type,
                requested,
            });
        }
        if self.null_bitmap(row).is_null(col) {
            return Err(Error::NullValue(col));
        }
        Ok(row)
    }

    /// Byte range of a string column's body within the row
    fn str_range(&self, row: &'a [u8], col: usize) -> Result<(usize, usize)> {
        let start = u32::from_le_bytes(fixed_bytes(row, self.layout.slot(col))?) as usize;
        let end = match self.layout.next_str_slot(col) {
            Some(slot) => u32::from_le_bytes(fixed_bytes(row, slot)?) as usize,
            None => row.len(),
        };
        if start < self.layout.base_size() || start > end || end > row.len() {
            return Err(Error::InvalidPayload);
        }
        Ok((start, end))
    }

    fn str_bytes(&self, row: &'a [u8], col: usize) -> Result<&'a [u8]> {
        let (start, end) = self.str_range(row, col)?;
        row.get(start..end).ok_or(Error::UnexpectedEof)
    }

    /// Whether the current row's column `col` is NULL
    pub fn is_null(&self, col: usize) -> Result<bool> {
        let row = self.current_row()?;
        self.column_def(col)?;
        Ok(self.null_bitmap(row).is_null(col))
    }

    pub fn get_bool(&self, col: usize) -> Result<bool> {
        let row = self.typed_row(col, ColumnType::Bool)?;
        let [byte] = fixed_bytes(row, self.layout.slot(col))?;
        Ok(byte != 0)
    }

    pub fn get_int16(&self, col: usize) -> Result<i16> {
        let row = self.typed_row(col, ColumnType::Int16)?;
        Ok(i16::from_le_bytes(fixed_bytes(row, self.layout.slot(col))?))
    }

    pub fn get_int32(&self, col: usize) -> Result<i32> {
        let row = self.typed_row(col, ColumnType::Int32)?;
        Ok(i32::from_le_bytes(fixed_bytes(row, self.layout.slot(col))?))
    }

    pub fn get_int64(&self, col: usize) -> Result<i64> {
        let row = self.typed_row(col, ColumnType::Int64)?;
        Ok(i64::from_le_bytes(fixed_bytes(row, self.layout.slot(col))?))
    }

    pub fn get_float(&self, col: usize) -> Result<f32> {
        let row = self.typed_row(col, ColumnType::Float)?;
        let bits = u32::from_le_bytes(fixed_bytes(row, self.layout.slot(col))?);
        Ok(f32::from_bits(bits))
    }

    pub fn get_double(&self, col: usize) -> Result<f64> {
        let row = self.typed_row(col, ColumnType::Double)?;
        let bits = u64::from_le_bytes(fixed_bytes(row, self.layout.slot(col))?);
        Ok(f64::from_bits(bits))
    }

    /// Milliseconds since the Unix epoch
    pub fn get_timestamp(&self, col: usize) -> Result<i64> {
        let row = self.typed_row(col, ColumnType::Timestamp)?;
        Ok(i64::from_le_bytes(fixed_bytes(row, self.layout.slot(col))?))
    }

    /// Engine-packed calendar date
    pub fn get_date(&self, col: usize) -> Result<i32> {
        let row = self.typed_row(col, ColumnType::Date)?;
        Ok(i32::from_le_bytes(fixed_bytes(row, self.layout.slot(col))?))
    }

    pub fn get_string(&self, col: usize) -> Result<&'a str> {
        let row = self.typed_row(col, ColumnType::String)?;
        let bytes = self.str_bytes(row, col)?;
        from_utf8(bytes).map_err(|_| Error::InvalidUtf8(col))
    }

    /// Decode column `col` of the current row into a tagged [`Value`]
    pub fn value(&self, col: usize) -> Result<Value<'a>> {
        let row = self.current_row()?;
        let def = self.column_def(col)?;
        if self.null_bitmap(row).is_null(col) {
            return Ok(Value::Null);
        }
        let slot = self.layout.slot(col);
        let value = match def.column_type {
            ColumnType::Bool => {
                let [byte] = fixed_bytes(row, slot)?;
                Value::Bool(byte != 0)
            }
            ColumnType::Int16 => Value::Int16(i16::from_le_bytes(fixed_bytes(row, slot)?)),
            ColumnType::Int32 => Value::Int32(i32::from_le_bytes(fixed_bytes(row, slot)?)),
            ColumnType::Int64 => Value::Int64(i64::from_le_bytes(fixed_bytes(row, slot)?)),
            ColumnType::Float => {
                Value::Float(f32::from_bits(u32::from_le_bytes(fixed_bytes(row, slot)?)))
            }
            ColumnType::Double => {
                Value::Double(f64::from_bits(u64::from_le_bytes(fixed_bytes(row, slot)?)))
            }
            ColumnType::Timestamp => Value::Timestamp(i64::from_le_bytes(fixed_bytes(row, slot)?)),
            ColumnType::Date => Value::Date(i32::from_le_bytes(fixed_bytes(row, slot)?)),
            ColumnType::String => {
                let bytes = self.str_bytes(row, col)?;
                Value::String(from_utf8(bytes).map_err(|_| Error::InvalidUtf8(col))?)
            }
        };
        Ok(value)
    }

    // ========================================================================
    // Unchecked accessors
    // ========================================================================
    //
    // The deliberate performance escape hatch: no position, range, type, or
    // NULL checks. Every method requires that the cursor is positioned on a
    // row (the preceding `next` returned true), that `col` is a valid index
    // of the cursor's schema, that the column's declared type matches the
    // accessor, and that the column is not NULL.

    /// Read column `col`'s slot without any checks
    unsafe fn slot_unchecked<const N: usize>(&self, col: usize) -> [u8; N] {
        let offset = self.layout.slot(col);
        // SAFETY: the caller guarantees the cursor is positioned on a row.
        let row = unsafe { self.current.unwrap_unchecked() };
        // SAFETY: the caller guarantees `col` matches an N-byte slot of the
        // schema this row was encoded against, so the slot lies within the
        // row buffer.
        unsafe { row.as_ptr().add(offset).cast::<[u8; N]>().read_unaligned() }
    }

    /// # Safety
    /// Cursor on a row; column `col` is a non-NULL `Bool`.
    pub unsafe fn get_bool_unchecked(&self, col: usize) -> bool {
        // SAFETY: forwarded to the caller.
        let [byte] = unsafe { self.slot_unchecked::<1>(col) };
        byte != 0
    }

    /// # Safety
    /// Cursor on a row; column `col` is a non-NULL `Int16`.
    pub unsafe fn get_int16_unchecked(&self, col: usize) -> i16 {
        // SAFETY: forwarded to the caller.
        i16::from_le_bytes(unsafe { self.slot_unchecked(col) })
    }

    /// # Safety
    /// Cursor on a row; column `col` is a non-NULL `Int32`.
    pub unsafe fn get_int32_unchecked(&self, col: usize) -> i32 {
        // SAFETY: forwarded to the caller.
        i32::from_le_bytes(unsafe { self.slot_unchecked(col) })
    }

    /// # Safety
    /// Cursor on a row; column `col` is a non-NULL `Int64`.
    pub unsafe fn get_int64_unchecked(&self, col: usize) -> i64 {
        // SAFETY: forwarded to the caller.
        i64::from_le_bytes(unsafe { self.slot_unchecked(col) })
    }

    /// # Safety
    /// Cursor on a row; column `col` is a non-NULL `Float`.
    pub unsafe fn get_float_unchecked(&self, col: usize) -> f32 {
        // SAFETY: forwarded to the caller.
        f32::from_bits(u32::from_le_bytes(unsafe { self.slot_unchecked(col) }))
    }

    /// # Safety
    /// Cursor on a row; column `col` is a non-NULL `Double`.
    pub unsafe fn get_double_unchecked(&self, col: usize) -> f64 {
        // SAFETY: forwarded to the caller.
        f64::from_bits(u64::from_le_bytes(unsafe { self.slot_unchecked(col) }))
    }

    /// # Safety
    /// Cursor on a row; column `col` is a non-NULL `Timestamp`.
    pub unsafe fn get_timestamp_unchecked(&self, col: usize) -> i64 {
        // SAFETY: forwarded to the caller.
        i64::from_le_bytes(unsafe { self.slot_unchecked(col) })
    }

    /// # Safety
    /// Cursor on a row; column `col` is a non-NULL `Date`.
    pub unsafe fn get_date_unchecked(&self, col: usize) -> i32 {
        // SAFETY: forwarded to the caller.
        i32::from_le_bytes(unsafe { self.slot_unchecked(col) })
    }

    /// # Safety
    /// Cursor on a row; column `col` is a non-NULL `String` whose body was
    /// written by a conforming encoder (in-bounds offsets, UTF-8 body).
    pub unsafe fn get_string_unchecked(&self, col: usize) -> &'a str {
        // SAFETY: the caller guarantees the cursor is positioned on a row.
        let row = unsafe { self.current.unwrap_unchecked() };
        // SAFETY: forwarded to the caller: `col` is a String column, so its
        // slot holds the u32 body offset.
        let start = u32::from_le_bytes(unsafe { self.slot_unchecked(col) }) as usize;
        let end = match self.layout.next_str_slot(col) {
            Some(slot) => {
                // SAFETY: `slot` addresses the 4-byte slot of the next
                // string column of the same schema, within the row buffer.
                let raw = unsafe { row.as_ptr().add(slot).cast::<[u8; 4]>().read_unaligned() };
                u32::from_le_bytes(raw) as usize
            }
            None => row.len(),
        };
        // SAFETY: a conforming encoder wrote monotonic, in-bounds body
        // offsets, so `start..end` lies within the row.
        let bytes = unsafe { row.get_unchecked(start..end) };
        // SAFETY: a conforming encoder only writes `&str` bodies.
        unsafe { std::str::from_utf8_unchecked(bytes) }
    }
}
