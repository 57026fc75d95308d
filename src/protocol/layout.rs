use crate::constant::{ColumnType, ROW_HEADER_LEN};
use crate::schema::Schema;

/// Precomputed byte layout of one encoded row for a schema.
///
/// Shared by the encoder (slot writes) and the cursor (slot reads), so both
/// sides agree on where every column lives without walking the schema per
/// field access.
#[derive(Debug, Clone)]
pub(crate) struct RowLayout {
    /// Per column: absolute offset of its slot from the row start
    slots: Box<[usize]>,
    /// Per string column: slot offset of the next string column in schema
    /// order. A string body's length is the next body's offset minus its
    /// own; the last body ends at the total row size.
    next_str_slot: Box<[Option<usize>]>,
    bitmap_len: usize,
    /// Header + bitmap + slot region; also where string bodies begin
    base_size: usize,
    str_field_cnt: usize,
}

impl RowLayout {
    pub(crate) fn new(schema: &Schema) -> Self {
        let ncols = schema.column_count();
        let bitmap_len = (ncols + 7) >> 3;

        let mut offset = ROW_HEADER_LEN + bitmap_len;
        let mut slots = Vec::with_capacity(ncols);
        let mut str_field_cnt = 0;
        for col in schema.columns() {
            slots.push(offset);
            offset += col.column_type.slot_size();
            if col.column_type == ColumnType::String {
                str_field_cnt += 1;
            }
        }

        let mut next_str_slot = vec![None; ncols];
        let mut next = None;
        for (idx, col) in schema.columns().iter().enumerate().rev() {
            if col.column_type == ColumnType::String {
                next_str_slot[idx] = next;
                next = Some(slots[idx]);
            }
        }

        Self {
            slots: slots.into_boxed_slice(),
            next_str_slot: next_str_slot.into_boxed_slice(),
            bitmap_len,
            base_size: offset,
            str_field_cnt,
        }
    }

    /// Absolute slot offset of the column. The index must be in range.
    pub(crate) fn slot(&self, index: usize) -> usize {
        self.slots[index]
    }

    pub(crate) fn next_str_slot(&self, index: usize) -> Option<usize> {
        self.next_str_slot[index]
    }

    pub(crate) fn bitmap_len(&self) -> usize {
        self.bitmap_len
    }

    pub(crate) fn base_size(&self) -> usize {
        self.base_size
    }

    pub(crate) fn str_field_cnt(&self) -> usize {
        self.str_field_cnt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;

    #[test]
    fn slot_offsets() {
        // header (5) + bitmap (1) = 6; i64 slot at 6, string slot at 14,
        // bool slot at 18, second string slot at 19; bodies from 20.
        let schema = Schema::new(vec![
            ColumnDef::new("a", ColumnType::Int64),
            ColumnDef::new("b", ColumnType::String),
            ColumnDef::new("c", ColumnType::Bool),
            ColumnDef::new("d", ColumnType::String),
        ]);
        let layout = RowLayout::new(&schema);
        assert_eq!(layout.bitmap_len(), 1);
        assert_eq!(layout.slot(0), 6);
        assert_eq!(layout.slot(1), 14);
        assert_eq!(layout.slot(2), 18);
        assert_eq!(layout.slot(3), 19);
        assert_eq!(layout.base_size(), 23);
        assert_eq!(layout.str_field_cnt(), 2);
        assert_eq!(layout.next_str_slot(1), Some(19));
        assert_eq!(layout.next_str_slot(3), None);
    }

    #[test]
    fn bitmap_rounds_up() {
        let columns = (0..9)
            .map(|i| ColumnDef::new(format!("c{i}"), ColumnType::Int32))
            .collect();
        let layout = RowLayout::new(&Schema::new(columns));
        assert_eq!(layout.bitmap_len(), 2);
        assert_eq!(layout.base_size(), 5 + 2 + 9 * 4);
    }
}
