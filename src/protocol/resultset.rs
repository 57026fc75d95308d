use crate::error::{Error, Result};
use crate::protocol::primitive::*;
use crate::protocol::row::EncodedRow;

/// Read the result payload header (row count), returning the rows region
pub fn read_resultset_header(payload: &[u8]) -> Result<(u32, &[u8])> {
    read_int_4(payload)
}

/// Write the result payload header
pub fn write_resultset_header(out: &mut Vec<u8>, row_count: u32) {
    write_int_4(out, row_count);
}

/// Append one finalized row to a result payload
pub fn write_row(out: &mut Vec<u8>, row: &EncodedRow) {
    write_bytes_fix(out, row.as_bytes());
}

/// Assemble a complete result payload from finalized rows
pub fn write_resultset(out: &mut Vec<u8>, rows: &[EncodedRow]) -> Result<()> {
    let count = u32::try_from(rows.len())
        .map_err(|_| Error::Size(format!("{} rows exceed the u32 wire limit", rows.len())))?;
    write_resultset_header(out, count);
    for row in rows {
        write_row(out, row);
    }
    Ok(())
}
