pub mod cursor;
pub mod encoder;
mod layout;
pub mod primitive;
pub mod resultset;
mod row;

pub use cursor::ResultCursor;
pub use encoder::RowEncoder;
pub use row::{EncodedRow, RowHeader};

#[cfg(test)]
mod cursor_test;
