pub mod constant;
pub mod error;
pub mod job;
pub mod protocol;
pub mod schema;
pub mod value;

pub use protocol::{ResultCursor, RowEncoder};
pub use schema::{ColumnDef, Schema};
