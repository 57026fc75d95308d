use crate::constant::ColumnType;
use crate::error::Error;
use crate::protocol::cursor::ResultCursor;
use crate::protocol::encoder::RowEncoder;
use crate::protocol::resultset::{write_resultset, write_resultset_header};
use crate::protocol::row::EncodedRow;
use crate::schema::{ColumnDef, Schema};
use crate::value::Value;

fn two_col_schema() -> Schema {
    Schema::new(vec![
        ColumnDef::new("col1", ColumnType::Int64),
        ColumnDef::new("col2", ColumnType::String),
    ])
}

fn encode_pair(schema: &Schema, v: i64, s: &str) -> EncodedRow {
    let mut encoder = RowEncoder::new(schema, s.len()).unwrap();
    encoder.append_int64(v).unwrap();
    encoder.append_string(s).unwrap();
    encoder.build().unwrap()
}

fn two_row_payload(schema: &Schema) -> Vec<u8> {
    let rows = [
        encode_pair(schema, 1000, "hello"),
        encode_pair(schema, 1001, "world"),
    ];
    let mut payload = Vec::new();
    write_resultset(&mut payload, &rows).unwrap();
    payload
}

#[test]
fn empty_payload() {
    let schema = two_col_schema();
    let payload = 0u32.to_le_bytes();
    let mut cursor = ResultCursor::new(&schema, &payload).unwrap();
    assert_eq!(cursor.size(), 0);
    assert!(!cursor.next());
    assert!(!cursor.next());
}

#[test]
fn iterates_rows_in_order() {
    let schema = two_col_schema();
    let payload = two_row_payload(&schema);
    let mut cursor = ResultCursor::new(&schema, &payload).unwrap();

    assert_eq!(cursor.size(), 2);
    assert_eq!(cursor.schema().column_count(), 2);
    assert_eq!(cursor.schema().column_type(0), Some(ColumnType::Int64));
    assert_eq!(cursor.schema().column_type(1), Some(ColumnType::String));

    assert!(cursor.next());
    assert_eq!(cursor.get_int64(0).unwrap(), 1000);
    assert_eq!(cursor.get_string(1).unwrap(), "hello");

    assert!(cursor.next());
    assert_eq!(cursor.get_int64(0).unwrap(), 1001);
    assert_eq!(cursor.get_string(1).unwrap(), "world");

    assert!(!cursor.next());
}

#[test]
fn unchecked_accessors_match_checked() {
    let schema = two_col_schema();
    let payload = two_row_payload(&schema);
    let mut cursor = ResultCursor::new(&schema, &payload).unwrap();

    while cursor.next() {
        // SAFETY: the cursor is on a row, column 0 is Int64 and column 1 is
        // String, and neither is NULL.
        let (v, s) = unsafe {
            (
                cursor.get_int64_unchecked(0),
                cursor.get_string_unchecked(1),
            )
        };
        assert_eq!(v, cursor.get_int64(0).unwrap());
        assert_eq!(s, cursor.get_string(1).unwrap());
    }
}

#[test]
fn accessor_before_first_next_is_out_of_range() {
    let schema = two_col_schema();
    let payload = two_row_payload(&schema);
    let cursor = ResultCursor::new(&schema, &payload).unwrap();
    assert!(matches!(cursor.get_int64(0), Err(Error::OutOfRange(_))));
    assert!(matches!(cursor.value(0), Err(Error::OutOfRange(_))));
    assert!(matches!(cursor.is_null(0), Err(Error::OutOfRange(_))));
}

#[test]
fn accessor_after_exhaustion_is_out_of_range() {
    let schema = two_col_schema();
    let payload = two_row_payload(&schema);
    let mut cursor = ResultCursor::new(&schema, &payload).unwrap();
    while cursor.next() {}
    assert!(matches!(cursor.get_int64(0), Err(Error::OutOfRange(_))));
}

#[test]
fn exhaustion_is_terminal() {
    let schema = two_col_schema();
    let payload = two_row_payload(&schema);
    let mut cursor = ResultCursor::new(&schema, &payload).unwrap();
    assert!(cursor.next());
    assert!(cursor.next());
    for _ in 0..3 {
        assert!(!cursor.next());
    }
}

#[test]
fn wrong_type_accessor_is_type_mismatch() {
    let schema = two_col_schema();
    let payload = two_row_payload(&schema);
    let mut cursor = ResultCursor::new(&schema, &payload).unwrap();
    assert!(cursor.next());
    assert!(matches!(
        cursor.get_string(0),
        Err(Error::TypeMismatch {
            index: 0,
            declared: ColumnType::Int64,
            requested: ColumnType::String,
        })
    ));
    assert!(matches!(
        cursor.get_int64(1),
        Err(Error::TypeMismatch { index: 1, .. })
    ));
}

#[test]
fn bad_column_index_is_out_of_range() {
    let schema = two_col_schema();
    let payload = two_row_payload(&schema);
    let mut cursor = ResultCursor::new(&schema, &payload).unwrap();
    assert!(cursor.next());
    assert!(matches!(cursor.get_int64(2), Err(Error::OutOfRange(_))));
    assert!(matches!(cursor.is_null(9), Err(Error::OutOfRange(_))));
}

#[test]
fn null_columns() {
    let schema = two_col_schema();
    let mut encoder = RowEncoder::new(&schema, 0).unwrap();
    encoder.append_null().unwrap();
    encoder.append_null().unwrap();
    let mut payload = Vec::new();
    write_resultset(&mut payload, &[encoder.build().unwrap()]).unwrap();

    let mut cursor = ResultCursor::new(&schema, &payload).unwrap();
    assert!(cursor.next());
    assert!(cursor.is_null(0).unwrap());
    assert!(cursor.is_null(1).unwrap());
    assert_eq!(cursor.value(0).unwrap(), Value::Null);
    assert_eq!(cursor.value(1).unwrap(), Value::Null);
    assert!(matches!(cursor.get_int64(0), Err(Error::NullValue(0))));
    assert!(matches!(cursor.get_string(1), Err(Error::NullValue(1))));
}

#[test]
fn truncated_payload_is_rejected() {
    let schema = two_col_schema();
    let payload = two_row_payload(&schema);
    assert!(ResultCursor::new(&schema, &payload[..payload.len() - 1]).is_err());
    assert!(ResultCursor::new(&schema, &payload[..6]).is_err());
    assert!(matches!(
        ResultCursor::new(&schema, &[1, 2]),
        Err(Error::UnexpectedEof)
    ));
}

#[test]
fn wrong_version_is_invalid_payload() {
    let schema = two_col_schema();
    let mut payload = two_row_payload(&schema);
    payload[4] = 99; // first row's version byte
    assert!(matches!(
        ResultCursor::new(&schema, &payload),
        Err(Error::InvalidPayload)
    ));
}

#[test]
fn trailing_bytes_are_invalid_payload() {
    let schema = two_col_schema();
    let mut payload = two_row_payload(&schema);
    payload.push(0);
    assert!(matches!(
        ResultCursor::new(&schema, &payload),
        Err(Error::InvalidPayload)
    ));
}

#[test]
fn count_beyond_rows_is_rejected() {
    let schema = two_col_schema();
    let row = encode_pair(&schema, 1, "x");
    let mut payload = Vec::new();
    write_resultset_header(&mut payload, 2);
    payload.extend_from_slice(row.as_bytes());
    assert!(ResultCursor::new(&schema, &payload).is_err());
}

#[test]
fn empty_and_null_strings() {
    let schema = Schema::new(vec![
        ColumnDef::new("a", ColumnType::String),
        ColumnDef::new("b", ColumnType::String),
        ColumnDef::new("c", ColumnType::String),
    ]);
    let mut encoder = RowEncoder::new(&schema, 4).unwrap();
    encoder.append_string("").unwrap();
    encoder.append_null().unwrap();
    encoder.append_string("tail").unwrap();
    let mut payload = Vec::new();
    write_resultset(&mut payload, &[encoder.build().unwrap()]).unwrap();

    let mut cursor = ResultCursor::new(&schema, &payload).unwrap();
    assert!(cursor.next());
    assert_eq!(cursor.get_string(0).unwrap(), "");
    assert!(cursor.is_null(1).unwrap());
    assert_eq!(cursor.get_string(2).unwrap(), "tail");
}

#[test]
fn every_column_type_round_trips() {
    let schema = Schema::new(vec![
        ColumnDef::new("b", ColumnType::Bool),
        ColumnDef::new("i16", ColumnType::Int16),
        ColumnDef::new("i32", ColumnType::Int32),
        ColumnDef::new("i64", ColumnType::Int64),
        ColumnDef::new("f", ColumnType::Float),
        ColumnDef::new("d", ColumnType::Double),
        ColumnDef::new("ts", ColumnType::Timestamp),
        ColumnDef::new("date", ColumnType::Date),
        ColumnDef::new("s", ColumnType::String),
    ]);
    let mut encoder = RowEncoder::new(&schema, 3).unwrap();
    encoder.append_bool(true).unwrap();
    encoder.append_int16(-12).unwrap();
    encoder.append_int32(-100_000).unwrap();
    encoder.append_int64(i64::MIN).unwrap();
    encoder.append_float(2.5).unwrap();
    encoder.append_double(-0.125).unwrap();
    encoder.append_timestamp(1_600_000_000_000).unwrap();
    encoder.append_date(20_200_101).unwrap();
    encoder.append_string("abc").unwrap();
    let mut payload = Vec::new();
    write_resultset(&mut payload, &[encoder.build().unwrap()]).unwrap();

    let mut cursor = ResultCursor::new(&schema, &payload).unwrap();
    assert!(cursor.next());
    assert_eq!(cursor.value(0).unwrap(), Value::Bool(true));
    assert_eq!(cursor.value(1).unwrap(), Value::Int16(-12));
    assert_eq!(cursor.value(2).unwrap(), Value::Int32(-100_000));
    assert_eq!(cursor.value(3).unwrap(), Value::Int64(i64::MIN));
    assert_eq!(cursor.value(4).unwrap(), Value::Float(2.5));
    assert_eq!(cursor.value(5).unwrap(), Value::Double(-0.125));
    assert_eq!(cursor.value(6).unwrap(), Value::Timestamp(1_600_000_000_000));
    assert_eq!(cursor.value(7).unwrap(), Value::Date(20_200_101));
    assert_eq!(cursor.value(8).unwrap(), Value::String("abc"));

    assert!(cursor.get_bool(0).unwrap());
    assert_eq!(cursor.get_int16(1).unwrap(), -12);
    assert_eq!(cursor.get_int32(2).unwrap(), -100_000);
    assert_eq!(cursor.get_int64(3).unwrap(), i64::MIN);
    assert_eq!(cursor.get_float(4).unwrap(), 2.5);
    assert_eq!(cursor.get_double(5).unwrap(), -0.125);
    assert_eq!(cursor.get_timestamp(6).unwrap(), 1_600_000_000_000);
    assert_eq!(cursor.get_date(7).unwrap(), 20_200_101);
    assert_eq!(cursor.get_string(8).unwrap(), "abc");

    // SAFETY: on a row; every index below matches its declared type and is
    // not NULL.
    unsafe {
        assert!(cursor.get_bool_unchecked(0));
        assert_eq!(cursor.get_int16_unchecked(1), -12);
        assert_eq!(cursor.get_int32_unchecked(2), -100_000);
        assert_eq!(cursor.get_int64_unchecked(3), i64::MIN);
        assert_eq!(cursor.get_float_unchecked(4), 2.5);
        assert_eq!(cursor.get_double_unchecked(5), -0.125);
        assert_eq!(cursor.get_timestamp_unchecked(6), 1_600_000_000_000);
        assert_eq!(cursor.get_date_unchecked(7), 20_200_101);
        assert_eq!(cursor.get_string_unchecked(8), "abc");
    }
    assert!(!cursor.next());
}
