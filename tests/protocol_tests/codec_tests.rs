//! Codec Tests
//!
//! Tests for command payload encoding and response decoding.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arrow::array::Int64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use cupiddb::protocol::{
    decode_deleted_count, decode_exists, decode_float, decode_int, decode_keys, decode_set,
    decode_table, decode_ttl, decode_value, encode_command, Command, ErrorCode, MessageType,
    Response,
};
use cupiddb::table::encode_table;
use cupiddb::{CupidError, FilterOp, FilterValue, Query, RowFilter, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn response(tag: &[u8; 2], payload: &[u8]) -> Response {
    Response::new(*tag, payload.to_vec())
}

fn error_response(code: u16) -> Response {
    Response::error(ErrorCode::from_u16(code))
}

fn small_table() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, false)]));
    RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1, 2, 3]))]).unwrap()
}

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_set_integer() {
    let cmd = Command::Set {
        key: "k".to_string(),
        value: Value::Integer(42),
        ttl: Duration::from_millis(1500),
    };
    let payload = encode_command(&cmd).unwrap();

    let mut expected = 1500u64.to_be_bytes().to_vec();
    expected.extend_from_slice(&1u16.to_be_bytes());
    expected.push(b'k');
    expected.push(b'I');
    expected.extend_from_slice(&42i64.to_be_bytes());
    assert_eq!(payload, expected);
}

#[test]
fn test_encode_set_float_no_ttl() {
    let cmd = Command::Set {
        key: "pi".to_string(),
        value: Value::Float(3.5),
        ttl: Duration::ZERO,
    };
    let payload = encode_command(&cmd).unwrap();

    assert_eq!(&payload[..8], &[0u8; 8]);
    assert_eq!(&payload[8..10], &[0, 2]);
    assert_eq!(&payload[10..12], b"pi");
    assert_eq!(payload[12], b'F');
    assert_eq!(&payload[13..], &3.5f64.to_be_bytes());
}

#[test]
fn test_encode_set_blob_and_table() {
    let blob = Command::Set {
        key: "b".to_string(),
        value: Value::Blob(Bytes::from_static(b"\x01\x02")),
        ttl: Duration::ZERO,
    };
    let payload = encode_command(&blob).unwrap();
    assert_eq!(payload[11], b'B');
    assert_eq!(&payload[12..], b"\x01\x02");

    let table = small_table();
    let cmd = Command::Set {
        key: "t".to_string(),
        value: Value::Table(table.clone()),
        ttl: Duration::ZERO,
    };
    let payload = encode_command(&cmd).unwrap();
    assert_eq!(payload[11], b'A');
    assert_eq!(&payload[12..], &encode_table(&table).unwrap()[..]);
}

#[test]
fn test_encode_set_ttl_truncates_to_millis() {
    let cmd = Command::Set {
        key: "k".to_string(),
        value: Value::Integer(1),
        ttl: Duration::from_micros(2_999),
    };
    let payload = encode_command(&cmd).unwrap();

    assert_eq!(&payload[..8], &2u64.to_be_bytes());
}

#[test]
fn test_encode_incr() {
    let cmd = Command::IncrInt {
        key: "counter".to_string(),
        delta: -3,
    };
    let payload = encode_command(&cmd).unwrap();
    assert_eq!(&payload[..8], &(-3i64).to_be_bytes());
    assert_eq!(&payload[8..], b"counter");

    let cmd = Command::IncrFloat {
        key: "gauge".to_string(),
        delta: 0.25,
    };
    let payload = encode_command(&cmd).unwrap();
    assert_eq!(&payload[..8], &0.25f64.to_be_bytes());
    assert_eq!(&payload[8..], b"gauge");
}

#[test]
fn test_encode_key_only_commands() {
    for cmd in [
        Command::Get { key: "abc".to_string() },
        Command::Delete { key: "abc".to_string() },
        Command::Ttl { key: "abc".to_string() },
    ] {
        assert_eq!(encode_command(&cmd).unwrap(), b"abc");
    }
}

#[test]
fn test_encode_touch() {
    let cmd = Command::Touch {
        key: "k".to_string(),
        ttl: Duration::from_secs(10),
    };
    let payload = encode_command(&cmd).unwrap();

    assert_eq!(&payload[..8], &10_000u64.to_be_bytes());
    assert_eq!(&payload[8..], b"k");
}

#[test]
fn test_encode_delete_many_separator() {
    let cmd = Command::DeleteMany {
        keys: vec!["a".to_string(), "bb".to_string(), "c".to_string()],
    };
    assert_eq!(encode_command(&cmd).unwrap(), b"a\0bb\0c");

    let cmd = Command::DeleteMany { keys: vec![] };
    assert!(encode_command(&cmd).unwrap().is_empty());
}

#[test]
fn test_encode_keys_pattern() {
    assert!(encode_command(&Command::Keys { pattern: None }).unwrap().is_empty());

    let cmd = Command::Keys {
        pattern: Some("user_*".to_string()),
    };
    assert_eq!(encode_command(&cmd).unwrap(), b"user_*");
}

#[test]
fn test_encode_get_table_query_json() {
    let query = Query::new("df")
        .columns(["c2"])
        .filter(RowFilter::new("c3", FilterOp::Lte, FilterValue::Int(5)))
        .cache_for(Duration::from_secs(1));
    let payload = encode_command(&Command::GetTable(query)).unwrap();

    assert_eq!(
        String::from_utf8(payload).unwrap(),
        r#"{"key":"df","columns":["c2"],"filterlogic":"AND","filter":[{"col":"c3","filter_type":"lte","data_type":"IN","value":5}],"cachetime":1000}"#
    );
}

#[test]
fn test_encode_rejects_long_key() {
    let long_key = "x".repeat(65536);
    let err = encode_command(&Command::Get { key: long_key }).unwrap_err();
    assert!(matches!(err, CupidError::KeyTooLong { len: 65536, max: 65535 }));

    let max_key = "x".repeat(65535);
    assert!(encode_command(&Command::Get { key: max_key }).is_ok());
}

#[test]
fn test_encode_delete_many_limits() {
    let cmd = Command::DeleteMany {
        keys: vec!["ok".to_string(), "y".repeat(70_000)],
    };
    assert!(matches!(
        encode_command(&cmd).unwrap_err(),
        CupidError::KeyTooLong { .. }
    ));

    let cmd = Command::DeleteMany {
        keys: (0..65536).map(|i| i.to_string()).collect(),
    };
    assert!(matches!(
        encode_command(&cmd).unwrap_err(),
        CupidError::TooManyKeys { count: 65536, .. }
    ));
}

// =============================================================================
// Response Decoding Tests
// =============================================================================

#[test]
fn test_decode_set() {
    assert!(decode_set(&response(b"OK", b"")).unwrap());
    assert!(matches!(
        decode_set(&error_response(1)).unwrap_err(),
        CupidError::SetFailed
    ));
}

#[test]
fn test_decode_incr_results() {
    assert_eq!(decode_int(&response(b"IN", &(-7i64).to_be_bytes())).unwrap(), -7);
    assert_eq!(decode_float(&response(b"FL", &1.5f64.to_be_bytes())).unwrap(), 1.5);

    assert!(matches!(
        decode_int(&error_response(5)).unwrap_err(),
        CupidError::InvalidDataType
    ));
    assert!(matches!(
        decode_float(&error_response(5)).unwrap_err(),
        CupidError::InvalidDataType
    ));
}

#[test]
fn test_decode_int_wrong_length() {
    let err = decode_int(&response(b"IN", &[0, 1, 2])).unwrap_err();
    assert!(matches!(
        err,
        CupidError::MalformedPayload { tag: "IN", expected: 8, actual: 3 }
    ));
}

#[test]
fn test_decode_exists() {
    assert!(decode_exists(MessageType::Delete, &response(b"OK", b"")).unwrap());
    assert!(!decode_exists(MessageType::Delete, &error_response(2)).unwrap());
    assert!(!decode_exists(MessageType::Touch, &error_response(2)).unwrap());
    assert!(matches!(
        decode_exists(MessageType::Touch, &error_response(9)).unwrap_err(),
        CupidError::Server(9)
    ));
}

#[test]
fn test_decode_deleted_count() {
    assert_eq!(decode_deleted_count(&response(b"DM", &[0, 3])).unwrap(), 3);
    assert_eq!(decode_deleted_count(&response(b"DM", &[0x01, 0x00])).unwrap(), 256);
}

#[test]
fn test_decode_ttl() {
    assert_eq!(decode_ttl(&response(b"TL", &0u64.to_be_bytes())).unwrap(), Some(0.0));
    assert_eq!(
        decode_ttl(&response(b"TL", &9_500u64.to_be_bytes())).unwrap(),
        Some(9.5)
    );
    assert_eq!(decode_ttl(&error_response(2)).unwrap(), None);
}

#[test]
fn test_decode_keys() {
    assert!(decode_keys(&response(b"KY", b"")).unwrap().is_empty());
    assert_eq!(decode_keys(&response(b"KY", b"solo")).unwrap(), vec!["solo"]);
    assert_eq!(
        decode_keys(&response(b"KY", b"a\0b\0c")).unwrap(),
        vec!["a", "b", "c"]
    );
}

#[test]
fn test_decode_value_kinds() {
    let v = decode_value(&response(b"IN", &42i64.to_be_bytes())).unwrap();
    assert_eq!(v, Some(Value::Integer(42)));

    let v = decode_value(&response(b"FL", &2.75f64.to_be_bytes())).unwrap();
    assert_eq!(v, Some(Value::Float(2.75)));

    let v = decode_value(&response(b"BY", b"\x05\x06")).unwrap();
    assert_eq!(v, Some(Value::Blob(Bytes::from_static(b"\x05\x06"))));

    let table = small_table();
    let v = decode_value(&response(b"AR", &encode_table(&table).unwrap())).unwrap();
    assert_eq!(v, Some(Value::Table(table)));

    assert_eq!(decode_value(&error_response(2)).unwrap(), None);
}

#[test]
fn test_decode_table_without_metadata() {
    let table = small_table();
    let mut payload = 0u32.to_be_bytes().to_vec();
    payload.extend_from_slice(&encode_table(&table).unwrap());

    let decoded = decode_table(&response(b"AR", &payload)).unwrap().unwrap();
    assert_eq!(decoded, table);
    assert!(decoded.schema().metadata().is_empty());
}

#[test]
fn test_decode_table_with_metadata() {
    let table = small_table();
    let metadata = br#"{"pandas":"index-info","owner":"tests"}"#;
    let mut payload = (metadata.len() as u32).to_be_bytes().to_vec();
    payload.extend_from_slice(metadata);
    payload.extend_from_slice(&encode_table(&table).unwrap());

    let decoded = decode_table(&response(b"AR", &payload)).unwrap().unwrap();

    let expected: HashMap<String, String> = [
        ("pandas".to_string(), "index-info".to_string()),
        ("owner".to_string(), "tests".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(decoded.schema().metadata(), &expected);
    assert_eq!(decoded.column(0), table.column(0));
}

#[test]
fn test_decode_table_metadata_length_is_unsigned() {
    // 0xFFFFFFFF would be -1 if read as signed
    let mut payload = u32::MAX.to_be_bytes().to_vec();
    payload.extend_from_slice(b"{}");

    let err = decode_table(&response(b"AR", &payload)).unwrap_err();
    assert!(matches!(err, CupidError::MalformedPayload { tag: "AR", .. }));
}

#[test]
fn test_decode_table_errors() {
    assert_eq!(decode_table(&error_response(2)).unwrap(), None);
    assert!(matches!(
        decode_table(&error_response(3)).unwrap_err(),
        CupidError::InvalidQuery
    ));
    assert!(matches!(
        decode_table(&error_response(4)).unwrap_err(),
        CupidError::InvalidTableData
    ));
}

#[test]
fn test_decode_unexpected_tag() {
    match decode_int(&response(b"OK", b"")).unwrap_err() {
        CupidError::UnexpectedResponse { command, tag } => {
            assert_eq!(command, MessageType::IncrInt);
            assert_eq!(tag, "OK");
        }
        other => panic!("Expected UnexpectedResponse, got {:?}", other),
    }

    assert!(matches!(
        decode_keys(&response(b"ZZ", b"")).unwrap_err(),
        CupidError::UnexpectedResponse { .. }
    ));
}

#[test]
fn test_decode_error_code_wrong_length() {
    let err = decode_set(&response(b"ER", &[0, 0, 1])).unwrap_err();
    assert!(matches!(
        err,
        CupidError::MalformedPayload { tag: "ER", expected: 2, actual: 3 }
    ));
}

#[test]
fn test_error_code_mapping() {
    let cases = [
        (1, "Set failed"),
        (2, "Key not found"),
        (3, "Invalid query"),
        (4, "Invalid table data"),
        (5, "Invalid data type for this operation"),
        (42, "Server error code 42"),
    ];
    for (code, message) in cases {
        let err: CupidError = ErrorCode::from_u16(code).into();
        assert_eq!(err.to_string(), message);
        assert!(!err.is_fatal());
        assert_eq!(ErrorCode::from_u16(code).as_u16(), code);
    }
}
