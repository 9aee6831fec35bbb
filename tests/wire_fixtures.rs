// SPDX-License-Identifier: AGPL-3.0-or-later

//! Single entry point for the literal-byte scenarios S1-S7 (`spec.md` §8),
//! mirroring the teacher's `tests/_unit_entry.rs` single-entry-point
//! aggregation pattern. Each scenario also has an inline
//! `#[cfg(test)] mod tests` case next to the codec it exercises; this file
//! re-runs them end to end through the crate's public surface
//! (`Message`/`Registry`) rather than the per-module internals.

use bytes::BytesMut;
use cql_native_protocol::{
    Message, ProtocolVersion, Registry, RequestOpcode, ResponseOpcode,
    catalog::{Consistency, QueryFlags},
    messages::{
        authenticate::Authenticate,
        execute::Execute,
        query::{Query, QueryBuilder},
        result::ResultBody,
    },
    query_options::QueryOptions,
    rows_metadata::{ColumnSpec, RowsMetadata},
};

fn round_trip(registry: &Registry, msg: &Message, version: ProtocolVersion) -> BytesMut {
    let codec = registry.codec_for(msg.opcode()).unwrap();
    let mut buf = BytesMut::new();
    codec.encode(msg, &mut buf, version).unwrap();
    assert_eq!(buf.len(), codec.encoded_length(msg, version).unwrap());
    let mut r = &buf[..];
    assert_eq!(&codec.decode(&mut r, version).unwrap(), msg);
    buf
}

#[test]
fn s1_authenticate_round_trip() {
    let registry = Registry::new();
    let msg = Message::Authenticate(Authenticate {
        authenticator: "dummy".into(),
    });
    let buf = round_trip(&registry, &msg, ProtocolVersion::V4);
    assert_eq!(&buf[..], &[0x00, 0x05, b'd', b'u', b'm', b'm', b'y']);
}

#[test]
fn s2_query_with_defaults_at_v3() {
    let registry = Registry::new();
    let msg = Message::Query(QueryBuilder::new("SELECT").build());
    let buf = round_trip(&registry, &msg, ProtocolVersion::V3);
    assert_eq!(
        &buf[..],
        &[0x00, 0x00, 0x00, 0x06, b'S', b'E', b'L', b'E', b'C', b'T', 0x00, 0x01, 0x00]
    );
}

#[test]
fn s3_query_with_full_options_at_v4() {
    let registry = Registry::new();
    let options = QueryOptions {
        consistency: Consistency::LocalQuorum,
        skip_metadata: true,
        page_size: Some(100),
        paging_state: Some(vec![0xCA, 0xFE, 0xBA, 0xBE]),
        serial_consistency: Consistency::LocalSerial,
        default_timestamp: 123,
        ..Default::default()
    };
    let msg = Message::Query(Query {
        query: "SELECT".into(),
        options,
    });
    round_trip(&registry, &msg, ProtocolVersion::V4);
}

#[test]
fn s4_query_with_keyspace_and_now_in_seconds_at_v5() {
    let registry = Registry::new();
    let msg = Message::Query(Query {
        query: "SELECT".into(),
        options: QueryOptions {
            keyspace: "ks1".into(),
            now_in_seconds: 123,
            ..Default::default()
        },
    });
    let buf = round_trip(&registry, &msg, ProtocolVersion::V5);
    let mut r = &buf[..];
    assert_eq!(cql_native_protocol::primitive::read_long_string(&mut r).unwrap(), "SELECT");
    let flags = cql_native_protocol::primitive::read_int(&mut r).unwrap() as u32;
    assert_eq!(
        flags,
        QueryFlags::WITH_KEYSPACE.bits() | QueryFlags::NOW_IN_SECONDS.bits()
    );
    assert_eq!(cql_native_protocol::primitive::read_string(&mut r).unwrap(), "ks1");
    assert_eq!(cql_native_protocol::primitive::read_int(&mut r).unwrap(), 123);
}

#[test]
fn s5_execute_with_keyspace_and_now_in_seconds_at_v5() {
    let registry = Registry::new();
    let msg = Message::Execute(Execute {
        query_id: vec![0x01, 0x02, 0x03, 0x04],
        result_metadata_id: Some(vec![0x05, 0x06, 0x07, 0x08]),
        options: QueryOptions {
            keyspace: "ks1".into(),
            now_in_seconds: 123,
            ..Default::default()
        },
    });
    round_trip(&registry, &msg, ProtocolVersion::V5);
}

#[test]
fn s6_batch_rejects_named_values_on_decode() {
    use cql_native_protocol::{
        catalog::BatchType,
        primitive::{write_byte, write_short},
    };

    let mut buf = BytesMut::new();
    write_byte(&mut buf, BatchType::Logged.as_u8());
    write_short(&mut buf, 0);
    write_short(&mut buf, Consistency::One.as_u16());
    write_byte(&mut buf, QueryFlags::VALUE_NAMES.bits() as u8);
    let mut r = &buf[..];
    let err = Message::decode(
        cql_native_protocol::Opcode::Request(RequestOpcode::Batch),
        &mut r,
        ProtocolVersion::V4,
    )
    .unwrap_err();
    assert!(matches!(err, cql_native_protocol::ProtocolError::InvalidFlagCombo(_)));
}

#[test]
fn s7_rows_result_with_metadata_changed_has_more_pages_global_tables_spec() {
    let registry = Registry::new();
    let metadata = RowsMetadata {
        column_count: 1,
        paging_state: Some(vec![0x01]),
        new_result_metadata_id: Some(vec![0xAA]),
        column_specs: Some(vec![ColumnSpec {
            keyspace: "ks".into(),
            table: "t".into(),
            name: "a".into(),
            index: 0,
            data_type: cql_native_protocol::datatype::DataType::Int,
        }]),
        ..Default::default()
    };
    let msg = Message::Result(ResultBody::Rows {
        metadata,
        rows: vec![vec![Some(vec![0, 0, 0, 1])], vec![None]],
    });
    round_trip(&registry, &msg, ProtocolVersion::V5);

    let codec = registry
        .codec_for(cql_native_protocol::Opcode::Response(ResponseOpcode::Result))
        .unwrap();
    let mut buf = BytesMut::new();
    codec.encode(&msg, &mut buf, ProtocolVersion::V5).unwrap();
    let mut r = &buf[..];
    let _result_kind = cql_native_protocol::primitive::read_int(&mut r).unwrap();
    let flags = cql_native_protocol::primitive::read_int(&mut r).unwrap() as u32;
    assert_eq!(flags, 0x0B);
}
