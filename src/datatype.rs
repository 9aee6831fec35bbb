// SPDX-License-Identifier: AGPL-3.0-or-later

//! Data-Type Codec (component C): CQL type descriptors embedded in
//! `RowsMetadata` column specs (`spec.md` §6). Named an external
//! collaborator in the distilled spec; implemented here per SPEC_FULL.md §6
//! since no crate in the dependency corpus already speaks this wire format.
//! Only the type *descriptor* is in scope — marshalling actual column
//! values is out of scope (they travel as opaque `bytes` in ROWS, per
//! `spec.md` §4.F.7).

use bytes::{Buf, BufMut};
use tracing::warn;

use crate::{
    error::{ProtocolError, Result},
    primitive::{read_short, read_string, write_short, write_string},
};

/// A CQL column type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Custom(String),
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    Text,
    Timestamp,
    Uuid,
    Varchar,
    Varint,
    Timeuuid,
    Inet,
    Date,
    Time,
    Smallint,
    Tinyint,
    Duration,
    List(Box<DataType>),
    Map(Box<DataType>, Box<DataType>),
    Set(Box<DataType>),
    Udt {
        keyspace: String,
        name: String,
        fields: Vec<(String, DataType)>,
    },
    Tuple(Vec<DataType>),
}

const CUSTOM: u16 = 0x0000;
const ASCII: u16 = 0x0001;
const BIGINT: u16 = 0x0002;
const BLOB: u16 = 0x0003;
const BOOLEAN: u16 = 0x0004;
const COUNTER: u16 = 0x0005;
const DECIMAL: u16 = 0x0006;
const DOUBLE: u16 = 0x0007;
const FLOAT: u16 = 0x0008;
const INT: u16 = 0x0009;
const TEXT: u16 = 0x000A;
const TIMESTAMP: u16 = 0x000B;
const UUID: u16 = 0x000C;
const VARCHAR: u16 = 0x000D;
const VARINT: u16 = 0x000E;
const TIMEUUID: u16 = 0x000F;
const INET: u16 = 0x0010;
const DATE: u16 = 0x0011;
const TIME: u16 = 0x0012;
const SMALLINT: u16 = 0x0013;
const TINYINT: u16 = 0x0014;
const DURATION: u16 = 0x0015;
const LIST: u16 = 0x0020;
const MAP: u16 = 0x0021;
const SET: u16 = 0x0022;
const UDT: u16 = 0x0030;
const TUPLE: u16 = 0x0031;

impl DataType {
    pub fn encode(&self, sink: &mut impl BufMut) {
        match self {
            DataType::Custom(class) => {
                write_short(sink, CUSTOM);
                write_string(sink, class);
            },
            DataType::Ascii => write_short(sink, ASCII),
            DataType::Bigint => write_short(sink, BIGINT),
            DataType::Blob => write_short(sink, BLOB),
            DataType::Boolean => write_short(sink, BOOLEAN),
            DataType::Counter => write_short(sink, COUNTER),
            DataType::Decimal => write_short(sink, DECIMAL),
            DataType::Double => write_short(sink, DOUBLE),
            DataType::Float => write_short(sink, FLOAT),
            DataType::Int => write_short(sink, INT),
            DataType::Text => write_short(sink, TEXT),
            DataType::Timestamp => write_short(sink, TIMESTAMP),
            DataType::Uuid => write_short(sink, UUID),
            DataType::Varchar => write_short(sink, VARCHAR),
            DataType::Varint => write_short(sink, VARINT),
            DataType::Timeuuid => write_short(sink, TIMEUUID),
            DataType::Inet => write_short(sink, INET),
            DataType::Date => write_short(sink, DATE),
            DataType::Time => write_short(sink, TIME),
            DataType::Smallint => write_short(sink, SMALLINT),
            DataType::Tinyint => write_short(sink, TINYINT),
            DataType::Duration => write_short(sink, DURATION),
            DataType::List(elem) => {
                write_short(sink, LIST);
                elem.encode(sink);
            },
            DataType::Map(k, v) => {
                write_short(sink, MAP);
                k.encode(sink);
                v.encode(sink);
            },
            DataType::Set(elem) => {
                write_short(sink, SET);
                elem.encode(sink);
            },
            DataType::Udt {
                keyspace,
                name,
                fields,
            } => {
                write_short(sink, UDT);
                write_string(sink, keyspace);
                write_string(sink, name);
                write_short(sink, fields.len() as u16);
                for (field_name, ty) in fields {
                    write_string(sink, field_name);
                    ty.encode(sink);
                }
            },
            DataType::Tuple(elems) => {
                write_short(sink, TUPLE);
                write_short(sink, elems.len() as u16);
                for ty in elems {
                    ty.encode(sink);
                }
            },
        }
    }

    pub fn encoded_len(&self) -> usize {
        2 + match self {
            DataType::Custom(class) => crate::primitive::string_len(class),
            DataType::List(elem) | DataType::Set(elem) => elem.encoded_len(),
            DataType::Map(k, v) => k.encoded_len() + v.encoded_len(),
            DataType::Udt {
                keyspace,
                name,
                fields,
            } => {
                crate::primitive::string_len(keyspace)
                    + crate::primitive::string_len(name)
                    + 2
                    + fields
                        .iter()
                        .map(|(n, t)| crate::primitive::string_len(n) + t.encoded_len())
                        .sum::<usize>()
            },
            DataType::Tuple(elems) => {
                2 + elems.iter().map(|t| t.encoded_len()).sum::<usize>()
            },
            _ => 0,
        }
    }

    pub fn decode(src: &mut impl Buf) -> Result<Self> {
        let code = read_short(src)?;
        Ok(match code {
            CUSTOM => DataType::Custom(read_string(src)?),
            ASCII => DataType::Ascii,
            BIGINT => DataType::Bigint,
            BLOB => DataType::Blob,
            BOOLEAN => DataType::Boolean,
            COUNTER => DataType::Counter,
            DECIMAL => DataType::Decimal,
            DOUBLE => DataType::Double,
            FLOAT => DataType::Float,
            INT => DataType::Int,
            TEXT => DataType::Text,
            TIMESTAMP => DataType::Timestamp,
            UUID => DataType::Uuid,
            VARCHAR => DataType::Varchar,
            VARINT => DataType::Varint,
            TIMEUUID => DataType::Timeuuid,
            INET => DataType::Inet,
            DATE => DataType::Date,
            TIME => DataType::Time,
            SMALLINT => DataType::Smallint,
            TINYINT => DataType::Tinyint,
            DURATION => DataType::Duration,
            LIST => DataType::List(Box::new(DataType::decode(src)?)),
            MAP => {
                let k = DataType::decode(src)?;
                let v = DataType::decode(src)?;
                DataType::Map(Box::new(k), Box::new(v))
            },
            SET => DataType::Set(Box::new(DataType::decode(src)?)),
            UDT => {
                let keyspace = read_string(src)?;
                let name = read_string(src)?;
                let n = read_short(src)? as usize;
                let mut fields = Vec::with_capacity(n);
                for _ in 0..n {
                    let field_name = read_string(src)?;
                    let ty = DataType::decode(src)?;
                    fields.push((field_name, ty));
                }
                DataType::Udt {
                    keyspace,
                    name,
                    fields,
                }
            },
            TUPLE => {
                let n = read_short(src)? as usize;
                let mut elems = Vec::with_capacity(n);
                for _ in 0..n {
                    elems.push(DataType::decode(src)?);
                }
                DataType::Tuple(elems)
            },
            other => {
                warn!(type_code = other, "rejecting unrecognized CQL data-type code");
                return Err(ProtocolError::InvalidTag {
                    family: crate::error::TagFamily::DataType,
                    value: other as i64,
                });
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn primitive_type_round_trip() {
        let mut buf = BytesMut::new();
        DataType::Int.encode(&mut buf);
        assert_eq!(buf.len(), DataType::Int.encoded_len());
        let mut r = &buf[..];
        assert_eq!(DataType::decode(&mut r).unwrap(), DataType::Int);
    }

    #[test]
    fn nested_list_of_map_round_trip() {
        let ty = DataType::List(Box::new(DataType::Map(
            Box::new(DataType::Text),
            Box::new(DataType::Bigint),
        )));
        let mut buf = BytesMut::new();
        ty.encode(&mut buf);
        assert_eq!(buf.len(), ty.encoded_len());
        let mut r = &buf[..];
        assert_eq!(DataType::decode(&mut r).unwrap(), ty);
    }

    #[test]
    fn udt_round_trip() {
        let ty = DataType::Udt {
            keyspace: "ks".into(),
            name: "address".into(),
            fields: vec![
                ("street".into(), DataType::Text),
                ("zip".into(), DataType::Int),
            ],
        };
        let mut buf = BytesMut::new();
        ty.encode(&mut buf);
        assert_eq!(buf.len(), ty.encoded_len());
        let mut r = &buf[..];
        assert_eq!(DataType::decode(&mut r).unwrap(), ty);
    }

    #[test]
    fn custom_type_round_trip() {
        let ty = DataType::Custom("org.apache.cassandra.db.marshal.UTF8Type".into());
        let mut buf = BytesMut::new();
        ty.encode(&mut buf);
        assert_eq!(buf.len(), ty.encoded_len());
        let mut r = &buf[..];
        assert_eq!(DataType::decode(&mut r).unwrap(), ty);
    }
}
