// SPDX-License-Identifier: AGPL-3.0-or-later

//! BATCH request body (`spec.md` §4.F.6, §3 `BatchChild`/`Batch`). Reuses
//! [`QueryFlags`] for the trailing consistency/serial/timestamp/keyspace/
//! now-in-seconds block, since the wire bitmask is identical to QUERY's.

use bytes::{Buf, BufMut};
use tracing::warn;

use crate::{
    catalog::{BatchType, Consistency, ProtocolVersion, QueryFlags, has_keyspace_option, has_now_in_seconds},
    error::{ProtocolError, Result},
    primitive::{
        long_string_len, read_byte, read_int, read_long, read_long_string, read_short,
        read_short_bytes, read_string, write_byte, write_int, write_long, write_long_string,
        write_short, write_short_bytes, write_string,
    },
    query_options::{DEFAULT_TIMESTAMP_NONE, NOW_IN_SECONDS_NONE},
    value::{Value, positional_values_len, read_positional_values, write_positional_values},
};

const MAX_BATCH_CHILDREN: i64 = 65535;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOrId {
    QueryString(String),
    PreparedId(Vec<u8>),
}

impl QueryOrId {
    fn kind(&self) -> u8 {
        match self {
            QueryOrId::QueryString(_) => 0,
            QueryOrId::PreparedId(_) => 1,
        }
    }

    fn encode(&self, sink: &mut impl BufMut) -> Result<()> {
        write_byte(sink, self.kind());
        match self {
            QueryOrId::QueryString(q) => {
                if q.is_empty() {
                    return Err(ProtocolError::EmptyRequired("BATCH child query string"));
                }
                write_long_string(sink, q);
            },
            QueryOrId::PreparedId(id) => {
                if id.is_empty() {
                    return Err(ProtocolError::EmptyRequired("BATCH child prepared id"));
                }
                write_short_bytes(sink, id);
            },
        }
        Ok(())
    }

    fn encoded_len(&self) -> Result<usize> {
        Ok(1 + match self {
            QueryOrId::QueryString(q) => {
                if q.is_empty() {
                    return Err(ProtocolError::EmptyRequired("BATCH child query string"));
                }
                long_string_len(q)
            },
            QueryOrId::PreparedId(id) => {
                if id.is_empty() {
                    return Err(ProtocolError::EmptyRequired("BATCH child prepared id"));
                }
                crate::primitive::short_bytes_len(id)
            },
        })
    }

    fn decode(src: &mut impl Buf) -> Result<Self> {
        Ok(match read_byte(src)? {
            0 => QueryOrId::QueryString(read_long_string(src)?),
            1 => QueryOrId::PreparedId(read_short_bytes(src)?),
            other => {
                warn!(kind = other, "rejecting BATCH child with unrecognized query-or-id kind");
                return Err(ProtocolError::InvalidTag {
                    family: crate::error::TagFamily::QueryOrIdKind,
                    value: other as i64,
                });
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchChild {
    pub query_or_id: QueryOrId,
    pub values: Vec<Value>,
}

impl BatchChild {
    fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        self.query_or_id.encode(sink)?;
        write_positional_values(sink, &self.values, version)
    }

    fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        Ok(self.query_or_id.encoded_len()? + positional_values_len(&self.values, version)?)
    }

    fn decode(src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        let query_or_id = QueryOrId::decode(src)?;
        let values = read_positional_values(src, version)?;
        Ok(BatchChild { query_or_id, values })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub batch_type: BatchType,
    pub children: Vec<BatchChild>,
    pub consistency: Consistency,
    pub serial_consistency: Consistency,
    pub default_timestamp: i64,
    pub keyspace: String,
    pub now_in_seconds: i32,
}

impl Default for Batch {
    fn default() -> Self {
        Batch {
            batch_type: BatchType::Logged,
            children: Vec::new(),
            consistency: Consistency::One,
            serial_consistency: Consistency::Serial,
            default_timestamp: DEFAULT_TIMESTAMP_NONE,
            keyspace: String::new(),
            now_in_seconds: NOW_IN_SECONDS_NONE,
        }
    }
}

impl Batch {
    fn compute_flags(&self, version: ProtocolVersion) -> QueryFlags {
        let mut flags = QueryFlags::empty();
        if self.serial_consistency != Consistency::Serial {
            flags |= QueryFlags::SERIAL_CONSISTENCY;
        }
        if self.default_timestamp != DEFAULT_TIMESTAMP_NONE {
            flags |= QueryFlags::DEFAULT_TIMESTAMP;
        }
        if has_keyspace_option(version) && !self.keyspace.is_empty() {
            flags |= QueryFlags::WITH_KEYSPACE;
        }
        if has_now_in_seconds(version) && self.now_in_seconds != NOW_IN_SECONDS_NONE {
            flags |= QueryFlags::NOW_IN_SECONDS;
        }
        flags
    }

    fn write_flags(sink: &mut impl BufMut, flags: QueryFlags, version: ProtocolVersion) {
        if version.flags_width() == 1 {
            write_byte(sink, flags.bits() as u8);
        } else {
            write_int(sink, flags.bits() as i32);
        }
    }

    fn read_flags(src: &mut impl Buf, version: ProtocolVersion) -> Result<QueryFlags> {
        let raw: u32 = if version.flags_width() == 1 {
            read_byte(src)? as u32
        } else {
            read_int(src)? as u32
        };
        Ok(QueryFlags::from_bits_retain(raw))
    }

    pub fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        if self.children.is_empty() || self.children.len() as i64 > MAX_BATCH_CHILDREN {
            return Err(ProtocolError::CountOutOfRange {
                what: "BATCH children",
                got: self.children.len() as i64,
                min: 1,
                max: MAX_BATCH_CHILDREN,
            });
        }
        write_byte(sink, self.batch_type.as_u8());
        write_short(sink, self.children.len() as u16);
        for child in &self.children {
            child.encode(sink, version)?;
        }
        write_short(sink, self.consistency.as_u16());
        let flags = self.compute_flags(version);
        Self::write_flags(sink, flags, version);
        if flags.contains(QueryFlags::SERIAL_CONSISTENCY) {
            write_short(sink, self.serial_consistency.as_u16());
        }
        if flags.contains(QueryFlags::DEFAULT_TIMESTAMP) {
            write_long(sink, self.default_timestamp);
        }
        if flags.contains(QueryFlags::WITH_KEYSPACE) {
            write_string(sink, &self.keyspace);
        }
        if flags.contains(QueryFlags::NOW_IN_SECONDS) {
            write_int(sink, self.now_in_seconds);
        }
        Ok(())
    }

    pub fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        if self.children.is_empty() || self.children.len() as i64 > MAX_BATCH_CHILDREN {
            return Err(ProtocolError::CountOutOfRange {
                what: "BATCH children",
                got: self.children.len() as i64,
                min: 1,
                max: MAX_BATCH_CHILDREN,
            });
        }
        let flags = self.compute_flags(version);
        let mut total = 1 + 2 + version.flags_width() + 2;
        for child in &self.children {
            total += child.encoded_len(version)?;
        }
        if flags.contains(QueryFlags::SERIAL_CONSISTENCY) {
            total += 2;
        }
        if flags.contains(QueryFlags::DEFAULT_TIMESTAMP) {
            total += 8;
        }
        if flags.contains(QueryFlags::WITH_KEYSPACE) {
            total += crate::primitive::string_len(&self.keyspace);
        }
        if flags.contains(QueryFlags::NOW_IN_SECONDS) {
            total += 4;
        }
        Ok(total)
    }

    pub fn decode(src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        let batch_type = BatchType::check(read_byte(src)?)?;
        let count = read_short(src)?;
        let mut children = Vec::with_capacity(count as usize);
        for _ in 0..count {
            children.push(BatchChild::decode(src, version)?);
        }
        let consistency = Consistency::check(read_short(src)?)?;
        let flags = Self::read_flags(src, version)?;

        if flags.contains(QueryFlags::VALUE_NAMES) {
            return Err(ProtocolError::InvalidFlagCombo(
                "BATCH does not support named values (CASSANDRA-10246)",
            ));
        }

        let serial_consistency = if flags.contains(QueryFlags::SERIAL_CONSISTENCY) {
            Consistency::check(read_short(src)?)?
        } else {
            Consistency::Serial
        };
        let default_timestamp = if flags.contains(QueryFlags::DEFAULT_TIMESTAMP) {
            read_long(src)?
        } else {
            DEFAULT_TIMESTAMP_NONE
        };
        let keyspace = if flags.contains(QueryFlags::WITH_KEYSPACE) {
            if !has_keyspace_option(version) {
                return Err(ProtocolError::UnsupportedInVersion {
                    feature: "BATCH.keyspace",
                    version,
                });
            }
            read_string(src)?
        } else {
            String::new()
        };
        let now_in_seconds = if flags.contains(QueryFlags::NOW_IN_SECONDS) {
            if !has_now_in_seconds(version) {
                return Err(ProtocolError::UnsupportedInVersion {
                    feature: "BATCH.now_in_seconds",
                    version,
                });
            }
            read_int(src)?
        } else {
            NOW_IN_SECONDS_NONE
        };

        Ok(Batch {
            batch_type,
            children,
            consistency,
            serial_consistency,
            default_timestamp,
            keyspace,
            now_in_seconds,
        })
    }
}

/// Consuming builder, mirroring the teacher's per-message builder style.
#[derive(Debug)]
pub struct BatchBuilder {
    inner: Batch,
}

impl BatchBuilder {
    pub fn new(batch_type: BatchType) -> Self {
        BatchBuilder {
            inner: Batch {
                batch_type,
                ..Default::default()
            },
        }
    }

    pub fn child(mut self, query_or_id: QueryOrId, values: Vec<Value>) -> Self {
        self.inner.children.push(BatchChild { query_or_id, values });
        self
    }

    pub fn consistency(mut self, consistency: Consistency) -> Self {
        self.inner.consistency = consistency;
        self
    }

    pub fn build(self) -> Batch {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn round_trip_at_v4() {
        let batch = BatchBuilder::new(BatchType::Logged)
            .child(QueryOrId::QueryString("INSERT INTO t VALUES (?)".into()), vec![
                Value::Regular(vec![0x01]),
            ])
            .child(QueryOrId::PreparedId(vec![0xAA, 0xBB]), vec![Value::Null])
            .build();
        let mut buf = BytesMut::new();
        batch.encode(&mut buf, ProtocolVersion::V4).unwrap();
        assert_eq!(buf.len(), batch.encoded_len(ProtocolVersion::V4).unwrap());
        let mut r = &buf[..];
        assert_eq!(Batch::decode(&mut r, ProtocolVersion::V4).unwrap(), batch);
    }

    #[test]
    fn empty_batch_rejected_on_encode() {
        let batch = Batch::default();
        let mut buf = BytesMut::new();
        assert!(matches!(
            batch.encode(&mut buf, ProtocolVersion::V4).unwrap_err(),
            ProtocolError::CountOutOfRange { .. }
        ));
    }

    #[test]
    fn empty_batch_accepted_on_decode() {
        let mut buf = BytesMut::new();
        write_byte(&mut buf, BatchType::Logged.as_u8());
        write_short(&mut buf, 0);
        write_short(&mut buf, Consistency::One.as_u16());
        write_byte(&mut buf, 0);
        let mut r = &buf[..];
        let batch = Batch::decode(&mut r, ProtocolVersion::V4).unwrap();
        assert!(batch.children.is_empty());
    }

    #[test]
    fn scenario_s6_batch_rejects_named_values_on_decode() {
        let mut buf = BytesMut::new();
        write_byte(&mut buf, BatchType::Logged.as_u8());
        write_short(&mut buf, 0);
        write_short(&mut buf, Consistency::One.as_u16());
        write_byte(&mut buf, QueryFlags::VALUE_NAMES.bits() as u8);
        let mut r = &buf[..];
        let err = Batch::decode(&mut r, ProtocolVersion::V4).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidFlagCombo(_)));
    }

    #[test]
    fn too_many_children_rejected_on_encode() {
        let mut batch = Batch::default();
        batch.children = (0..=MAX_BATCH_CHILDREN)
            .map(|_| BatchChild {
                query_or_id: QueryOrId::QueryString("X".into()),
                values: vec![],
            })
            .collect();
        let mut buf = BytesMut::new();
        assert!(matches!(
            batch.encode(&mut buf, ProtocolVersion::V4).unwrap_err(),
            ProtocolError::CountOutOfRange { .. }
        ));
    }
}
