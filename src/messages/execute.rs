// SPDX-License-Identifier: AGPL-3.0-or-later

//! EXECUTE request body (`spec.md` §4.F.4): non-empty `short bytes`
//! query_id; if `has_result_metadata_id(version)`, a mandatory non-empty
//! `short bytes` result_metadata_id; then `QueryOptions`.

use bytes::{Buf, BufMut};

use crate::{
    catalog::{ProtocolVersion, has_result_metadata_id},
    error::{ProtocolError, Result},
    primitive::{read_short_bytes, short_bytes_len, write_short_bytes},
    query_options::QueryOptions,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execute {
    pub query_id: Vec<u8>,
    pub result_metadata_id: Option<Vec<u8>>,
    pub options: QueryOptions,
}

impl Execute {
    pub fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        if self.query_id.is_empty() {
            return Err(ProtocolError::EmptyRequired("EXECUTE query id"));
        }
        write_short_bytes(sink, &self.query_id);
        if has_result_metadata_id(version) {
            let id = self
                .result_metadata_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .ok_or(ProtocolError::EmptyRequired("EXECUTE result metadata id"))?;
            write_short_bytes(sink, id);
        }
        self.options.encode(sink, version)
    }

    pub fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        if self.query_id.is_empty() {
            return Err(ProtocolError::EmptyRequired("EXECUTE query id"));
        }
        let mut total = short_bytes_len(&self.query_id);
        if has_result_metadata_id(version) {
            let id = self
                .result_metadata_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .ok_or(ProtocolError::EmptyRequired("EXECUTE result metadata id"))?;
            total += short_bytes_len(id);
        }
        total += self.options.encoded_len(version)?;
        Ok(total)
    }

    pub fn decode(src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        let query_id = read_short_bytes(src)?;
        let result_metadata_id = if has_result_metadata_id(version) {
            Some(read_short_bytes(src)?)
        } else {
            None
        };
        let options = QueryOptions::decode(src, version)?;
        Ok(Execute {
            query_id,
            result_metadata_id,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::catalog::Consistency;

    #[test]
    fn round_trip_without_result_metadata_id_at_v4() {
        let msg = Execute {
            query_id: vec![0x01, 0x02],
            result_metadata_id: None,
            options: QueryOptions::default(),
        };
        let mut buf = BytesMut::new();
        msg.encode(&mut buf, ProtocolVersion::V4).unwrap();
        assert_eq!(buf.len(), msg.encoded_len(ProtocolVersion::V4).unwrap());
        let mut r = &buf[..];
        assert_eq!(Execute::decode(&mut r, ProtocolVersion::V4).unwrap(), msg);
    }

    #[test]
    fn missing_result_metadata_id_rejected_at_v5() {
        let msg = Execute {
            query_id: vec![0x01, 0x02],
            result_metadata_id: None,
            options: QueryOptions::default(),
        };
        let mut buf = BytesMut::new();
        assert!(matches!(
            msg.encode(&mut buf, ProtocolVersion::V5).unwrap_err(),
            ProtocolError::EmptyRequired(_)
        ));
    }

    #[test]
    fn scenario_s5_execute_with_keyspace_and_now_at_v5() {
        let msg = Execute {
            query_id: vec![0x01, 0x02, 0x03, 0x04],
            result_metadata_id: Some(vec![0x05, 0x06, 0x07, 0x08]),
            options: QueryOptions {
                keyspace: "ks1".into(),
                now_in_seconds: 123,
                ..Default::default()
            },
        };
        let mut buf = BytesMut::new();
        msg.encode(&mut buf, ProtocolVersion::V5).unwrap();
        let mut r = &buf[..];
        assert_eq!(read_short_bytes(&mut r).unwrap(), vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(read_short_bytes(&mut r).unwrap(), vec![0x05, 0x06, 0x07, 0x08]);
        assert_eq!(
            crate::primitive::read_short(&mut r).unwrap(),
            Consistency::One.as_u16()
        );
        let flags = crate::primitive::read_int(&mut r).unwrap() as u32;
        assert_eq!(
            flags,
            crate::catalog::QueryFlags::WITH_KEYSPACE.bits()
                | crate::catalog::QueryFlags::NOW_IN_SECONDS.bits()
        );
        assert_eq!(crate::primitive::read_string(&mut r).unwrap(), "ks1");
        assert_eq!(crate::primitive::read_int(&mut r).unwrap(), 123);
    }
}
