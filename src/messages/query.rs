// SPDX-License-Identifier: AGPL-3.0-or-later

//! QUERY request body: non-empty `long string` query then `QueryOptions`
//! (`spec.md` §4.F.3).

use bytes::{Buf, BufMut};

use crate::{
    catalog::ProtocolVersion,
    error::{ProtocolError, Result},
    primitive::{long_string_len, read_long_string, write_long_string},
    query_options::QueryOptions,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub query: String,
    pub options: QueryOptions,
}

impl Query {
    pub fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        if self.query.is_empty() {
            return Err(ProtocolError::EmptyRequired("QUERY query string"));
        }
        write_long_string(sink, &self.query);
        self.options.encode(sink, version)
    }

    pub fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        if self.query.is_empty() {
            return Err(ProtocolError::EmptyRequired("QUERY query string"));
        }
        Ok(long_string_len(&self.query) + self.options.encoded_len(version)?)
    }

    pub fn decode(src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        let query = read_long_string(src)?;
        let options = QueryOptions::decode(src, version)?;
        Ok(Query { query, options })
    }
}

/// Consuming builder for request-side ergonomics.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    query: String,
    options: QueryOptions,
}

impl QueryBuilder {
    pub fn new(query: impl Into<String>) -> Self {
        QueryBuilder {
            query: query.into(),
            options: QueryOptions::default(),
        }
    }

    pub fn options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Query {
        Query {
            query: self.query,
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn scenario_s2_query_with_defaults_at_v3() {
        let msg = QueryBuilder::new("SELECT").build();
        let mut buf = BytesMut::new();
        msg.encode(&mut buf, ProtocolVersion::V3).unwrap();
        let expected: &[u8] = &[
            0x00, 0x00, 0x00, 0x06, b'S', b'E', b'L', b'E', b'C', b'T', 0x00, 0x01, 0x00,
        ];
        assert_eq!(&buf[..], expected);
        assert_eq!(buf.len(), msg.encoded_len(ProtocolVersion::V3).unwrap());
    }

    #[test]
    fn empty_query_rejected() {
        let msg = Query {
            query: String::new(),
            options: QueryOptions::default(),
        };
        let mut buf = BytesMut::new();
        assert!(matches!(
            msg.encode(&mut buf, ProtocolVersion::V4).unwrap_err(),
            ProtocolError::EmptyRequired(_)
        ));
    }
}
