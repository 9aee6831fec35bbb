// SPDX-License-Identifier: AGPL-3.0-or-later

//! RESULT response body (`spec.md` §4.F.7): leading `int result_type` tag
//! then one of `Void`, `SetKeyspace`, `SchemaChange`, `Prepared`, `Rows`.

use bytes::{Buf, BufMut};

use crate::{
    catalog::{ProtocolVersion, ResultKind, has_prepare_pk_indices, has_result_metadata_id},
    error::Result,
    messages::schema_change::SchemaChangeBody,
    primitive::{
        bytes_len, read_bytes, read_int, read_short_bytes, read_string, short_bytes_len,
        string_len, write_bytes, write_int, write_short_bytes, write_string,
    },
    rows_metadata::RowsMetadata,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultBody {
    Void,
    SetKeyspace(String),
    SchemaChange(SchemaChangeBody),
    Prepared {
        prepared_query_id: Vec<u8>,
        result_metadata_id: Option<Vec<u8>>,
        variables: RowsMetadata,
        result: RowsMetadata,
    },
    Rows {
        metadata: RowsMetadata,
        rows: Vec<Vec<Option<Vec<u8>>>>,
    },
}

impl ResultBody {
    fn kind(&self) -> ResultKind {
        match self {
            ResultBody::Void => ResultKind::Void,
            ResultBody::SetKeyspace(_) => ResultKind::SetKeyspace,
            ResultBody::SchemaChange(_) => ResultKind::SchemaChange,
            ResultBody::Prepared { .. } => ResultKind::Prepared,
            ResultBody::Rows { .. } => ResultKind::Rows,
        }
    }

    pub fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        write_int(sink, self.kind().as_i32());
        match self {
            ResultBody::Void => {},
            ResultBody::SetKeyspace(ks) => write_string(sink, ks),
            ResultBody::SchemaChange(body) => body.encode(sink, version)?,
            ResultBody::Prepared {
                prepared_query_id,
                result_metadata_id,
                variables,
                result,
            } => {
                write_short_bytes(sink, prepared_query_id);
                if has_result_metadata_id(version) {
                    write_short_bytes(sink, result_metadata_id.as_deref().unwrap_or(&[]));
                }
                variables.encode(sink, version, has_prepare_pk_indices(version))?;
                result.encode(sink, version, false)?;
            },
            ResultBody::Rows { metadata, rows } => {
                metadata.encode(sink, version, false)?;
                write_int(sink, rows.len() as i32);
                for row in rows {
                    for cell in row {
                        write_bytes(sink, cell.as_deref());
                    }
                }
            },
        }
        Ok(())
    }

    pub fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        let mut total = 4;
        total += match self {
            ResultBody::Void => 0,
            ResultBody::SetKeyspace(ks) => string_len(ks),
            ResultBody::SchemaChange(body) => body.encoded_len(version)?,
            ResultBody::Prepared {
                prepared_query_id,
                result_metadata_id,
                variables,
                result,
            } => {
                let mut n = short_bytes_len(prepared_query_id);
                if has_result_metadata_id(version) {
                    n += short_bytes_len(result_metadata_id.as_deref().unwrap_or(&[]));
                }
                n += variables.encoded_len(version, has_prepare_pk_indices(version));
                n += result.encoded_len(version, false);
                n
            },
            ResultBody::Rows { metadata, rows } => {
                let mut n = metadata.encoded_len(version, false) + 4;
                for row in rows {
                    for cell in row {
                        n += bytes_len(cell.as_deref());
                    }
                }
                n
            },
        };
        Ok(total)
    }

    pub fn decode(src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        let kind = ResultKind::check(read_int(src)?)?;
        Ok(match kind {
            ResultKind::Void => ResultBody::Void,
            ResultKind::SetKeyspace => ResultBody::SetKeyspace(read_string(src)?),
            ResultKind::SchemaChange => ResultBody::SchemaChange(SchemaChangeBody::decode(src, version)?),
            ResultKind::Prepared => {
                let prepared_query_id = read_short_bytes(src)?;
                let result_metadata_id = if has_result_metadata_id(version) {
                    Some(read_short_bytes(src)?)
                } else {
                    None
                };
                let variables = RowsMetadata::decode(src, version, has_prepare_pk_indices(version))?;
                let result = RowsMetadata::decode(src, version, false)?;
                ResultBody::Prepared {
                    prepared_query_id,
                    result_metadata_id,
                    variables,
                    result,
                }
            },
            ResultKind::Rows => {
                let metadata = RowsMetadata::decode(src, version, false)?;
                let row_count = read_int(src)?.max(0) as usize;
                let column_count = metadata.column_count.max(0) as usize;
                let mut rows = Vec::with_capacity(row_count);
                for _ in 0..row_count {
                    let mut row = Vec::with_capacity(column_count);
                    for _ in 0..column_count {
                        row.push(read_bytes(src)?);
                    }
                    rows.push(row);
                }
                ResultBody::Rows { metadata, rows }
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::{datatype::DataType, rows_metadata::ColumnSpec};

    #[test]
    fn void_round_trip() {
        let msg = ResultBody::Void;
        let mut buf = BytesMut::new();
        msg.encode(&mut buf, ProtocolVersion::V4).unwrap();
        assert_eq!(buf.len(), msg.encoded_len(ProtocolVersion::V4).unwrap());
        let mut r = &buf[..];
        assert_eq!(ResultBody::decode(&mut r, ProtocolVersion::V4).unwrap(), msg);
    }

    #[test]
    fn set_keyspace_round_trip() {
        let msg = ResultBody::SetKeyspace("ks".into());
        let mut buf = BytesMut::new();
        msg.encode(&mut buf, ProtocolVersion::V4).unwrap();
        let mut r = &buf[..];
        assert_eq!(ResultBody::decode(&mut r, ProtocolVersion::V4).unwrap(), msg);
    }

    #[test]
    fn scenario_s7_rows_with_global_tables_and_more_pages() {
        let metadata = RowsMetadata {
            column_count: 1,
            paging_state: Some(vec![0x01]),
            new_result_metadata_id: Some(vec![0xAA]),
            column_specs: Some(vec![ColumnSpec {
                keyspace: "ks".into(),
                table: "t".into(),
                name: "a".into(),
                index: 0,
                data_type: DataType::Int,
            }]),
            ..Default::default()
        };
        let msg = ResultBody::Rows {
            metadata,
            rows: vec![vec![Some(vec![0, 0, 0, 1])], vec![None]],
        };
        let mut buf = BytesMut::new();
        msg.encode(&mut buf, ProtocolVersion::V5).unwrap();
        assert_eq!(buf.len(), msg.encoded_len(ProtocolVersion::V5).unwrap());
        let mut r = &buf[..];
        assert_eq!(ResultBody::decode(&mut r, ProtocolVersion::V5).unwrap(), msg);
    }

    #[test]
    fn prepared_round_trip_at_v4() {
        let msg = ResultBody::Prepared {
            prepared_query_id: vec![0x01, 0x02],
            result_metadata_id: None,
            variables: RowsMetadata {
                column_count: 1,
                pk_indices: Some(vec![0]),
                column_specs: None,
                ..Default::default()
            },
            result: RowsMetadata {
                column_count: 0,
                column_specs: None,
                ..Default::default()
            },
        };
        let mut buf = BytesMut::new();
        msg.encode(&mut buf, ProtocolVersion::V4).unwrap();
        assert_eq!(buf.len(), msg.encoded_len(ProtocolVersion::V4).unwrap());
        let mut r = &buf[..];
        assert_eq!(ResultBody::decode(&mut r, ProtocolVersion::V4).unwrap(), msg);
    }
}
