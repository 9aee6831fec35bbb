// SPDX-License-Identifier: AGPL-3.0-or-later

//! RowsMetadata sub-codec (component E): flags, column count, optional
//! paging state, new result metadata id, optional pk indices (PREPARED
//! only, V4+/DSE), optional column specs with the global-table
//! optimisation, optional continuous-paging counters (`spec.md` §3, §4.F.8).

use bytes::{Buf, BufMut};

use crate::{
    catalog::{ProtocolVersion, RowsFlags, has_metadata_changed},
    datatype::DataType,
    error::{ProtocolError, Result},
    primitive::{read_int, read_string, write_int, write_string},
};

/// A single result column descriptor. `index` is not carried on the wire;
/// it is the column's position within `RowsMetadata::column_specs` and is
/// filled in by the decoder for caller convenience (mirrors how the
/// Cassandra wire grammar numbers columns implicitly by position).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub keyspace: String,
    pub table: String,
    pub name: String,
    pub index: i32,
    pub data_type: DataType,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowsMetadata {
    pub column_count: i32,
    pub paging_state: Option<Vec<u8>>,
    pub new_result_metadata_id: Option<Vec<u8>>,
    pub pk_indices: Option<Vec<u16>>,
    pub column_specs: Option<Vec<ColumnSpec>>,
    pub continuous_page_number: Option<i32>,
    pub last_continuous_page: bool,
}

/// Does every column share the same `(keyspace, table)` pair? An empty
/// list is "different tables" (`false`): see `spec.md` §9 on the
/// `haveSameTable` heuristic.
fn have_same_table(specs: &[ColumnSpec]) -> bool {
    match specs.first() {
        None => false,
        Some(first) => specs
            .iter()
            .all(|c| c.keyspace == first.keyspace && c.table == first.table),
    }
}

impl RowsMetadata {
    fn compute_flags(&self, version: ProtocolVersion) -> RowsFlags {
        let mut flags = RowsFlags::empty();
        if let Some(specs) = &self.column_specs
            && !specs.is_empty()
            && have_same_table(specs)
        {
            flags |= RowsFlags::GLOBAL_TABLES_SPEC;
        }
        if self.paging_state.is_some() {
            flags |= RowsFlags::HAS_MORE_PAGES;
        }
        if self.column_specs.is_none() {
            flags |= RowsFlags::NO_METADATA;
        }
        if has_metadata_changed(version) && self.new_result_metadata_id.is_some() {
            flags |= RowsFlags::METADATA_CHANGED;
        }
        if version.is_dse() {
            if self.continuous_page_number.is_some() {
                flags |= RowsFlags::CONTINUOUS_PAGING;
            }
            if self.last_continuous_page {
                flags |= RowsFlags::LAST_CONTINUOUS_PAGE;
            }
        }
        flags
    }

    pub fn encode(
        &self,
        sink: &mut impl BufMut,
        version: ProtocolVersion,
        include_pk_indices: bool,
    ) -> Result<()> {
        let flags = self.compute_flags(version);
        write_int(sink, flags.bits() as i32);
        write_int(sink, self.column_count);

        if include_pk_indices {
            let pk = self.pk_indices.as_deref().unwrap_or(&[]);
            write_int(sink, pk.len() as i32);
            for idx in pk {
                crate::primitive::write_short(sink, *idx);
            }
        }

        if flags.contains(RowsFlags::HAS_MORE_PAGES) {
            crate::primitive::write_bytes(sink, self.paging_state.as_deref());
        }

        if flags.contains(RowsFlags::METADATA_CHANGED) {
            let id = self
                .new_result_metadata_id
                .as_deref()
                .expect("METADATA_CHANGED implies new_result_metadata_id present");
            crate::primitive::write_short_bytes(sink, id);
        }

        if flags.contains(RowsFlags::CONTINUOUS_PAGING) {
            let n = self
                .continuous_page_number
                .expect("CONTINUOUS_PAGING implies continuous_page_number present");
            write_int(sink, n);
        }

        if let Some(specs) = &self.column_specs {
            if flags.contains(RowsFlags::GLOBAL_TABLES_SPEC) {
                write_string(sink, &specs[0].keyspace);
                write_string(sink, &specs[0].table);
            }
            for col in specs {
                if !flags.contains(RowsFlags::GLOBAL_TABLES_SPEC) {
                    write_string(sink, &col.keyspace);
                    write_string(sink, &col.table);
                }
                write_string(sink, &col.name);
                col.data_type.encode(sink);
            }
        }
        Ok(())
    }

    pub fn encoded_len(&self, version: ProtocolVersion, include_pk_indices: bool) -> usize {
        let flags = self.compute_flags(version);
        let mut total = 4 + 4;
        if include_pk_indices {
            total += 4 + 2 * self.pk_indices.as_ref().map(Vec::len).unwrap_or(0);
        }
        if flags.contains(RowsFlags::HAS_MORE_PAGES) {
            total += crate::primitive::bytes_len(self.paging_state.as_deref());
        }
        if flags.contains(RowsFlags::METADATA_CHANGED) {
            total += crate::primitive::short_bytes_len(
                self.new_result_metadata_id.as_deref().unwrap_or(&[]),
            );
        }
        if flags.contains(RowsFlags::CONTINUOUS_PAGING) {
            total += 4;
        }
        if let Some(specs) = &self.column_specs {
            if flags.contains(RowsFlags::GLOBAL_TABLES_SPEC) {
                total += crate::primitive::string_len(&specs[0].keyspace)
                    + crate::primitive::string_len(&specs[0].table);
            }
            for col in specs {
                if !flags.contains(RowsFlags::GLOBAL_TABLES_SPEC) {
                    total += crate::primitive::string_len(&col.keyspace)
                        + crate::primitive::string_len(&col.table);
                }
                total += crate::primitive::string_len(&col.name) + col.data_type.encoded_len();
            }
        }
        total
    }

    pub fn decode(
        src: &mut impl Buf,
        version: ProtocolVersion,
        include_pk_indices: bool,
    ) -> Result<Self> {
        let raw_flags = read_int(src)? as u32;
        let flags = RowsFlags::from_bits_retain(raw_flags);
        let column_count = read_int(src)?;

        let pk_indices = if include_pk_indices {
            let n = read_int(src)?;
            if n < 0 {
                return Err(ProtocolError::NegativeLength(n as i64));
            }
            let mut v = Vec::with_capacity(n as usize);
            for _ in 0..n {
                v.push(crate::primitive::read_short(src)?);
            }
            Some(v)
        } else {
            None
        };

        let paging_state = if flags.contains(RowsFlags::HAS_MORE_PAGES) {
            crate::primitive::read_bytes(src)?
        } else {
            None
        };

        let new_result_metadata_id = if flags.contains(RowsFlags::METADATA_CHANGED) {
            if !has_metadata_changed(version) {
                return Err(ProtocolError::UnsupportedInVersion {
                    feature: "RowsMetadata.new_result_metadata_id",
                    version,
                });
            }
            Some(crate::primitive::read_short_bytes(src)?)
        } else {
            None
        };

        let continuous_page_number = if flags.contains(RowsFlags::CONTINUOUS_PAGING) {
            if !version.is_dse() {
                return Err(ProtocolError::UnsupportedInVersion {
                    feature: "RowsMetadata.continuous_page_number",
                    version,
                });
            }
            Some(read_int(src)?)
        } else {
            None
        };

        let last_continuous_page = flags.contains(RowsFlags::LAST_CONTINUOUS_PAGE);

        let column_specs = if flags.contains(RowsFlags::NO_METADATA) {
            None
        } else {
            let global = if flags.contains(RowsFlags::GLOBAL_TABLES_SPEC) {
                let ks = read_string(src)?;
                let table = read_string(src)?;
                Some((ks, table))
            } else {
                None
            };
            let mut specs = Vec::with_capacity(column_count.max(0) as usize);
            for i in 0..column_count {
                let (keyspace, table) = if let Some((ks, table)) = &global {
                    (ks.clone(), table.clone())
                } else {
                    (read_string(src)?, read_string(src)?)
                };
                let name = read_string(src)?;
                let data_type = DataType::decode(src)?;
                specs.push(ColumnSpec {
                    keyspace,
                    table,
                    name,
                    index: i,
                    data_type,
                });
            }
            Some(specs)
        };

        Ok(RowsMetadata {
            column_count,
            paging_state,
            new_result_metadata_id,
            pk_indices,
            column_specs,
            continuous_page_number,
            last_continuous_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    fn sample_specs() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec {
                keyspace: "ks".into(),
                table: "t".into(),
                name: "a".into(),
                index: 0,
                data_type: DataType::Int,
            },
            ColumnSpec {
                keyspace: "ks".into(),
                table: "t".into(),
                name: "b".into(),
                index: 1,
                data_type: DataType::Text,
            },
        ]
    }

    #[test]
    fn global_tables_spec_round_trip() {
        let meta = RowsMetadata {
            column_count: 2,
            column_specs: Some(sample_specs()),
            ..Default::default()
        };
        let mut buf = BytesMut::new();
        meta.encode(&mut buf, ProtocolVersion::V4, false).unwrap();
        assert_eq!(buf.len(), meta.encoded_len(ProtocolVersion::V4, false));
        let mut r = &buf[..];
        let decoded = RowsMetadata::decode(&mut r, ProtocolVersion::V4, false).unwrap();
        assert_eq!(decoded, meta);
    }

    #[test]
    fn no_metadata_round_trip() {
        let meta = RowsMetadata {
            column_count: 2,
            column_specs: None,
            ..Default::default()
        };
        let mut buf = BytesMut::new();
        meta.encode(&mut buf, ProtocolVersion::V4, false).unwrap();
        let mut r = &buf[..];
        let decoded = RowsMetadata::decode(&mut r, ProtocolVersion::V4, false).unwrap();
        assert_eq!(decoded, meta);
    }

    #[test]
    fn pk_indices_round_trip() {
        let meta = RowsMetadata {
            column_count: 1,
            pk_indices: Some(vec![0]),
            column_specs: None,
            ..Default::default()
        };
        let mut buf = BytesMut::new();
        meta.encode(&mut buf, ProtocolVersion::V4, true).unwrap();
        let mut r = &buf[..];
        let decoded = RowsMetadata::decode(&mut r, ProtocolVersion::V4, true).unwrap();
        assert_eq!(decoded.pk_indices, Some(vec![0]));
    }

    #[test]
    fn continuous_paging_high_bits_survive_unsigned() {
        let meta = RowsMetadata {
            column_count: 0,
            column_specs: None,
            continuous_page_number: Some(5),
            last_continuous_page: true,
            ..Default::default()
        };
        let mut buf = BytesMut::new();
        meta.encode(&mut buf, ProtocolVersion::DseV1, false).unwrap();
        let mut r = &buf[..];
        let decoded = RowsMetadata::decode(&mut r, ProtocolVersion::DseV1, false).unwrap();
        assert!(decoded.last_continuous_page);
        assert_eq!(decoded.continuous_page_number, Some(5));
    }

    #[test]
    fn scenario_s7_flags_value() {
        // METADATA_CHANGED | HAS_MORE_PAGES | GLOBAL_TABLES_SPEC = 0x0B
        let meta = RowsMetadata {
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
        let flags = meta.compute_flags(ProtocolVersion::V5);
        assert_eq!(flags.bits(), 0x0B);
    }

    #[test]
    fn empty_column_specs_never_sets_global_tables_spec() {
        let meta = RowsMetadata {
            column_count: 0,
            column_specs: Some(vec![]),
            ..Default::default()
        };
        let flags = meta.compute_flags(ProtocolVersion::V4);
        assert!(!flags.contains(RowsFlags::GLOBAL_TABLES_SPEC));
    }
}
