// SPDX-License-Identifier: AGPL-3.0-or-later

//! PREPARE request body (`spec.md` §4.F.2): non-empty `long string` query;
//! if `has_prepare_flags(version)`, an `int` flags then (if `WITH_KEYSPACE`)
//! a `string` keyspace.

use bytes::{Buf, BufMut};

use crate::{
    catalog::{PrepareFlags, ProtocolVersion, has_prepare_flags},
    error::{ProtocolError, Result},
    primitive::{long_string_len, read_int, read_long_string, read_string, string_len, write_int, write_long_string, write_string},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepare {
    pub query: String,
    pub keyspace: Option<String>,
}

impl Prepare {
    fn compute_flags(&self) -> PrepareFlags {
        if self.keyspace.is_some() {
            PrepareFlags::WITH_KEYSPACE
        } else {
            PrepareFlags::empty()
        }
    }

    pub fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        if self.query.is_empty() {
            return Err(ProtocolError::EmptyRequired("PREPARE query string"));
        }
        write_long_string(sink, &self.query);
        if has_prepare_flags(version) {
            let flags = self.compute_flags();
            write_int(sink, flags.bits() as i32);
            if let Some(keyspace) = &self.keyspace {
                write_string(sink, keyspace);
            }
        } else if self.keyspace.is_some() {
            return Err(ProtocolError::UnsupportedInVersion {
                feature: "PREPARE.keyspace",
                version,
            });
        }
        Ok(())
    }

    pub fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        if self.query.is_empty() {
            return Err(ProtocolError::EmptyRequired("PREPARE query string"));
        }
        let mut total = long_string_len(&self.query);
        if has_prepare_flags(version) {
            total += 4;
            if let Some(keyspace) = &self.keyspace {
                total += string_len(keyspace);
            }
        } else if self.keyspace.is_some() {
            return Err(ProtocolError::UnsupportedInVersion {
                feature: "PREPARE.keyspace",
                version,
            });
        }
        Ok(total)
    }

    pub fn decode(src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        let query = read_long_string(src)?;
        let keyspace = if has_prepare_flags(version) {
            let flags = PrepareFlags::from_bits_retain(read_int(src)? as u32);
            if flags.contains(PrepareFlags::WITH_KEYSPACE) {
                Some(read_string(src)?)
            } else {
                None
            }
        } else {
            None
        };
        Ok(Prepare { query, keyspace })
    }
}
