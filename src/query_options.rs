// SPDX-License-Identifier: AGPL-3.0-or-later

//! QueryOptions sub-codec (component D), shared by QUERY and EXECUTE
//! (`spec.md` §3, §4.F.5). Flags are always *computed* from the struct's
//! fields at encode time and never retained as user-visible state on
//! decode (`spec.md` §9, "Flag computation vs. flag storage").

use bytes::{Buf, BufMut};

use crate::{
    catalog::{Consistency, ProtocolVersion, QueryFlags, has_keyspace_option, has_now_in_seconds},
    error::{ProtocolError, Result},
    primitive::{read_int, read_short, read_string, write_int, write_short, write_string},
    value::{
        BoundValues, named_values_len, positional_values_len, read_named_values,
        read_positional_values, write_named_values, write_positional_values,
    },
};

pub const DEFAULT_TIMESTAMP_NONE: i64 = i64::MIN;
pub const NOW_IN_SECONDS_NONE: i32 = i32::MIN;

/// DSE continuous-paging sub-options, only meaningful when
/// [`QueryFlags::WITH_CONTINUOUS_PAGING`] is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuousPagingOptions {
    pub max_pages: i32,
    pub pages_per_second: i32,
    /// DseV2 only; ignored (not written) on DseV1.
    pub next_pages: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub consistency: Consistency,
    pub values: BoundValues,
    pub skip_metadata: bool,
    /// `None` or `Some(n) where n <= 0` means "absent" on the wire; only
    /// `Some(n) where n > 0` sets `PAGE_SIZE`.
    pub page_size: Option<i32>,
    /// DSE sub-flag: page size is expressed in bytes rather than rows.
    pub page_size_in_bytes: bool,
    pub paging_state: Option<Vec<u8>>,
    pub serial_consistency: Consistency,
    pub default_timestamp: i64,
    pub keyspace: String,
    pub now_in_seconds: i32,
    pub continuous_paging_options: Option<ContinuousPagingOptions>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            consistency: Consistency::One,
            values: BoundValues::None,
            skip_metadata: false,
            page_size: None,
            page_size_in_bytes: false,
            paging_state: None,
            serial_consistency: Consistency::Serial,
            default_timestamp: DEFAULT_TIMESTAMP_NONE,
            keyspace: String::new(),
            now_in_seconds: NOW_IN_SECONDS_NONE,
            continuous_paging_options: None,
        }
    }
}

impl QueryOptions {
    fn compute_flags(&self, version: ProtocolVersion) -> QueryFlags {
        let mut flags = QueryFlags::empty();
        if self.values.is_present() {
            flags |= QueryFlags::VALUES;
        }
        if self.values.is_named() {
            flags |= QueryFlags::VALUE_NAMES | QueryFlags::VALUES;
        }
        if self.skip_metadata {
            flags |= QueryFlags::SKIP_METADATA;
        }
        if self.page_size.is_some_and(|n| n > 0) {
            flags |= QueryFlags::PAGE_SIZE;
        }
        if self.paging_state.is_some() {
            flags |= QueryFlags::PAGING_STATE;
        }
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
        if version.is_dse() {
            if self.page_size_in_bytes {
                flags |= QueryFlags::PAGE_SIZE_BYTES;
            }
            if self.continuous_paging_options.is_some() {
                flags |= QueryFlags::WITH_CONTINUOUS_PAGING;
            }
        }
        flags
    }

    fn write_flags(sink: &mut impl BufMut, flags: QueryFlags, version: ProtocolVersion) {
        if version.flags_width() == 1 {
            crate::primitive::write_byte(sink, flags.bits() as u8);
        } else {
            write_int(sink, flags.bits() as i32);
        }
    }

    fn read_flags(src: &mut impl Buf, version: ProtocolVersion) -> Result<QueryFlags> {
        let raw: u32 = if version.flags_width() == 1 {
            crate::primitive::read_byte(src)? as u32
        } else {
            read_int(src)? as u32
        };
        Ok(QueryFlags::from_bits_retain(raw))
    }

    pub fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        write_short(sink, self.consistency.as_u16());
        let flags = self.compute_flags(version);
        Self::write_flags(sink, flags, version);

        if flags.contains(QueryFlags::VALUES) {
            match &self.values {
                BoundValues::Named(items) => write_named_values(sink, items, version)?,
                BoundValues::Positional(items) => {
                    write_positional_values(sink, items, version)?
                },
                BoundValues::None => unreachable!("VALUES flag implies values present"),
            }
        }
        if flags.contains(QueryFlags::PAGE_SIZE) {
            write_int(sink, self.page_size.unwrap_or(0));
        }
        if flags.contains(QueryFlags::PAGING_STATE) {
            crate::primitive::write_bytes(sink, self.paging_state.as_deref());
        }
        if flags.contains(QueryFlags::SERIAL_CONSISTENCY) {
            write_short(sink, self.serial_consistency.as_u16());
        }
        if flags.contains(QueryFlags::DEFAULT_TIMESTAMP) {
            crate::primitive::write_long(sink, self.default_timestamp);
        }
        if flags.contains(QueryFlags::WITH_KEYSPACE) {
            write_string(sink, &self.keyspace);
        }
        if flags.contains(QueryFlags::NOW_IN_SECONDS) {
            write_int(sink, self.now_in_seconds);
        }
        if flags.contains(QueryFlags::WITH_CONTINUOUS_PAGING) {
            let cpo = self
                .continuous_paging_options
                .expect("WITH_CONTINUOUS_PAGING implies continuous_paging_options present");
            write_int(sink, cpo.max_pages);
            write_int(sink, cpo.pages_per_second);
            if version == ProtocolVersion::DseV2 {
                write_int(sink, cpo.next_pages.unwrap_or(0));
            }
        }
        Ok(())
    }

    pub fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        let flags = self.compute_flags(version);
        let mut total = 2 + version.flags_width();
        if flags.contains(QueryFlags::VALUES) {
            total += match &self.values {
                BoundValues::Named(items) => named_values_len(items, version)?,
                BoundValues::Positional(items) => positional_values_len(items, version)?,
                BoundValues::None => 0,
            };
        }
        if flags.contains(QueryFlags::PAGE_SIZE) {
            total += 4;
        }
        if flags.contains(QueryFlags::PAGING_STATE) {
            total += crate::primitive::bytes_len(self.paging_state.as_deref());
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
        if flags.contains(QueryFlags::WITH_CONTINUOUS_PAGING) {
            total += 8;
            if version == ProtocolVersion::DseV2 {
                total += 4;
            }
        }
        Ok(total)
    }

    pub fn decode(src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        let consistency = Consistency::check(read_short(src)?)?;
        let flags = Self::read_flags(src, version)?;

        if flags.contains(QueryFlags::VALUE_NAMES) && !flags.contains(QueryFlags::VALUES) {
            return Err(ProtocolError::InvalidFlagCombo(
                "VALUE_NAMES set without VALUES",
            ));
        }

        let values = if flags.contains(QueryFlags::VALUES) {
            if flags.contains(QueryFlags::VALUE_NAMES) {
                BoundValues::Named(read_named_values(src, version)?)
            } else {
                BoundValues::Positional(read_positional_values(src, version)?)
            }
        } else {
            BoundValues::None
        };

        let skip_metadata = flags.contains(QueryFlags::SKIP_METADATA);

        let page_size = if flags.contains(QueryFlags::PAGE_SIZE) {
            Some(read_int(src)?)
        } else {
            None
        };
        let page_size_in_bytes = flags.contains(QueryFlags::PAGE_SIZE_BYTES);

        let paging_state = if flags.contains(QueryFlags::PAGING_STATE) {
            crate::primitive::read_bytes(src)?
        } else {
            None
        };

        let serial_consistency = if flags.contains(QueryFlags::SERIAL_CONSISTENCY) {
            Consistency::check(read_short(src)?)?
        } else {
            Consistency::Serial
        };

        let default_timestamp = if flags.contains(QueryFlags::DEFAULT_TIMESTAMP) {
            crate::primitive::read_long(src)?
        } else {
            DEFAULT_TIMESTAMP_NONE
        };

        let keyspace = if flags.contains(QueryFlags::WITH_KEYSPACE) {
            if !has_keyspace_option(version) {
                return Err(ProtocolError::UnsupportedInVersion {
                    feature: "QueryOptions.keyspace",
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
                    feature: "QueryOptions.now_in_seconds",
                    version,
                });
            }
            read_int(src)?
        } else {
            NOW_IN_SECONDS_NONE
        };

        let continuous_paging_options = if flags.contains(QueryFlags::WITH_CONTINUOUS_PAGING) {
            if !version.is_dse() {
                return Err(ProtocolError::UnsupportedInVersion {
                    feature: "QueryOptions.continuous_paging_options",
                    version,
                });
            }
            let max_pages = read_int(src)?;
            let pages_per_second = read_int(src)?;
            let next_pages = if version == ProtocolVersion::DseV2 {
                Some(read_int(src)?)
            } else {
                None
            };
            Some(ContinuousPagingOptions {
                max_pages,
                pages_per_second,
                next_pages,
            })
        } else {
            None
        };

        Ok(QueryOptions {
            consistency,
            values,
            skip_metadata,
            page_size,
            page_size_in_bytes,
            paging_state,
            serial_consistency,
            default_timestamp,
            keyspace,
            now_in_seconds,
            continuous_paging_options,
        })
    }
}
