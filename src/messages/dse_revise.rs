// SPDX-License-Identifier: AGPL-3.0-or-later

//! DSE REVISE request body (`spec.md` §4.F.10): only valid on DSE versions.

use bytes::{Buf, BufMut};

use crate::{
    catalog::{DseRevisionType, ProtocolVersion},
    error::{ProtocolError, Result},
    primitive::{read_int, write_int},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DseRevise {
    pub revision_type: DseRevisionType,
    pub target_stream_id: i32,
    pub next_pages: Option<i32>,
}

impl DseRevise {
    pub fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        if !version.is_dse() {
            return Err(ProtocolError::UnsupportedInVersion {
                feature: "DSE_REVISE",
                version,
            });
        }
        write_int(sink, self.revision_type.as_i32());
        write_int(sink, self.target_stream_id);
        if self.revision_type == DseRevisionType::MoreContinuousPages {
            if version != ProtocolVersion::DseV2 {
                return Err(ProtocolError::UnsupportedInVersion {
                    feature: "DSE_REVISE.next_pages",
                    version,
                });
            }
            write_int(sink, self.next_pages.unwrap_or(0));
        }
        Ok(())
    }

    pub fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        if !version.is_dse() {
            return Err(ProtocolError::UnsupportedInVersion {
                feature: "DSE_REVISE",
                version,
            });
        }
        let mut total = 8;
        if self.revision_type == DseRevisionType::MoreContinuousPages {
            if version != ProtocolVersion::DseV2 {
                return Err(ProtocolError::UnsupportedInVersion {
                    feature: "DSE_REVISE.next_pages",
                    version,
                });
            }
            total += 4;
        }
        Ok(total)
    }

    pub fn decode(src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        if !version.is_dse() {
            return Err(ProtocolError::UnsupportedInVersion {
                feature: "DSE_REVISE",
                version,
            });
        }
        let revision_type = DseRevisionType::check(read_int(src)?)?;
        let target_stream_id = read_int(src)?;
        let next_pages = if revision_type == DseRevisionType::MoreContinuousPages {
            if version != ProtocolVersion::DseV2 {
                return Err(ProtocolError::UnsupportedInVersion {
                    feature: "DSE_REVISE.next_pages",
                    version,
                });
            }
            Some(read_int(src)?)
        } else {
            None
        };
        Ok(DseRevise {
            revision_type,
            target_stream_id,
            next_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn cancel_round_trip_on_dse_v1() {
        let msg = DseRevise {
            revision_type: DseRevisionType::CancelContinuousPaging,
            target_stream_id: 7,
            next_pages: None,
        };
        let mut buf = BytesMut::new();
        msg.encode(&mut buf, ProtocolVersion::DseV1).unwrap();
        assert_eq!(buf.len(), msg.encoded_len(ProtocolVersion::DseV1).unwrap());
        let mut r = &buf[..];
        assert_eq!(DseRevise::decode(&mut r, ProtocolVersion::DseV1).unwrap(), msg);
    }

    #[test]
    fn more_pages_requires_dse_v2() {
        let msg = DseRevise {
            revision_type: DseRevisionType::MoreContinuousPages,
            target_stream_id: 7,
            next_pages: Some(10),
        };
        let mut buf = BytesMut::new();
        assert!(matches!(
            msg.encode(&mut buf, ProtocolVersion::DseV1).unwrap_err(),
            ProtocolError::UnsupportedInVersion { .. }
        ));
        let mut buf = BytesMut::new();
        msg.encode(&mut buf, ProtocolVersion::DseV2).unwrap();
        let mut r = &buf[..];
        assert_eq!(DseRevise::decode(&mut r, ProtocolVersion::DseV2).unwrap(), msg);
    }

    #[test]
    fn rejected_on_non_dse_version() {
        let msg = DseRevise {
            revision_type: DseRevisionType::CancelContinuousPaging,
            target_stream_id: 1,
            next_pages: None,
        };
        let mut buf = BytesMut::new();
        assert!(matches!(
            msg.encode(&mut buf, ProtocolVersion::V5).unwrap_err(),
            ProtocolError::UnsupportedInVersion { .. }
        ));
    }
}
