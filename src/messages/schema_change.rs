// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shared `SchemaChange` body, byte-identical between the RESULT family
//! (`spec.md` §4.F.7) and the EVENT family (§4.F.9).

use bytes::{Buf, BufMut};

use crate::{
    catalog::{ProtocolVersion, SchemaChangeTarget, SchemaChangeType},
    error::{ProtocolError, Result},
    primitive::{read_string, read_string_list, string_len, string_list_len, write_string, write_string_list},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaChangeBody {
    pub change_type: SchemaChangeType,
    pub target: SchemaChangeTarget,
    pub keyspace: String,
    pub object: Option<String>,
    pub arguments: Option<Vec<String>>,
}

impl SchemaChangeBody {
    pub fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        write_string(sink, self.change_type.as_str());
        write_string(sink, self.target.as_str());
        write_string(sink, &self.keyspace);
        match self.target {
            SchemaChangeTarget::Keyspace => {},
            SchemaChangeTarget::Table | SchemaChangeTarget::Type => {
                let object = self
                    .object
                    .as_deref()
                    .ok_or(ProtocolError::EmptyRequired("schema change object"))?;
                write_string(sink, object);
            },
            SchemaChangeTarget::Function | SchemaChangeTarget::Aggregate => {
                if !version.at_least(ProtocolVersion::V4) {
                    return Err(ProtocolError::UnsupportedInVersion {
                        feature: "SchemaChange.target=FUNCTION/AGGREGATE",
                        version,
                    });
                }
                let object = self
                    .object
                    .as_deref()
                    .ok_or(ProtocolError::EmptyRequired("schema change object"))?;
                write_string(sink, object);
                write_string_list(sink, self.arguments.as_deref().unwrap_or(&[]));
            },
        }
        Ok(())
    }

    pub fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        let mut total = string_len(self.change_type.as_str())
            + string_len(self.target.as_str())
            + string_len(&self.keyspace);
        match self.target {
            SchemaChangeTarget::Keyspace => {},
            SchemaChangeTarget::Table | SchemaChangeTarget::Type => {
                let object = self
                    .object
                    .as_deref()
                    .ok_or(ProtocolError::EmptyRequired("schema change object"))?;
                total += string_len(object);
            },
            SchemaChangeTarget::Function | SchemaChangeTarget::Aggregate => {
                if !version.at_least(ProtocolVersion::V4) {
                    return Err(ProtocolError::UnsupportedInVersion {
                        feature: "SchemaChange.target=FUNCTION/AGGREGATE",
                        version,
                    });
                }
                let object = self
                    .object
                    .as_deref()
                    .ok_or(ProtocolError::EmptyRequired("schema change object"))?;
                total += string_len(object) + string_list_len(self.arguments.as_deref().unwrap_or(&[]));
            },
        }
        Ok(total)
    }

    pub fn decode(src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        let change_type = SchemaChangeType::check(&read_string(src)?)?;
        let target = SchemaChangeTarget::check(&read_string(src)?)?;
        let keyspace = read_string(src)?;
        let (object, arguments) = match target {
            SchemaChangeTarget::Keyspace => (None, None),
            SchemaChangeTarget::Table | SchemaChangeTarget::Type => {
                (Some(read_string(src)?), None)
            },
            SchemaChangeTarget::Function | SchemaChangeTarget::Aggregate => {
                if !version.at_least(ProtocolVersion::V4) {
                    return Err(ProtocolError::UnsupportedInVersion {
                        feature: "SchemaChange.target=FUNCTION/AGGREGATE",
                        version,
                    });
                }
                let object = read_string(src)?;
                let arguments = read_string_list(src)?;
                (Some(object), Some(arguments))
            },
        };
        Ok(SchemaChangeBody {
            change_type,
            target,
            keyspace,
            object,
            arguments,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn keyspace_target_round_trip() {
        let body = SchemaChangeBody {
            change_type: SchemaChangeType::Created,
            target: SchemaChangeTarget::Keyspace,
            keyspace: "ks".into(),
            object: None,
            arguments: None,
        };
        let mut buf = BytesMut::new();
        body.encode(&mut buf, ProtocolVersion::V4).unwrap();
        assert_eq!(buf.len(), body.encoded_len(ProtocolVersion::V4).unwrap());
        let mut r = &buf[..];
        assert_eq!(SchemaChangeBody::decode(&mut r, ProtocolVersion::V4).unwrap(), body);
    }

    #[test]
    fn function_target_rejected_pre_v4() {
        let body = SchemaChangeBody {
            change_type: SchemaChangeType::Updated,
            target: SchemaChangeTarget::Function,
            keyspace: "ks".into(),
            object: Some("f".into()),
            arguments: Some(vec!["int".into()]),
        };
        let mut buf = BytesMut::new();
        let err = body.encode(&mut buf, ProtocolVersion::V3).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedInVersion { .. }));
    }

    #[test]
    fn function_target_round_trip_at_v4() {
        let body = SchemaChangeBody {
            change_type: SchemaChangeType::Updated,
            target: SchemaChangeTarget::Function,
            keyspace: "ks".into(),
            object: Some("f".into()),
            arguments: Some(vec!["int".into(), "text".into()]),
        };
        let mut buf = BytesMut::new();
        body.encode(&mut buf, ProtocolVersion::V4).unwrap();
        let mut r = &buf[..];
        assert_eq!(SchemaChangeBody::decode(&mut r, ProtocolVersion::V4).unwrap(), body);
    }
}
