// SPDX-License-Identifier: AGPL-3.0-or-later

//! `value` primitive with its version-gated UNSET variant (`spec.md` §3, §6).

use bytes::{Buf, BufMut};

use crate::{
    catalog::ProtocolVersion,
    error::{ProtocolError, Result},
};

/// A single bound value: a regular payload, an explicit NULL, or (V4+
/// only) UNSET — "leave the column/parameter untouched".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Regular(Vec<u8>),
    Null,
    Unset,
}

impl Value {
    pub fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        match self {
            Value::Regular(b) => {
                crate::primitive::write_int(sink, b.len() as i32);
                sink.put_slice(b);
            },
            Value::Null => crate::primitive::write_int(sink, -1),
            Value::Unset => {
                if !version.at_least(ProtocolVersion::V4) {
                    return Err(ProtocolError::UnsupportedInVersion {
                        feature: "Value::Unset",
                        version,
                    });
                }
                crate::primitive::write_int(sink, -2);
            },
        }
        Ok(())
    }

    pub fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        match self {
            Value::Regular(b) => Ok(4 + b.len()),
            Value::Null => Ok(4),
            Value::Unset => {
                if !version.at_least(ProtocolVersion::V4) {
                    return Err(ProtocolError::UnsupportedInVersion {
                        feature: "Value::Unset",
                        version,
                    });
                }
                Ok(4)
            },
        }
    }

    pub fn decode(src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        let n = crate::primitive::read_int(src)?;
        match n {
            -1 => Ok(Value::Null),
            -2 => {
                if !version.at_least(ProtocolVersion::V4) {
                    return Err(ProtocolError::UnsupportedInVersion {
                        feature: "Value::Unset",
                        version,
                    });
                }
                Ok(Value::Unset)
            },
            n if n >= 0 => {
                let n = n as usize;
                if src.remaining() < n {
                    return Err(ProtocolError::Eof {
                        needed: n,
                        available: src.remaining(),
                    });
                }
                let mut buf = vec![0u8; n];
                src.copy_to_slice(&mut buf);
                Ok(Value::Regular(buf))
            },
            other => Err(ProtocolError::NegativeLength(other as i64)),
        }
    }
}

/// `[short]` count followed by `{string, value}` pairs — used when
/// `QueryFlags::VALUE_NAMES` is set.
pub fn write_named_values(
    sink: &mut impl BufMut,
    items: &[(String, Value)],
    version: ProtocolVersion,
) -> Result<()> {
    crate::primitive::write_short(sink, items.len() as u16);
    for (name, v) in items {
        crate::primitive::write_string(sink, name);
        v.encode(sink, version)?;
    }
    Ok(())
}

pub fn named_values_len(items: &[(String, Value)], version: ProtocolVersion) -> Result<usize> {
    let mut total = 2;
    for (name, v) in items {
        total += crate::primitive::string_len(name) + v.encoded_len(version)?;
    }
    Ok(total)
}

pub fn read_named_values(
    src: &mut impl Buf,
    version: ProtocolVersion,
) -> Result<Vec<(String, Value)>> {
    let n = crate::primitive::read_short(src)? as usize;
    (0..n)
        .map(|_| {
            let name = crate::primitive::read_string(src)?;
            let value = Value::decode(src, version)?;
            Ok((name, value))
        })
        .collect()
}

/// `[short]` count followed by positional `value`s.
pub fn write_positional_values(
    sink: &mut impl BufMut,
    items: &[Value],
    version: ProtocolVersion,
) -> Result<()> {
    crate::primitive::write_short(sink, items.len() as u16);
    for v in items {
        v.encode(sink, version)?;
    }
    Ok(())
}

pub fn positional_values_len(items: &[Value], version: ProtocolVersion) -> Result<usize> {
    let mut total = 2;
    for v in items {
        total += v.encoded_len(version)?;
    }
    Ok(total)
}

pub fn read_positional_values(
    src: &mut impl Buf,
    version: ProtocolVersion,
) -> Result<Vec<Value>> {
    let n = crate::primitive::read_short(src)? as usize;
    (0..n).map(|_| Value::decode(src, version)).collect()
}

/// Bound values attached to a QUERY/EXECUTE/BATCH-child: either all
/// positional, or all named (`VALUE_NAMES` implies named form).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BoundValues {
    #[default]
    None,
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl BoundValues {
    pub fn is_present(&self) -> bool {
        !matches!(self, BoundValues::None)
    }

    pub fn is_named(&self) -> bool {
        matches!(self, BoundValues::Named(_))
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn unset_rejected_before_v4() {
        let mut buf = BytesMut::new();
        let err = Value::Unset.encode(&mut buf, ProtocolVersion::V3).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedInVersion { .. }));
    }

    #[test]
    fn unset_round_trips_at_v4() {
        let mut buf = BytesMut::new();
        Value::Unset.encode(&mut buf, ProtocolVersion::V4).unwrap();
        let mut r = &buf[..];
        assert_eq!(Value::decode(&mut r, ProtocolVersion::V4).unwrap(), Value::Unset);
    }

    #[test]
    fn length_agreement() {
        let v = Value::Regular(vec![1, 2, 3, 4]);
        let mut buf = BytesMut::new();
        v.encode(&mut buf, ProtocolVersion::V4).unwrap();
        assert_eq!(buf.len(), v.encoded_len(ProtocolVersion::V4).unwrap());
    }
}
