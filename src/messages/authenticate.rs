// SPDX-License-Identifier: AGPL-3.0-or-later

//! AUTHENTICATE response body: a non-empty `string` authenticator class
//! name (`spec.md` §4.F.1).

use bytes::{Buf, BufMut};

use crate::{
    error::{ProtocolError, Result},
    primitive::{read_string, string_len, write_string},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticate {
    pub authenticator: String,
}

impl Authenticate {
    pub fn encode(&self, sink: &mut impl BufMut) -> Result<()> {
        if self.authenticator.is_empty() {
            return Err(ProtocolError::EmptyRequired("authenticator class name"));
        }
        write_string(sink, &self.authenticator);
        Ok(())
    }

    pub fn encoded_len(&self) -> Result<usize> {
        if self.authenticator.is_empty() {
            return Err(ProtocolError::EmptyRequired("authenticator class name"));
        }
        Ok(string_len(&self.authenticator))
    }

    pub fn decode(src: &mut impl Buf) -> Result<Self> {
        Ok(Authenticate {
            authenticator: read_string(src)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn round_trip() {
        let msg = Authenticate {
            authenticator: "org.apache.cassandra.auth.PasswordAuthenticator".into(),
        };
        let mut buf = BytesMut::new();
        msg.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), msg.encoded_len().unwrap());
        let mut r = &buf[..];
        assert_eq!(Authenticate::decode(&mut r).unwrap(), msg);
    }

    #[test]
    fn empty_rejected_on_encode() {
        let msg = Authenticate {
            authenticator: String::new(),
        };
        let mut buf = BytesMut::new();
        assert!(matches!(
            msg.encode(&mut buf).unwrap_err(),
            ProtocolError::EmptyRequired(_)
        ));
    }

    #[test]
    fn scenario_s1_authenticate_round_trip() {
        let msg = Authenticate {
            authenticator: "dummy".into(),
        };
        let mut buf = BytesMut::new();
        msg.encode(&mut buf).unwrap();
        assert_eq!(&buf[..], &[0x00, 0x05, b'd', b'u', b'm', b'm', b'y']);
    }
}
