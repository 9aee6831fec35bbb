// SPDX-License-Identifier: AGPL-3.0-or-later

//! The empty-body messages: OPTIONS (request) and READY (response)
//! (`spec.md` §4.F.1).

use bytes::{Buf, BufMut};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options;

impl Options {
    pub fn encode(&self, _sink: &mut impl BufMut) -> Result<()> {
        Ok(())
    }

    pub fn encoded_len(&self) -> Result<usize> {
        Ok(0)
    }

    pub fn decode(_src: &mut impl Buf) -> Result<Self> {
        Ok(Options)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ready;

impl Ready {
    pub fn encode(&self, _sink: &mut impl BufMut) -> Result<()> {
        Ok(())
    }

    pub fn encoded_len(&self) -> Result<usize> {
        Ok(0)
    }

    pub fn decode(_src: &mut impl Buf) -> Result<Self> {
        Ok(Ready)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn options_round_trip() {
        let mut buf = BytesMut::new();
        Options.encode(&mut buf).unwrap();
        assert!(buf.is_empty());
        let mut r = &buf[..];
        assert_eq!(Options::decode(&mut r).unwrap(), Options);
    }

    #[test]
    fn ready_round_trip() {
        let mut buf = BytesMut::new();
        Ready.encode(&mut buf).unwrap();
        assert!(buf.is_empty());
        let mut r = &buf[..];
        assert_eq!(Ready::decode(&mut r).unwrap(), Ready);
    }
}
