// SPDX-License-Identifier: AGPL-3.0-or-later

//! REGISTER request body: a `string list` of event-type tags (`spec.md`
//! §4.F.1). Encode rejects an empty list and any tag that fails the
//! `EventType` catalog check.

use bytes::{Buf, BufMut};

use crate::{
    catalog::EventType,
    error::{ProtocolError, Result},
    primitive::{read_string_list, string_list_len, write_string_list},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub event_types: Vec<EventType>,
}

impl Register {
    fn tags(&self) -> Vec<String> {
        self.event_types.iter().map(|e| e.as_str().to_string()).collect()
    }

    pub fn encode(&self, sink: &mut impl BufMut) -> Result<()> {
        if self.event_types.is_empty() {
            return Err(ProtocolError::EmptyRequired("REGISTER event types"));
        }
        write_string_list(sink, &self.tags());
        Ok(())
    }

    pub fn encoded_len(&self) -> Result<usize> {
        if self.event_types.is_empty() {
            return Err(ProtocolError::EmptyRequired("REGISTER event types"));
        }
        Ok(string_list_len(&self.tags()))
    }

    pub fn decode(src: &mut impl Buf) -> Result<Self> {
        let raw = read_string_list(src)?;
        let event_types = raw
            .iter()
            .map(|s| EventType::check(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Register { event_types })
    }
}

/// Consuming builder, mirroring the teacher's per-message builder style.
#[derive(Debug, Default)]
pub struct RegisterBuilder {
    event_types: Vec<EventType>,
}

impl RegisterBuilder {
    pub fn new() -> Self {
        RegisterBuilder::default()
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_types.push(event_type);
        self
    }

    pub fn build(self) -> Register {
        Register {
            event_types: self.event_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn round_trip() {
        let msg = RegisterBuilder::new()
            .event_type(EventType::SchemaChange)
            .event_type(EventType::StatusChange)
            .build();
        let mut buf = BytesMut::new();
        msg.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), msg.encoded_len().unwrap());
        let mut r = &buf[..];
        assert_eq!(Register::decode(&mut r).unwrap(), msg);
    }

    #[test]
    fn empty_rejected_on_encode() {
        let msg = Register { event_types: vec![] };
        let mut buf = BytesMut::new();
        assert!(matches!(
            msg.encode(&mut buf).unwrap_err(),
            ProtocolError::EmptyRequired(_)
        ));
    }
}
