// SPDX-License-Identifier: AGPL-3.0-or-later

//! `Message`: the closed sum type over every opcode (`spec.md` §3, "Message
//! — sum type over the opcodes above. Each variant carries its payload;
//! every variant exposes `opcode()` and `is_response()`"). Generalizes the
//! teacher's `Pdu` `enum_dispatch` sum type (`src/models/parse.rs`) from a
//! fixed-size BHS PDU set to the CQL/DSE opcode set.

use bytes::{Buf, BufMut};

use crate::{
    catalog::{Opcode, ProtocolVersion, RequestOpcode, ResponseOpcode},
    error::Result,
    messages::{
        auth_token::{AuthChallenge, AuthResponse, AuthSuccess},
        authenticate::Authenticate,
        batch::Batch,
        dse_revise::DseRevise,
        empty::{Options, Ready},
        error_message::ErrorMessage,
        event::Event,
        execute::Execute,
        prepare::Prepare,
        query::Query,
        register::Register,
        result::ResultBody,
        startup::Startup,
        supported::Supported,
    },
};

/// Sum type over every request and response opcode. Every variant owns its
/// payload; no variant stores a raw opcode byte or flag bitmap (`spec.md`
/// §9, "Flag computation vs. flag storage").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Startup(Startup),
    Options(Options),
    Query(Query),
    Prepare(Prepare),
    Execute(Execute),
    Register(Register),
    Batch(Batch),
    AuthResponse(AuthResponse),
    DseRevise(DseRevise),

    Error(ErrorMessage),
    Ready(Ready),
    Authenticate(Authenticate),
    Supported(Supported),
    Result(ResultBody),
    Event(Event),
    AuthChallenge(AuthChallenge),
    AuthSuccess(AuthSuccess),
}

impl Message {
    pub const fn opcode(&self) -> Opcode {
        match self {
            Message::Startup(_) => Opcode::Request(RequestOpcode::Startup),
            Message::Options(_) => Opcode::Request(RequestOpcode::Options),
            Message::Query(_) => Opcode::Request(RequestOpcode::Query),
            Message::Prepare(_) => Opcode::Request(RequestOpcode::Prepare),
            Message::Execute(_) => Opcode::Request(RequestOpcode::Execute),
            Message::Register(_) => Opcode::Request(RequestOpcode::Register),
            Message::Batch(_) => Opcode::Request(RequestOpcode::Batch),
            Message::AuthResponse(_) => Opcode::Request(RequestOpcode::AuthResponse),
            Message::DseRevise(_) => Opcode::Request(RequestOpcode::DseRevise),
            Message::Error(_) => Opcode::Response(ResponseOpcode::Error),
            Message::Ready(_) => Opcode::Response(ResponseOpcode::Ready),
            Message::Authenticate(_) => Opcode::Response(ResponseOpcode::Authenticate),
            Message::Supported(_) => Opcode::Response(ResponseOpcode::Supported),
            Message::Result(_) => Opcode::Response(ResponseOpcode::Result),
            Message::Event(_) => Opcode::Response(ResponseOpcode::Event),
            Message::AuthChallenge(_) => Opcode::Response(ResponseOpcode::AuthChallenge),
            Message::AuthSuccess(_) => Opcode::Response(ResponseOpcode::AuthSuccess),
        }
    }

    pub const fn is_response(&self) -> bool {
        matches!(self.opcode(), Opcode::Response(_))
    }

    pub fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        match self {
            Message::Startup(m) => m.encode(sink),
            Message::Options(m) => m.encode(sink),
            Message::Query(m) => m.encode(sink, version),
            Message::Prepare(m) => m.encode(sink, version),
            Message::Execute(m) => m.encode(sink, version),
            Message::Register(m) => m.encode(sink),
            Message::Batch(m) => m.encode(sink, version),
            Message::AuthResponse(m) => m.encode(sink),
            Message::DseRevise(m) => m.encode(sink, version),
            Message::Error(m) => m.encode(sink, version),
            Message::Ready(m) => m.encode(sink),
            Message::Authenticate(m) => m.encode(sink),
            Message::Supported(m) => m.encode(sink),
            Message::Result(m) => m.encode(sink, version),
            Message::Event(m) => m.encode(sink, version),
            Message::AuthChallenge(m) => m.encode(sink),
            Message::AuthSuccess(m) => m.encode(sink),
        }
    }

    pub fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        match self {
            Message::Startup(m) => m.encoded_len(),
            Message::Options(m) => m.encoded_len(),
            Message::Query(m) => m.encoded_len(version),
            Message::Prepare(m) => m.encoded_len(version),
            Message::Execute(m) => m.encoded_len(version),
            Message::Register(m) => m.encoded_len(),
            Message::Batch(m) => m.encoded_len(version),
            Message::AuthResponse(m) => m.encoded_len(),
            Message::DseRevise(m) => m.encoded_len(version),
            Message::Error(m) => m.encoded_len(version),
            Message::Ready(m) => m.encoded_len(),
            Message::Authenticate(m) => m.encoded_len(),
            Message::Supported(m) => m.encoded_len(),
            Message::Result(m) => m.encoded_len(version),
            Message::Event(m) => m.encoded_len(version),
            Message::AuthChallenge(m) => m.encoded_len(),
            Message::AuthSuccess(m) => m.encoded_len(),
        }
    }

    /// Decode a message body for a known `opcode`. The caller (typically
    /// [`crate::registry::Registry`]) is responsible for resolving the raw
    /// wire byte to an [`Opcode`] first.
    pub fn decode(opcode: Opcode, src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        Ok(match opcode {
            Opcode::Request(RequestOpcode::Startup) => Message::Startup(Startup::decode(src)?),
            Opcode::Request(RequestOpcode::Options) => Message::Options(Options::decode(src)?),
            Opcode::Request(RequestOpcode::Query) => Message::Query(Query::decode(src, version)?),
            Opcode::Request(RequestOpcode::Prepare) => Message::Prepare(Prepare::decode(src, version)?),
            Opcode::Request(RequestOpcode::Execute) => Message::Execute(Execute::decode(src, version)?),
            Opcode::Request(RequestOpcode::Register) => Message::Register(Register::decode(src)?),
            Opcode::Request(RequestOpcode::Batch) => Message::Batch(Batch::decode(src, version)?),
            Opcode::Request(RequestOpcode::AuthResponse) => {
                Message::AuthResponse(AuthResponse::decode(src)?)
            },
            Opcode::Request(RequestOpcode::DseRevise) => Message::DseRevise(DseRevise::decode(src, version)?),
            Opcode::Response(ResponseOpcode::Error) => Message::Error(ErrorMessage::decode(src, version)?),
            Opcode::Response(ResponseOpcode::Ready) => Message::Ready(Ready::decode(src)?),
            Opcode::Response(ResponseOpcode::Authenticate) => {
                Message::Authenticate(Authenticate::decode(src)?)
            },
            Opcode::Response(ResponseOpcode::Supported) => Message::Supported(Supported::decode(src)?),
            Opcode::Response(ResponseOpcode::Result) => Message::Result(ResultBody::decode(src, version)?),
            Opcode::Response(ResponseOpcode::Event) => Message::Event(Event::decode(src, version)?),
            Opcode::Response(ResponseOpcode::AuthChallenge) => {
                Message::AuthChallenge(AuthChallenge::decode(src)?)
            },
            Opcode::Response(ResponseOpcode::AuthSuccess) => {
                Message::AuthSuccess(AuthSuccess::decode(src)?)
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::messages::startup::Startup;

    #[test]
    fn opcode_and_direction_are_consistent() {
        let msg = Message::Startup(Startup::default());
        assert_eq!(msg.opcode(), Opcode::Request(RequestOpcode::Startup));
        assert!(!msg.is_response());

        let msg = Message::Ready(Ready);
        assert_eq!(msg.opcode(), Opcode::Response(ResponseOpcode::Ready));
        assert!(msg.is_response());
    }

    #[test]
    fn round_trip_through_opcode_dispatch() {
        let msg = Message::Query(Query {
            query: "SELECT".into(),
            options: Default::default(),
        });
        let mut buf = BytesMut::new();
        msg.encode(&mut buf, ProtocolVersion::V3).unwrap();
        assert_eq!(buf.len(), msg.encoded_len(ProtocolVersion::V3).unwrap());
        let mut r = &buf[..];
        let decoded = Message::decode(msg.opcode(), &mut r, ProtocolVersion::V3).unwrap();
        assert_eq!(decoded, msg);
    }
}
