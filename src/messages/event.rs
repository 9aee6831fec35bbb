// SPDX-License-Identifier: AGPL-3.0-or-later

//! EVENT response body (`spec.md` §4.F.9): a `string event_type` tag
//! followed by a per-variant payload. The `SCHEMA_CHANGE` variant shares its
//! wire layout with the RESULT family's `SchemaChange`.

use std::net::IpAddr;

use bytes::{Buf, BufMut};

use crate::{
    catalog::{EventType, ProtocolVersion, StatusChangeType, TopologyChangeType},
    error::Result,
    messages::schema_change::SchemaChangeBody,
    primitive::{inet_len, read_inet, read_string, string_len, write_inet, write_string},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SchemaChange(SchemaChangeBody),
    StatusChange {
        change_type: StatusChangeType,
        address: (IpAddr, i32),
    },
    TopologyChange {
        change_type: TopologyChangeType,
        address: (IpAddr, i32),
    },
}

impl Event {
    fn event_type(&self) -> EventType {
        match self {
            Event::SchemaChange(_) => EventType::SchemaChange,
            Event::StatusChange { .. } => EventType::StatusChange,
            Event::TopologyChange { .. } => EventType::TopologyChange,
        }
    }

    pub fn encode(&self, sink: &mut impl BufMut, version: ProtocolVersion) -> Result<()> {
        write_string(sink, self.event_type().as_str());
        match self {
            Event::SchemaChange(body) => body.encode(sink, version)?,
            Event::StatusChange { change_type, address } => {
                write_string(sink, change_type.as_str());
                write_inet(sink, address.0, address.1);
            },
            Event::TopologyChange { change_type, address } => {
                write_string(sink, change_type.as_str());
                write_inet(sink, address.0, address.1);
            },
        }
        Ok(())
    }

    pub fn encoded_len(&self, version: ProtocolVersion) -> Result<usize> {
        let mut total = string_len(self.event_type().as_str());
        total += match self {
            Event::SchemaChange(body) => body.encoded_len(version)?,
            Event::StatusChange { change_type, address } => {
                string_len(change_type.as_str()) + inet_len(address.0)
            },
            Event::TopologyChange { change_type, address } => {
                string_len(change_type.as_str()) + inet_len(address.0)
            },
        };
        Ok(total)
    }

    pub fn decode(src: &mut impl Buf, version: ProtocolVersion) -> Result<Self> {
        let event_type = EventType::check(&read_string(src)?)?;
        Ok(match event_type {
            EventType::SchemaChange => Event::SchemaChange(SchemaChangeBody::decode(src, version)?),
            EventType::StatusChange => {
                let change_type = StatusChangeType::check(&read_string(src)?)?;
                let address = read_inet(src)?;
                Event::StatusChange { change_type, address }
            },
            EventType::TopologyChange => {
                let change_type = TopologyChangeType::check(&read_string(src)?)?;
                let address = read_inet(src)?;
                Event::TopologyChange { change_type, address }
            },
        })
    }
}
