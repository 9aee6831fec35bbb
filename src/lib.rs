// SPDX-License-Identifier: AGPL-3.0-or-later

//! CQL/DSE native protocol message codec: typed encode/decode for every
//! opcode of the Cassandra/DataStax Enterprise binary protocol (v3, v4, v5,
//! Beta, and DSE v1/v2), plus the sub-codecs (`QueryOptions`, `RowsMetadata`,
//! data-type descriptors) those messages embed.

pub mod catalog;
pub mod datatype;
pub mod error;
pub mod message;
pub mod messages;
pub mod primitive;
pub mod query_options;
pub mod registry;
pub mod rows_metadata;
pub mod value;

pub use catalog::{Opcode, ProtocolVersion, RequestOpcode, ResponseOpcode};
pub use error::{ProtocolError, Result};
pub use message::Message;
pub use registry::{Codec, Registry};
