// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error taxonomy for the CQL/DSE native protocol codec.
//!
//! Every codec function in this crate returns `Result<T, ProtocolError>`.
//! Codecs never retry or log-and-swallow: every detected condition is
//! surfaced to the caller (see `spec.md` §7).

use thiserror::Error;

use crate::catalog::ProtocolVersion;

/// A single tag family that failed a catalog check, paired with the value
/// that was rejected. Carried inside [`ProtocolError::InvalidTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFamily {
    Opcode,
    Consistency,
    BatchType,
    ResultKind,
    SchemaChangeTarget,
    SchemaChangeType,
    EventType,
    StatusChangeType,
    TopologyChangeType,
    DseRevisionType,
    ErrorCode,
    InetAddressLength,
    DataType,
    QueryOrIdKind,
}

impl std::fmt::Display for TagFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TagFamily::Opcode => "opcode",
            TagFamily::Consistency => "consistency level",
            TagFamily::BatchType => "batch type",
            TagFamily::ResultKind => "result kind",
            TagFamily::SchemaChangeTarget => "schema change target",
            TagFamily::SchemaChangeType => "schema change type",
            TagFamily::EventType => "event type",
            TagFamily::StatusChangeType => "status change type",
            TagFamily::TopologyChangeType => "topology change type",
            TagFamily::DseRevisionType => "DSE revision type",
            TagFamily::ErrorCode => "error code",
            TagFamily::InetAddressLength => "inet address length",
            TagFamily::DataType => "data type",
            TagFamily::QueryOrIdKind => "query-or-id kind",
        };
        f.write_str(s)
    }
}

/// Errors a message codec (encode, encoded-length or decode) can raise.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// `encode` (or `encoded_length`) was handed a message whose variant
    /// does not match the codec's opcode.
    #[error("type mismatch: codec for {expected} received a {actual} message")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// A wire tag failed its catalog check.
    #[error("invalid {family}: 0x{value:x}")]
    InvalidTag { family: TagFamily, value: i64 },

    /// A flag combination the wire grammar forbids was observed (e.g.
    /// `VALUE_NAMES` without `VALUES`, named values in BATCH).
    #[error("invalid flag combination: {0}")]
    InvalidFlagCombo(&'static str),

    /// A feature present in the message (or on the wire) is not allowed
    /// under the given protocol version.
    #[error("{feature} is not supported in protocol version {version:?}")]
    UnsupportedInVersion {
        feature: &'static str,
        version: ProtocolVersion,
    },

    /// An identifier or token the codec forbids to be empty was empty.
    #[error("{0} must not be empty")]
    EmptyRequired(&'static str),

    /// A length-prefixed count fell outside the wire grammar's allowed
    /// range (e.g. zero or more than 65535 BATCH children).
    #[error("{what}: {got} is out of range ({min}..={max})")]
    CountOutOfRange {
        what: &'static str,
        got: i64,
        min: i64,
        max: i64,
    },

    /// The underlying source ran out of bytes before a primitive could be
    /// fully read.
    #[error("unexpected end of input: needed {needed} bytes, {available} available")]
    Eof { needed: usize, available: usize },

    /// A length prefix read from the wire was negative where the grammar
    /// requires a non-negative value (e.g. `string`, `long string`).
    #[error("negative length prefix: {0}")]
    NegativeLength(i64),

    /// Bytes were not valid UTF-8 where the grammar requires a `string`.
    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The opcode on the wire (or requested from the registry) has no
    /// registered codec.
    #[error("unknown opcode: 0x{0:02x}")]
    UnknownOpcode(u8),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
