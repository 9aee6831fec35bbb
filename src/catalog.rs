// SPDX-License-Identifier: AGPL-3.0-or-later

//! Version & flag catalog (component A): protocol versions, opcodes,
//! consistency levels, batch types, event/schema-change/status/topology
//! kinds, DSE revision types, and the query/prepare/rows flag bit masks.
//!
//! Every tag family here exposes a `check` function that turns a raw wire
//! value into a typed variant or a [`ProtocolError::InvalidTag`]. Decode call
//! sites are expected to call `check` immediately after reading the tag,
//! before branching on it (mirrors the teacher's `Opcode::from_u6` /
//! `BhsOpcode::try_from` pattern in `models/opcode.rs`, generalized to every
//! tag family the protocol defines instead of just the BHS opcode byte).

use crate::error::{ProtocolError, Result, TagFamily};

/// Protocol version tag. DSE versions are *not* a linear extension of V5;
/// feature gates on DSE must be expressed as explicit predicates, never via
/// `Ord` on this type (see `spec.md` §3 and §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    V3,
    V4,
    V5,
    Beta,
    DseV1,
    DseV2,
}

impl ProtocolVersion {
    /// Raw byte as it appears in the frame header (out of scope here, but
    /// codecs key off it via `as_u8`/`from_u8` for round-tripping fixtures).
    pub const fn as_u8(self) -> u8 {
        match self {
            ProtocolVersion::V3 => 3,
            ProtocolVersion::V4 => 4,
            ProtocolVersion::V5 => 5,
            ProtocolVersion::Beta => 0x40 | 5,
            ProtocolVersion::DseV1 => 0x41,
            ProtocolVersion::DseV2 => 0x42,
        }
    }

    /// True for any of the three "ordinary" OSS Cassandra versions that
    /// participate in the V3 ≤ V4 ≤ V5 feature ordering. DSE versions are
    /// deliberately excluded: they gate their own feature set explicitly.
    const fn oss_rank(self) -> Option<u8> {
        match self {
            ProtocolVersion::V3 => Some(3),
            ProtocolVersion::V4 => Some(4),
            ProtocolVersion::V5 | ProtocolVersion::Beta => Some(5),
            ProtocolVersion::DseV1 | ProtocolVersion::DseV2 => None,
        }
    }

    /// `true` for `DseV1` and `DseV2`.
    pub const fn is_dse(self) -> bool {
        matches!(self, ProtocolVersion::DseV1 | ProtocolVersion::DseV2)
    }

    /// `self` is at least OSS protocol version `v`. Returns `false` for any
    /// DSE version, since DSE is not part of the OSS ordering — callers that
    /// mean "V5 or DSE" must say so explicitly (see [`Self::at_least_v5_or_dse`]).
    pub const fn at_least(self, v: ProtocolVersion) -> bool {
        match (self.oss_rank(), v.oss_rank()) {
            (Some(a), Some(b)) => a >= b,
            _ => false,
        }
    }

    /// `self` is V5/Beta or any DSE version. Used by gates that are V5+ in
    /// OSS but also apply uniformly across the DSE line (e.g. `WITH_KEYSPACE`).
    pub const fn at_least_v5_or_dse(self) -> bool {
        self.at_least(ProtocolVersion::V5) || self.is_dse()
    }

    /// Width, in bytes, of a flags bitmap carried by this version: 1 byte
    /// below V5, 4 bytes from V5 onward (including both DSE versions, which
    /// extend the V5 bitmap with two extra high bits). Centralised here per
    /// `spec.md` §9 ("Widening flags across versions").
    pub const fn flags_width(self) -> usize {
        if self.at_least_v5_or_dse() { 4 } else { 1 }
    }
}

/// Request opcodes, client → server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestOpcode {
    Startup,
    Options,
    Query,
    Prepare,
    Execute,
    Register,
    Batch,
    AuthResponse,
    DseRevise,
}

impl RequestOpcode {
    pub const fn as_u8(self) -> u8 {
        match self {
            RequestOpcode::Startup => 0x01,
            RequestOpcode::Options => 0x05,
            RequestOpcode::Query => 0x07,
            RequestOpcode::Prepare => 0x09,
            RequestOpcode::Execute => 0x0A,
            RequestOpcode::Register => 0x0B,
            RequestOpcode::Batch => 0x0D,
            RequestOpcode::AuthResponse => 0x0F,
            RequestOpcode::DseRevise => 0xFF,
        }
    }

    pub const fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0x01 => RequestOpcode::Startup,
            0x05 => RequestOpcode::Options,
            0x07 => RequestOpcode::Query,
            0x09 => RequestOpcode::Prepare,
            0x0A => RequestOpcode::Execute,
            0x0B => RequestOpcode::Register,
            0x0D => RequestOpcode::Batch,
            0x0F => RequestOpcode::AuthResponse,
            0xFF => RequestOpcode::DseRevise,
            _ => return None,
        })
    }
}

/// Response opcodes, server → client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseOpcode {
    Error,
    Ready,
    Authenticate,
    Supported,
    Result,
    Event,
    AuthChallenge,
    AuthSuccess,
}

impl ResponseOpcode {
    pub const fn as_u8(self) -> u8 {
        match self {
            ResponseOpcode::Error => 0x00,
            ResponseOpcode::Ready => 0x02,
            ResponseOpcode::Authenticate => 0x03,
            ResponseOpcode::Supported => 0x06,
            ResponseOpcode::Result => 0x08,
            ResponseOpcode::Event => 0x0C,
            ResponseOpcode::AuthChallenge => 0x0E,
            ResponseOpcode::AuthSuccess => 0x10,
        }
    }

    pub const fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0x00 => ResponseOpcode::Error,
            0x02 => ResponseOpcode::Ready,
            0x03 => ResponseOpcode::Authenticate,
            0x06 => ResponseOpcode::Supported,
            0x08 => ResponseOpcode::Result,
            0x0C => ResponseOpcode::Event,
            0x0E => ResponseOpcode::AuthChallenge,
            0x10 => ResponseOpcode::AuthSuccess,
            _ => return None,
        })
    }
}

/// Either direction's opcode, as it appears in the frame header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Request(RequestOpcode),
    Response(ResponseOpcode),
}

impl Opcode {
    pub const fn as_u8(self) -> u8 {
        match self {
            Opcode::Request(r) => r.as_u8(),
            Opcode::Response(r) => r.as_u8(),
        }
    }

    pub fn check(raw: u8, is_response: bool) -> Result<Self> {
        if is_response {
            ResponseOpcode::from_u8(raw)
                .map(Opcode::Response)
                .ok_or(ProtocolError::UnknownOpcode(raw))
        } else {
            RequestOpcode::from_u8(raw)
                .map(Opcode::Request)
                .ok_or(ProtocolError::UnknownOpcode(raw))
        }
    }

    /// Human-readable tag for error messages (`ProtocolError::TypeMismatch`).
    pub const fn name(self) -> &'static str {
        match self {
            Opcode::Request(RequestOpcode::Startup) => "STARTUP",
            Opcode::Request(RequestOpcode::Options) => "OPTIONS",
            Opcode::Request(RequestOpcode::Query) => "QUERY",
            Opcode::Request(RequestOpcode::Prepare) => "PREPARE",
            Opcode::Request(RequestOpcode::Execute) => "EXECUTE",
            Opcode::Request(RequestOpcode::Register) => "REGISTER",
            Opcode::Request(RequestOpcode::Batch) => "BATCH",
            Opcode::Request(RequestOpcode::AuthResponse) => "AUTH_RESPONSE",
            Opcode::Request(RequestOpcode::DseRevise) => "DSE_REVISE",
            Opcode::Response(ResponseOpcode::Error) => "ERROR",
            Opcode::Response(ResponseOpcode::Ready) => "READY",
            Opcode::Response(ResponseOpcode::Authenticate) => "AUTHENTICATE",
            Opcode::Response(ResponseOpcode::Supported) => "SUPPORTED",
            Opcode::Response(ResponseOpcode::Result) => "RESULT",
            Opcode::Response(ResponseOpcode::Event) => "EVENT",
            Opcode::Response(ResponseOpcode::AuthChallenge) => "AUTH_CHALLENGE",
            Opcode::Response(ResponseOpcode::AuthSuccess) => "AUTH_SUCCESS",
        }
    }
}

/// Consistency level, a 2-byte wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Consistency {
    Any = 0x0000,
    #[default]
    One = 0x0001,
    Two = 0x0002,
    Three = 0x0003,
    Quorum = 0x0004,
    All = 0x0005,
    LocalQuorum = 0x0006,
    EachQuorum = 0x0007,
    Serial = 0x0008,
    LocalSerial = 0x0009,
    LocalOne = 0x000A,
}

impl Consistency {
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn check(raw: u16) -> Result<Self> {
        Ok(match raw {
            0x0000 => Consistency::Any,
            0x0001 => Consistency::One,
            0x0002 => Consistency::Two,
            0x0003 => Consistency::Three,
            0x0004 => Consistency::Quorum,
            0x0005 => Consistency::All,
            0x0006 => Consistency::LocalQuorum,
            0x0007 => Consistency::EachQuorum,
            0x0008 => Consistency::Serial,
            0x0009 => Consistency::LocalSerial,
            0x000A => Consistency::LocalOne,
            other => {
                return Err(ProtocolError::InvalidTag {
                    family: TagFamily::Consistency,
                    value: other as i64,
                });
            },
        })
    }
}

/// BATCH statement kind, a 1-byte wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BatchType {
    #[default]
    Logged = 0,
    Unlogged = 1,
    Counter = 2,
}

impl BatchType {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn check(raw: u8) -> Result<Self> {
        Ok(match raw {
            0 => BatchType::Logged,
            1 => BatchType::Unlogged,
            2 => BatchType::Counter,
            other => {
                return Err(ProtocolError::InvalidTag {
                    family: TagFamily::BatchType,
                    value: other as i64,
                });
            },
        })
    }
}

/// RESULT message `result_type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Void = 1,
    Rows = 2,
    SetKeyspace = 3,
    Prepared = 4,
    SchemaChange = 5,
}

impl ResultKind {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn check(raw: i32) -> Result<Self> {
        Ok(match raw {
            1 => ResultKind::Void,
            2 => ResultKind::Rows,
            3 => ResultKind::SetKeyspace,
            4 => ResultKind::Prepared,
            5 => ResultKind::SchemaChange,
            other => {
                return Err(ProtocolError::InvalidTag {
                    family: TagFamily::ResultKind,
                    value: other as i64,
                });
            },
        })
    }
}

macro_rules! string_tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $family:expr, { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            pub fn check(raw: &str) -> Result<Self> {
                match raw {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(ProtocolError::InvalidTag {
                        family: $family,
                        value: other.bytes().fold(0i64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as i64)),
                    }),
                }
            }
        }
    };
}

string_tag_enum!(
    /// `SchemaChange` / `SCHEMA_CHANGE` event `change_type`.
    SchemaChangeType, TagFamily::SchemaChangeType, {
        Created => "CREATED",
        Updated => "UPDATED",
        Dropped => "DROPPED",
    }
);

string_tag_enum!(
    /// `SchemaChange` / `SCHEMA_CHANGE` event `target`.
    SchemaChangeTarget, TagFamily::SchemaChangeTarget, {
        Keyspace => "KEYSPACE",
        Table => "TABLE",
        Type => "TYPE",
        Function => "FUNCTION",
        Aggregate => "AGGREGATE",
    }
);

string_tag_enum!(
    /// `REGISTER` / `EVENT` top-level `event_type`.
    EventType, TagFamily::EventType, {
        SchemaChange => "SCHEMA_CHANGE",
        StatusChange => "STATUS_CHANGE",
        TopologyChange => "TOPOLOGY_CHANGE",
    }
);

string_tag_enum!(
    /// `STATUS_CHANGE` event `change_type`.
    StatusChangeType, TagFamily::StatusChangeType, {
        Up => "UP",
        Down => "DOWN",
    }
);

string_tag_enum!(
    /// `TOPOLOGY_CHANGE` event `change_type`.
    TopologyChangeType, TagFamily::TopologyChangeType, {
        NewNode => "NEW_NODE",
        RemovedNode => "REMOVED_NODE",
    }
);

/// DSE REVISE request `revision_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DseRevisionType {
    CancelContinuousPaging = 1,
    MoreContinuousPages = 2,
}

impl DseRevisionType {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn check(raw: i32) -> Result<Self> {
        Ok(match raw {
            1 => DseRevisionType::CancelContinuousPaging,
            2 => DseRevisionType::MoreContinuousPages,
            other => {
                return Err(ProtocolError::InvalidTag {
                    family: TagFamily::DseRevisionType,
                    value: other as i64,
                });
            },
        })
    }
}

/// ERROR response `error_code`, a 4-byte tag gating which additional fields
/// follow the `(code, message)` pair (`spec.md` §4.F component F, ERROR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ServerError = 0x0000,
    ProtocolError = 0x000A,
    AuthenticationError = 0x0100,
    Unavailable = 0x1000,
    Overloaded = 0x1001,
    IsBootstrapping = 0x1002,
    TruncateError = 0x1003,
    WriteTimeout = 0x1100,
    ReadTimeout = 0x1200,
    ReadFailure = 0x1300,
    FunctionFailure = 0x1400,
    WriteFailure = 0x1500,
    SyntaxError = 0x2000,
    Unauthorized = 0x2100,
    Invalid = 0x2200,
    ConfigError = 0x2300,
    AlreadyExists = 0x2400,
    Unprepared = 0x2500,
}

impl ErrorCode {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn check(raw: i32) -> Result<Self> {
        Ok(match raw {
            0x0000 => ErrorCode::ServerError,
            0x000A => ErrorCode::ProtocolError,
            0x0100 => ErrorCode::AuthenticationError,
            0x1000 => ErrorCode::Unavailable,
            0x1001 => ErrorCode::Overloaded,
            0x1002 => ErrorCode::IsBootstrapping,
            0x1003 => ErrorCode::TruncateError,
            0x1100 => ErrorCode::WriteTimeout,
            0x1200 => ErrorCode::ReadTimeout,
            0x1300 => ErrorCode::ReadFailure,
            0x1400 => ErrorCode::FunctionFailure,
            0x1500 => ErrorCode::WriteFailure,
            0x2000 => ErrorCode::SyntaxError,
            0x2100 => ErrorCode::Unauthorized,
            0x2200 => ErrorCode::Invalid,
            0x2300 => ErrorCode::ConfigError,
            0x2400 => ErrorCode::AlreadyExists,
            0x2500 => ErrorCode::Unprepared,
            other => {
                return Err(ProtocolError::InvalidTag {
                    family: TagFamily::ErrorCode,
                    value: other as i64,
                });
            },
        })
    }
}

bitflags::bitflags! {
    /// QUERY/EXECUTE options flags. Width on the wire is 1 or 4 bytes per
    /// [`ProtocolVersion::flags_width`]; the DSE-only bits (`PAGE_SIZE_BYTES`,
    /// `WITH_CONTINUOUS_PAGING`) only ever get set when the 4-byte width is
    /// in effect.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct QueryFlags: u32 {
        const VALUES              = 0x0000_0001;
        const SKIP_METADATA        = 0x0000_0002;
        const PAGE_SIZE            = 0x0000_0004;
        const PAGING_STATE         = 0x0000_0008;
        const SERIAL_CONSISTENCY   = 0x0000_0010;
        const DEFAULT_TIMESTAMP    = 0x0000_0020;
        const VALUE_NAMES          = 0x0000_0040;
        const WITH_KEYSPACE        = 0x0000_0080;
        const NOW_IN_SECONDS       = 0x0000_0100;
        const PAGE_SIZE_BYTES      = 0x4000_0000;
        const WITH_CONTINUOUS_PAGING = 0x8000_0000;
    }
}

bitflags::bitflags! {
    /// PREPARE request flags (V5+/DseV2 only; see `has_prepare_flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PrepareFlags: u32 {
        const WITH_KEYSPACE = 0x01;
    }
}

bitflags::bitflags! {
    /// RESULT/RowsMetadata flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RowsFlags: u32 {
        const GLOBAL_TABLES_SPEC  = 0x0000_0001;
        const HAS_MORE_PAGES      = 0x0000_0002;
        const NO_METADATA         = 0x0000_0004;
        const METADATA_CHANGED    = 0x0000_0008;
        const CONTINUOUS_PAGING   = 0x4000_0000;
        const LAST_CONTINUOUS_PAGE = 0x8000_0000;
    }
}

/// `PREPARE` carries a keyspace flag/field only on V5 and DseV2, not DseV1
/// (`spec.md` §4.F.2).
pub const fn has_prepare_flags(v: ProtocolVersion) -> bool {
    v.at_least(ProtocolVersion::V5) || matches!(v, ProtocolVersion::DseV2)
}

/// `EXECUTE` carries a `result_metadata_id` only on V5+ or DseV2
/// (`spec.md` §4.F.4).
pub const fn has_result_metadata_id(v: ProtocolVersion) -> bool {
    v.at_least(ProtocolVersion::V5) || matches!(v, ProtocolVersion::DseV2)
}

/// `QueryOptions`/`RowsMetadata` may carry `WITH_KEYSPACE` only on V5+ or
/// DseV2 (`spec.md` §3).
pub const fn has_keyspace_option(v: ProtocolVersion) -> bool {
    v.at_least(ProtocolVersion::V5) || matches!(v, ProtocolVersion::DseV2)
}

/// `now_in_seconds` is V5+ *non-DSE* only, enforced uniformly across QUERY,
/// EXECUTE and BATCH per the Open Question resolution in `spec.md` §9 /
/// DESIGN.md.
pub const fn has_now_in_seconds(v: ProtocolVersion) -> bool {
    v.at_least(ProtocolVersion::V5) && !v.is_dse()
}

/// `RowsMetadata.new_result_metadata_id` / `RowsFlags::METADATA_CHANGED`
/// gate (V5+, non-DSE per the protocol; DSE uses its own result-metadata-id
/// plumbing via `has_result_metadata_id`, independent of `METADATA_CHANGED`).
pub const fn has_metadata_changed(v: ProtocolVersion) -> bool {
    v.at_least(ProtocolVersion::V5)
}

/// PREPARED result's `variables` metadata carries `pk_indices` on V4+ or any
/// DSE version (`spec.md` §4.F.7).
pub const fn has_prepare_pk_indices(v: ProtocolVersion) -> bool {
    v.at_least(ProtocolVersion::V4) || v.is_dse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_round_trip() {
        for op in [
            RequestOpcode::Startup,
            RequestOpcode::Query,
            RequestOpcode::Batch,
            RequestOpcode::DseRevise,
        ] {
            let raw = op.as_u8();
            assert_eq!(Opcode::check(raw, false).unwrap(), Opcode::Request(op));
        }
        for op in [
            ResponseOpcode::Error,
            ResponseOpcode::Result,
            ResponseOpcode::AuthSuccess,
        ] {
            let raw = op.as_u8();
            assert_eq!(Opcode::check(raw, true).unwrap(), Opcode::Response(op));
        }
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        assert!(matches!(
            Opcode::check(0x99, false),
            Err(ProtocolError::UnknownOpcode(0x99))
        ));
    }

    #[test]
    fn dse_versions_are_not_ordered_against_v5() {
        assert!(!ProtocolVersion::DseV1.at_least(ProtocolVersion::V5));
        assert!(!ProtocolVersion::V5.at_least(ProtocolVersion::DseV1));
        assert!(ProtocolVersion::DseV1.is_dse());
    }

    #[test]
    fn flags_width_matches_version() {
        assert_eq!(ProtocolVersion::V3.flags_width(), 1);
        assert_eq!(ProtocolVersion::V4.flags_width(), 1);
        assert_eq!(ProtocolVersion::V5.flags_width(), 4);
        assert_eq!(ProtocolVersion::DseV1.flags_width(), 4);
        assert_eq!(ProtocolVersion::DseV2.flags_width(), 4);
    }

    #[test]
    fn now_in_seconds_gate_excludes_dse() {
        assert!(has_now_in_seconds(ProtocolVersion::V5));
        assert!(!has_now_in_seconds(ProtocolVersion::DseV1));
        assert!(!has_now_in_seconds(ProtocolVersion::DseV2));
        assert!(!has_now_in_seconds(ProtocolVersion::V4));
    }

    #[test]
    fn error_code_round_trip() {
        assert_eq!(ErrorCode::check(0x1000).unwrap(), ErrorCode::Unavailable);
        assert!(ErrorCode::check(0x9999).is_err());
    }

    #[test]
    fn consistency_check_rejects_unknown() {
        assert!(Consistency::check(0x00FF).is_err());
        assert_eq!(Consistency::check(0x0006).unwrap(), Consistency::LocalQuorum);
    }
}
