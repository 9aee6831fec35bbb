// SPDX-License-Identifier: AGPL-3.0-or-later

//! ERROR response body: `int error_code`, `string message`, then a payload
//! that depends on `error_code` (`spec.md` §4.F names ERROR as one of the
//! per-opcode codecs but the distilled spec does not spell out the
//! additional-info shapes; this module follows the public CQL binary
//! protocol v4 error-code table, mirroring the shapes already specified
//! elsewhere in `spec.md` for `AlreadyExists`/`Unprepared`).

use bytes::{Buf, BufMut};

use crate::{
    catalog::{Consistency, ErrorCode, ProtocolVersion},
    error::Result,
    primitive::{
        read_byte, read_int, read_short_bytes, read_string, read_string_list, string_len,
        string_list_len, write_byte, write_int, write_short_bytes, write_string, write_string_list,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdditionalInfo {
    None,
    Unavailable {
        consistency: Consistency,
        required: i32,
        alive: i32,
    },
    WriteTimeout {
        consistency: Consistency,
        received: i32,
        block_for: i32,
        write_type: String,
    },
    ReadTimeout {
        consistency: Consistency,
        received: i32,
        block_for: i32,
        data_present: bool,
    },
    ReadFailure {
        consistency: Consistency,
        received: i32,
        block_for: i32,
        num_failures: i32,
        data_present: bool,
    },
    WriteFailure {
        consistency: Consistency,
        received: i32,
        block_for: i32,
        num_failures: i32,
        write_type: String,
    },
    FunctionFailure {
        keyspace: String,
        function: String,
        arg_types: Vec<String>,
    },
    AlreadyExists {
        keyspace: String,
        table: String,
    },
    Unprepared {
        unknown_id: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub message: String,
    pub additional_info: AdditionalInfo,
}

impl ErrorMessage {
    pub fn encode(&self, sink: &mut impl BufMut, _version: ProtocolVersion) -> Result<()> {
        write_int(sink, self.code.as_i32());
        write_string(sink, &self.message);
        match &self.additional_info {
            AdditionalInfo::None => {},
            AdditionalInfo::Unavailable { consistency, required, alive } => {
                crate::primitive::write_short(sink, consistency.as_u16());
                write_int(sink, *required);
                write_int(sink, *alive);
            },
            AdditionalInfo::WriteTimeout { consistency, received, block_for, write_type } => {
                crate::primitive::write_short(sink, consistency.as_u16());
                write_int(sink, *received);
                write_int(sink, *block_for);
                write_string(sink, write_type);
            },
            AdditionalInfo::ReadTimeout { consistency, received, block_for, data_present } => {
                crate::primitive::write_short(sink, consistency.as_u16());
                write_int(sink, *received);
                write_int(sink, *block_for);
                write_byte(sink, *data_present as u8);
            },
            AdditionalInfo::ReadFailure { consistency, received, block_for, num_failures, data_present } => {
                crate::primitive::write_short(sink, consistency.as_u16());
                write_int(sink, *received);
                write_int(sink, *block_for);
                write_int(sink, *num_failures);
                write_byte(sink, *data_present as u8);
            },
            AdditionalInfo::WriteFailure { consistency, received, block_for, num_failures, write_type } => {
                crate::primitive::write_short(sink, consistency.as_u16());
                write_int(sink, *received);
                write_int(sink, *block_for);
                write_int(sink, *num_failures);
                write_string(sink, write_type);
            },
            AdditionalInfo::FunctionFailure { keyspace, function, arg_types } => {
                write_string(sink, keyspace);
                write_string(sink, function);
                write_string_list(sink, arg_types);
            },
            AdditionalInfo::AlreadyExists { keyspace, table } => {
                write_string(sink, keyspace);
                write_string(sink, table);
            },
            AdditionalInfo::Unprepared { unknown_id } => {
                write_short_bytes(sink, unknown_id);
            },
        }
        Ok(())
    }

    pub fn encoded_len(&self, _version: ProtocolVersion) -> Result<usize> {
        let mut total = 4 + string_len(&self.message);
        total += match &self.additional_info {
            AdditionalInfo::None => 0,
            AdditionalInfo::Unavailable { .. } => 2 + 4 + 4,
            AdditionalInfo::WriteTimeout { write_type, .. } => 2 + 4 + 4 + string_len(write_type),
            AdditionalInfo::ReadTimeout { .. } => 2 + 4 + 4 + 1,
            AdditionalInfo::ReadFailure { .. } => 2 + 4 + 4 + 4 + 1,
            AdditionalInfo::WriteFailure { write_type, .. } => 2 + 4 + 4 + 4 + string_len(write_type),
            AdditionalInfo::FunctionFailure { keyspace, function, arg_types } => {
                string_len(keyspace) + string_len(function) + string_list_len(arg_types)
            },
            AdditionalInfo::AlreadyExists { keyspace, table } => string_len(keyspace) + string_len(table),
            AdditionalInfo::Unprepared { unknown_id } => 2 + unknown_id.len(),
        };
        Ok(total)
    }

    pub fn decode(src: &mut impl Buf, _version: ProtocolVersion) -> Result<Self> {
        let code = ErrorCode::check(read_int(src)?)?;
        let message = read_string(src)?;
        let additional_info = match code {
            ErrorCode::Unavailable => AdditionalInfo::Unavailable {
                consistency: Consistency::check(crate::primitive::read_short(src)?)?,
                required: read_int(src)?,
                alive: read_int(src)?,
            },
            ErrorCode::WriteTimeout => AdditionalInfo::WriteTimeout {
                consistency: Consistency::check(crate::primitive::read_short(src)?)?,
                received: read_int(src)?,
                block_for: read_int(src)?,
                write_type: read_string(src)?,
            },
            ErrorCode::ReadTimeout => AdditionalInfo::ReadTimeout {
                consistency: Consistency::check(crate::primitive::read_short(src)?)?,
                received: read_int(src)?,
                block_for: read_int(src)?,
                data_present: read_byte(src)? != 0,
            },
            ErrorCode::ReadFailure => AdditionalInfo::ReadFailure {
                consistency: Consistency::check(crate::primitive::read_short(src)?)?,
                received: read_int(src)?,
                block_for: read_int(src)?,
                num_failures: read_int(src)?,
                data_present: read_byte(src)? != 0,
            },
            ErrorCode::WriteFailure => AdditionalInfo::WriteFailure {
                consistency: Consistency::check(crate::primitive::read_short(src)?)?,
                received: read_int(src)?,
                block_for: read_int(src)?,
                num_failures: read_int(src)?,
                write_type: read_string(src)?,
            },
            ErrorCode::FunctionFailure => AdditionalInfo::FunctionFailure {
                keyspace: read_string(src)?,
                function: read_string(src)?,
                arg_types: read_string_list(src)?,
            },
            ErrorCode::AlreadyExists => AdditionalInfo::AlreadyExists {
                keyspace: read_string(src)?,
                table: read_string(src)?,
            },
            ErrorCode::Unprepared => AdditionalInfo::Unprepared {
                unknown_id: read_short_bytes(src)?,
            },
            _ => AdditionalInfo::None,
        };
        Ok(ErrorMessage { code, message, additional_info })
    }
}
