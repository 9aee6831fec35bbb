// SPDX-License-Identifier: AGPL-3.0-or-later

//! Primitive Codec (component B): typed read/write/length for the wire
//! primitives defined in `spec.md` §6 (`byte`, `short`, `int`, `long`,
//! `string`, `long string`, `bytes`, `short bytes`, `value`, `string list`,
//! `string map`, `string multimap`, `inet`).
//!
//! This is named an external collaborator in the distilled spec, but no
//! existing crate in the dependency corpus implements exactly this byte
//! grammar, so it is implemented here (see SPEC_FULL.md §6). Reads operate
//! against any [`bytes::Buf`] and never panic on short input — every
//! accessor checks `remaining()` first and returns
//! [`ProtocolError::Eof`] instead of trusting `bytes::Buf`'s own
//! (panicking) short-read behaviour. Writes operate against any
//! [`bytes::BufMut`], so callers may target a `BytesMut`, a `Vec<u8>`, or
//! any other growable sink.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{Buf, BufMut};
use tracing::warn;

use crate::error::{ProtocolError, Result};

fn need(buf: &impl Buf, n: usize) -> Result<()> {
    if buf.remaining() < n {
        return Err(ProtocolError::Eof {
            needed: n,
            available: buf.remaining(),
        });
    }
    Ok(())
}

pub fn write_byte(sink: &mut impl BufMut, v: u8) {
    sink.put_u8(v);
}

pub fn read_byte(src: &mut impl Buf) -> Result<u8> {
    need(src, 1)?;
    Ok(src.get_u8())
}

pub fn write_short(sink: &mut impl BufMut, v: u16) {
    sink.put_u16(v);
}

pub fn read_short(src: &mut impl Buf) -> Result<u16> {
    need(src, 2)?;
    Ok(src.get_u16())
}

pub fn write_int(sink: &mut impl BufMut, v: i32) {
    sink.put_i32(v);
}

pub fn read_int(src: &mut impl Buf) -> Result<i32> {
    need(src, 4)?;
    Ok(src.get_i32())
}

pub fn write_long(sink: &mut impl BufMut, v: i64) {
    sink.put_i64(v);
}

pub fn read_long(src: &mut impl Buf) -> Result<i64> {
    need(src, 8)?;
    Ok(src.get_i64())
}

pub fn write_string(sink: &mut impl BufMut, s: &str) {
    write_short(sink, s.len() as u16);
    sink.put_slice(s.as_bytes());
}

pub fn string_len(s: &str) -> usize {
    2 + s.len()
}

pub fn read_string(src: &mut impl Buf) -> Result<String> {
    let n = read_short(src)? as usize;
    need(src, n)?;
    let mut buf = vec![0u8; n];
    src.copy_to_slice(&mut buf);
    Ok(String::from_utf8(buf).map_err(|e| e.utf8_error())?)
}

pub fn write_long_string(sink: &mut impl BufMut, s: &str) {
    write_int(sink, s.len() as i32);
    sink.put_slice(s.as_bytes());
}

pub fn long_string_len(s: &str) -> usize {
    4 + s.len()
}

pub fn read_long_string(src: &mut impl Buf) -> Result<String> {
    let n = read_int(src)?;
    if n < 0 {
        return Err(ProtocolError::NegativeLength(n as i64));
    }
    let n = n as usize;
    need(src, n)?;
    let mut buf = vec![0u8; n];
    src.copy_to_slice(&mut buf);
    Ok(String::from_utf8(buf).map_err(|e| e.utf8_error())?)
}

/// `bytes`: `int` length N; N ≥ 0 is a regular payload, N = -1 is NULL.
pub fn write_bytes(sink: &mut impl BufMut, v: Option<&[u8]>) {
    match v {
        Some(b) => {
            write_int(sink, b.len() as i32);
            sink.put_slice(b);
        },
        None => write_int(sink, -1),
    }
}

pub fn bytes_len(v: Option<&[u8]>) -> usize {
    4 + v.map(<[u8]>::len).unwrap_or(0)
}

pub fn read_bytes(src: &mut impl Buf) -> Result<Option<Vec<u8>>> {
    let n = read_int(src)?;
    if n < 0 {
        return Ok(None);
    }
    let n = n as usize;
    need(src, n)?;
    let mut buf = vec![0u8; n];
    src.copy_to_slice(&mut buf);
    Ok(Some(buf))
}

pub fn write_short_bytes(sink: &mut impl BufMut, b: &[u8]) {
    write_short(sink, b.len() as u16);
    sink.put_slice(b);
}

pub fn short_bytes_len(b: &[u8]) -> usize {
    2 + b.len()
}

pub fn read_short_bytes(src: &mut impl Buf) -> Result<Vec<u8>> {
    let n = read_short(src)? as usize;
    need(src, n)?;
    let mut buf = vec![0u8; n];
    src.copy_to_slice(&mut buf);
    Ok(buf)
}

pub fn write_string_list(sink: &mut impl BufMut, items: &[String]) {
    write_short(sink, items.len() as u16);
    for s in items {
        write_string(sink, s);
    }
}

pub fn string_list_len(items: &[String]) -> usize {
    2 + items.iter().map(|s| string_len(s)).sum::<usize>()
}

pub fn read_string_list(src: &mut impl Buf) -> Result<Vec<String>> {
    let n = read_short(src)? as usize;
    (0..n).map(|_| read_string(src)).collect()
}

pub fn write_string_map(sink: &mut impl BufMut, map: &[(String, String)]) {
    write_short(sink, map.len() as u16);
    for (k, v) in map {
        write_string(sink, k);
        write_string(sink, v);
    }
}

pub fn string_map_len(map: &[(String, String)]) -> usize {
    2 + map
        .iter()
        .map(|(k, v)| string_len(k) + string_len(v))
        .sum::<usize>()
}

pub fn read_string_map(src: &mut impl Buf) -> Result<Vec<(String, String)>> {
    let n = read_short(src)? as usize;
    (0..n)
        .map(|_| Ok((read_string(src)?, read_string(src)?)))
        .collect()
}

pub fn write_string_multimap(sink: &mut impl BufMut, map: &[(String, Vec<String>)]) {
    write_short(sink, map.len() as u16);
    for (k, v) in map {
        write_string(sink, k);
        write_string_list(sink, v);
    }
}

pub fn string_multimap_len(map: &[(String, Vec<String>)]) -> usize {
    2 + map
        .iter()
        .map(|(k, v)| string_len(k) + string_list_len(v))
        .sum::<usize>()
}

pub fn read_string_multimap(src: &mut impl Buf) -> Result<Vec<(String, Vec<String>)>> {
    let n = read_short(src)? as usize;
    (0..n)
        .map(|_| Ok((read_string(src)?, read_string_list(src)?)))
        .collect()
}

/// `inet`: 1-byte address length (4 or 16), address bytes, 4-byte port.
pub fn write_inet(sink: &mut impl BufMut, addr: IpAddr, port: i32) {
    match addr {
        IpAddr::V4(v4) => {
            write_byte(sink, 4);
            sink.put_slice(&v4.octets());
        },
        IpAddr::V6(v6) => {
            write_byte(sink, 16);
            sink.put_slice(&v6.octets());
        },
    }
    write_int(sink, port);
}

pub fn inet_len(addr: IpAddr) -> usize {
    1 + match addr {
        IpAddr::V4(_) => 4,
        IpAddr::V6(_) => 16,
    } + 4
}

pub fn read_inet(src: &mut impl Buf) -> Result<(IpAddr, i32)> {
    let len = read_byte(src)?;
    let addr = match len {
        4 => {
            need(src, 4)?;
            let mut b = [0u8; 4];
            src.copy_to_slice(&mut b);
            IpAddr::V4(Ipv4Addr::from(b))
        },
        16 => {
            need(src, 16)?;
            let mut b = [0u8; 16];
            src.copy_to_slice(&mut b);
            IpAddr::V6(Ipv6Addr::from(b))
        },
        other => {
            warn!(length = other, "rejecting inet with invalid address length");
            return Err(ProtocolError::InvalidTag {
                family: crate::error::TagFamily::InetAddressLength,
                value: other as i64,
            });
        },
    };
    let port = read_int(src)?;
    Ok((addr, port))
}

/// `value`: `int` length N; N ≥ 0 regular, N = -1 NULL, N = -2 UNSET
/// (V4+ only, rejected below that version by [`crate::value::Value`]'s
/// codec, not here — this module only knows wire shape, not version gates).
pub fn write_value_len_tag(sink: &mut impl BufMut, tag: i32) {
    write_int(sink, tag);
}
