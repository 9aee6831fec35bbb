// SPDX-License-Identifier: AGPL-3.0-or-later

//! SUPPORTED response body: a `string multimap` (`spec.md` §4.F.1).
//! Confirmed against the `luma-cassandra` `SupportedBody::write` reference
//! fragment, since the distilled spec names the shape but not the field name.

use bytes::{Buf, BufMut};

use crate::{
    error::Result,
    primitive::{read_string_multimap, string_multimap_len, write_string_multimap},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Supported {
    pub options: Vec<(String, Vec<String>)>,
}

impl Supported {
    pub fn encode(&self, sink: &mut impl BufMut) -> Result<()> {
        write_string_multimap(sink, &self.options);
        Ok(())
    }

    pub fn encoded_len(&self) -> Result<usize> {
        Ok(string_multimap_len(&self.options))
    }

    pub fn decode(src: &mut impl Buf) -> Result<Self> {
        Ok(Supported {
            options: read_string_multimap(src)?,
        })
    }
}
