// SPDX-License-Identifier: AGPL-3.0-or-later

//! STARTUP request body: a `string map` (`spec.md` §4.F.1).

use bytes::{Buf, BufMut};

use crate::{
    error::Result,
    primitive::{read_string_map, string_map_len, write_string_map},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Startup {
    pub options: Vec<(String, String)>,
}

impl Default for Startup {
    fn default() -> Self {
        Startup {
            options: vec![("CQL_VERSION".to_string(), "3.0.0".to_string())],
        }
    }
}

impl Startup {
    pub fn encode(&self, sink: &mut impl BufMut) -> Result<()> {
        write_string_map(sink, &self.options);
        Ok(())
    }

    pub fn encoded_len(&self) -> Result<usize> {
        Ok(string_map_len(&self.options))
    }

    pub fn decode(src: &mut impl Buf) -> Result<Self> {
        Ok(Startup {
            options: read_string_map(src)?,
        })
    }
}

/// Consuming builder mirroring the teacher's `LoginRequestBuilder`
/// (`src/models/login/request.rs`).
#[derive(Debug, Default)]
pub struct StartupBuilder {
    inner: Startup,
}

impl StartupBuilder {
    pub fn new() -> Self {
        StartupBuilder {
            inner: Startup::default(),
        }
    }

    pub fn compression(mut self, algorithm: impl Into<String>) -> Self {
        self.inner.options.push(("COMPRESSION".to_string(), algorithm.into()));
        self
    }

    pub fn build(self) -> Startup {
        self.inner
    }
}
