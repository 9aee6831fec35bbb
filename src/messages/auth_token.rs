// SPDX-License-Identifier: AGPL-3.0-or-later

//! AUTH_RESPONSE / AUTH_CHALLENGE / AUTH_SUCCESS: all three carry a single
//! `bytes` token and share identical wire shape and validation (`spec.md`
//! §4.F.1: "encode rejects nil token"). One codec, three newtype wrappers.

use bytes::{Buf, BufMut};

use crate::{
    error::{ProtocolError, Result},
    primitive::{bytes_len, read_bytes, write_bytes},
};

fn encode_token(sink: &mut impl BufMut, token: &[u8]) -> Result<()> {
    if token.is_empty() {
        return Err(ProtocolError::EmptyRequired("auth token"));
    }
    write_bytes(sink, Some(token));
    Ok(())
}

fn encoded_len_token(token: &[u8]) -> Result<usize> {
    if token.is_empty() {
        return Err(ProtocolError::EmptyRequired("auth token"));
    }
    Ok(bytes_len(Some(token)))
}

fn decode_token(src: &mut impl Buf) -> Result<Vec<u8>> {
    read_bytes(src)?.ok_or(ProtocolError::EmptyRequired("auth token"))
}

macro_rules! auth_token_message {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub token: Vec<u8>,
        }

        impl $name {
            pub fn encode(&self, sink: &mut impl BufMut) -> Result<()> {
                encode_token(sink, &self.token)
            }

            pub fn encoded_len(&self) -> Result<usize> {
                encoded_len_token(&self.token)
            }

            pub fn decode(src: &mut impl Buf) -> Result<Self> {
                Ok($name {
                    token: decode_token(src)?,
                })
            }
        }
    };
}

auth_token_message!(AuthResponse);
auth_token_message!(AuthChallenge);
auth_token_message!(AuthSuccess);
