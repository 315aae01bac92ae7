//! Opaque cursors and the codecs that produce them.
//!
//! A cursor is derived from the string form of a row's cursor-column value. The default codec
//! is standard, padded base64 (byte-compatible with a browser's `btoa`), but any injective,
//! invertible encoding works: callers pick one of the shipped codecs or implement
//! [`CursorCodec`] themselves.
use std::fmt;
use std::string::FromUtf8Error;

use base64::prelude::{Engine as _, BASE64_STANDARD, BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CursorError {
    #[error("Cursor is empty")]
    Empty,

    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("Cursor is not valid utf-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// Raised by caller-supplied codecs.
    #[error("{0}")]
    Custom(String),
}

/// An opaque pagination token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Cursor(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Cursor(value)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Cursor(value.to_owned())
    }
}

impl AsRef<str> for Cursor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Turns a cursor-column value into an opaque [`Cursor`] and back.
///
/// Implementations must round-trip: `decode(&encode(v)) == Ok(v)` for every value they accept.
pub trait CursorCodec: fmt::Debug + Send + Sync {
    fn encode(&self, value: &str) -> Cursor;

    fn decode(&self, cursor: &Cursor) -> Result<String, CursorError>;
}

/// Standard alphabet, padded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl CursorCodec for Base64Codec {
    fn encode(&self, value: &str) -> Cursor {
        Cursor(BASE64_STANDARD.encode(value.as_bytes()))
    }

    fn decode(&self, cursor: &Cursor) -> Result<String, CursorError> {
        if cursor.0.is_empty() {
            return Err(CursorError::Empty);
        }
        let bytes = BASE64_STANDARD.decode(cursor.as_str())?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// URL-safe alphabet without padding, for cursors that travel in query strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64UrlCodec;

impl CursorCodec for Base64UrlCodec {
    fn encode(&self, value: &str) -> Cursor {
        Cursor(BASE64_URL_SAFE_NO_PAD.encode(value.as_bytes()))
    }

    fn decode(&self, cursor: &Cursor) -> Result<String, CursorError> {
        if cursor.0.is_empty() {
            return Err(CursorError::Empty);
        }
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(cursor.as_str())?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// Passes the raw value through. The cursor is no longer opaque.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl CursorCodec for IdentityCodec {
    fn encode(&self, value: &str) -> Cursor {
        Cursor(value.to_owned())
    }

    fn decode(&self, cursor: &Cursor) -> Result<String, CursorError> {
        Ok(cursor.0.clone())
    }
}
