//! Short random identifiers used both as paste addresses and as owner tokens.
//!
//! An identifier is 8 bytes drawn from the operating system's CSPRNG and
//! rendered as unpadded URL-safe base64 (11 characters).

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Number of random bytes in an identifier.
pub const ID_LEN: usize = 8;

/// Raised when text or bytes cannot be interpreted as an [`Identifier`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier is not valid url-safe base64")]
    Encoding,
    #[error("identifier must be 8 bytes, got {0}")]
    Length(usize),
}

/// A fixed-length random byte string with a URL-safe text form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier([u8; ID_LEN]);

impl Identifier {
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&URL_SAFE_NO_PAD.encode(self.0))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({self})")
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|_| IdentifierError::Encoding)?;
        Self::try_from(bytes)
    }
}

impl TryFrom<Vec<u8>> for Identifier {
    type Error = IdentifierError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let len = bytes.len();
        <[u8; ID_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| IdentifierError::Length(len))
    }
}

/// Opaque correlation value grouping the pastes one client submitted.
///
/// This is **not** a credential: whoever presents the value is treated as
/// its owner. Tokens are only ever compared for equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct OwnerToken(Identifier);

impl OwnerToken {
    pub const fn new(id: Identifier) -> Self {
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        self.0.as_bytes()
    }
}

impl fmt::Display for OwnerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OwnerToken {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl TryFrom<Vec<u8>> for OwnerToken {
    type Error = IdentifierError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Identifier::try_from(bytes).map(Self)
    }
}

/// Source of fresh identifiers.
///
/// No uniqueness check happens here; the store rejects duplicates on insert.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> Result<Identifier, rand::Error>;
}

/// Draws identifiers from the operating system's secure random source.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRngIdGenerator;

impl IdGenerator for OsRngIdGenerator {
    fn new_id(&self) -> Result<Identifier, rand::Error> {
        let mut bytes = [0u8; ID_LEN];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Identifier(bytes))
    }
}
