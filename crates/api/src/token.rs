//! The opaque article locator.

use crate::{NsError, NsResult};

/// Byte length of a [Token].
pub const TOKEN_LEN: usize = 34;

/// Byte length of the method-private payload of a [Token].
pub const TOKEN_PAYLOAD_LEN: usize = TOKEN_LEN - 2;

/// A 34-byte opaque article locator.
///
/// Byte 0 is the storage-class tag, byte 1 is reserved-zero, bytes 2..34
/// are private to the storage method that minted the token. A token
/// identifies an article within exactly one storage class.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token([u8; TOKEN_LEN]);

impl Default for Token {
    fn default() -> Self {
        Self([0; TOKEN_LEN])
    }
}

impl Token {
    /// Construct an all-zero token.
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// The storage-class tag of this token.
    pub fn class(&self) -> u8 {
        self.0[0]
    }

    /// Stamp the storage-class tag on this token.
    pub fn set_class(&mut self, class: u8) {
        self.0[0] = class;
    }

    /// The method-private payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.0[2..]
    }

    /// Mutable access to the method-private payload bytes.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.0[2..]
    }

    /// The full 34-byte wire form.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Reconstruct a token from its wire form.
    ///
    /// Anything other than exactly 34 bytes is a [NsError::TokenMismatch].
    pub fn from_bytes(b: &[u8]) -> NsResult<Self> {
        if b.len() != TOKEN_LEN {
            return Err(NsError::TokenMismatch);
        }
        let mut out = [0; TOKEN_LEN];
        out.copy_from_slice(b);
        Ok(Self(out))
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Trailing zero payload bytes are compressed to keep logs readable.
        let mut end = self.0.len();
        while end > 2 && self.0[end - 1] == 0 {
            end -= 1;
        }
        write!(f, "({})-({})-", self.0[0], self.0[1])?;
        for b in &self.0[2..end] {
            write!(f, "{b:02x}")?;
        }
        if end < self.0.len() {
            f.write_str("::")?;
        }
        Ok(())
    }
}
