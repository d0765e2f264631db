//! At-rest encryption for stored GitHub bearer tokens.
//!
//! Tokens are sealed to an age X25519 recipient derived from the configured
//! identity and stored as ASCII-armoured envelopes in `profiles`.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use age::armor::{ArmoredReader, ArmoredWriter, Format};
use age::x25519;

use super::PersistenceError;

/// Seals and opens stored access tokens.
pub struct TokenCipher {
    identity: x25519::Identity,
    recipient: x25519::Recipient,
}

impl TokenCipher {
    /// Builds a cipher from an `AGE-SECRET-KEY-1...` identity string.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::InvalidTokenKey`] when the key does not
    /// parse as an X25519 identity.
    pub fn from_key(key: &str) -> Result<Self, PersistenceError> {
        let identity = x25519::Identity::from_str(key.trim()).map_err(|error| {
            PersistenceError::InvalidTokenKey {
                message: error.to_owned(),
            }
        })?;
        let recipient = identity.to_public();
        Ok(Self {
            identity,
            recipient,
        })
    }

    /// Builds a cipher around a freshly generated identity.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn generate() -> Self {
        let identity = x25519::Identity::generate();
        let recipient = identity.to_public();
        Self {
            identity,
            recipient,
        }
    }

    /// Encrypts a token into an armoured envelope.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::TokenCipher`] if age fails to encrypt.
    pub fn seal(&self, token: &str) -> Result<String, PersistenceError> {
        let encryptor =
            age::Encryptor::with_recipients(std::iter::once(&self.recipient as &dyn age::Recipient))
                .map_err(cipher_error)?;

        let mut sealed = Vec::new();
        {
            let armor_writer =
                ArmoredWriter::wrap_output(&mut sealed, Format::AsciiArmor).map_err(cipher_error)?;
            let mut writer = encryptor.wrap_output(armor_writer).map_err(cipher_error)?;
            writer.write_all(token.as_bytes()).map_err(cipher_error)?;
            writer
                .finish()
                .and_then(ArmoredWriter::finish)
                .map_err(cipher_error)?;
        }

        String::from_utf8(sealed).map_err(cipher_error)
    }

    /// Decrypts an envelope produced by [`Self::seal`].
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::TokenCipher`] if the envelope is malformed
    /// or was sealed to a different key.
    pub fn open(&self, sealed: &str) -> Result<String, PersistenceError> {
        let decryptor =
            age::Decryptor::new(ArmoredReader::new(sealed.as_bytes())).map_err(cipher_error)?;
        let mut reader = decryptor
            .decrypt(std::iter::once(&self.identity as &dyn age::Identity))
            .map_err(cipher_error)?;

        let mut token = String::new();
        reader.read_to_string(&mut token).map_err(cipher_error)?;
        Ok(token)
    }
}

impl fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCipher")
            .field("recipient", &self.recipient.to_string())
            .finish_non_exhaustive()
    }
}

fn cipher_error(error: impl fmt::Display) -> PersistenceError {
    PersistenceError::TokenCipher {
        message: error.to_string(),
    }
}
