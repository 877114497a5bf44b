//! HMAC-SHA256 signing of opaque session identifiers.
//!
//! A signed token has the shape `base64(raw_id) + "|" + hex(hmac(base64(raw_id)))`.
//! Verification fails closed: any malformed token yields `None`, never a
//! partially decoded identifier, and the signature is checked before the
//! identifier is decoded so storage is never consulted with unauthenticated
//! input.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Separator between the encoded identifier and its signature.
pub const TOKEN_DELIMITER: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("session signing secret must not be empty")]
    EmptySecret,
}

/// Signs and verifies session tokens with a process-wide secret.
#[derive(Clone)]
pub struct SessionSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    /// Build a signer. An empty secret is refused.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SignatureError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(SignatureError::EmptySecret);
        }
        Ok(Self {
            secret: secret.to_vec(),
        })
    }

    /// Produce the signed token for `raw_id`.
    pub fn sign(&self, raw_id: &str) -> String {
        let encoded = STANDARD.encode(raw_id.as_bytes());
        let signature = hex::encode(self.mac(&encoded).finalize().into_bytes());
        format!("{encoded}{TOKEN_DELIMITER}{signature}")
    }

    /// Verify `token` and return the raw identifier it carries.
    pub fn verify(&self, token: &str) -> Option<String> {
        let (encoded, signature) = token.split_once(TOKEN_DELIMITER)?;
        let signature = hex::decode(signature)?;

        // verify_slice compares in constant time.
        self.mac(encoded).verify_slice(&signature).ok()?;

        let raw = STANDARD.decode(encoded).ok()?;
        String::from_utf8(raw).ok()
    }

    fn mac(&self, message: &str) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .expect("HMAC accepts any key length");
        mac.update(message.as_bytes());
        mac
    }
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a lowercase hex string. Uppercase digits are rejected so each
    /// signature has exactly one accepted spelling.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        s.as_bytes()
            .chunks(2)
            .map(|pair| Some(nibble(pair[0])? << 4 | nibble(pair[1])?))
            .collect()
    }

    fn nibble(c: u8) -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'a'..=b'f' => Some(c - b'a' + 10),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> SessionSigner {
        SessionSigner::new("test-secret-that-is-long-enough-for-hmac").expect("valid secret")
    }

    #[test]
    fn empty_secret_is_refused() {
        assert_eq!(
            SessionSigner::new("").unwrap_err(),
            SignatureError::EmptySecret
        );
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let signer = signer();
        for raw in [
            "3f1c9a8e-5b7d-4f2a-9c1e-0d8b7a6f5e4d",
            "",
            "a|b|c",
            "ünïcödé",
        ] {
            let token = signer.sign(raw);
            assert_eq!(signer.verify(&token).as_deref(), Some(raw));
        }
    }

    #[test]
    fn token_has_encoded_and_hex_signature_parts() {
        let token = signer().sign("abc");
        let (encoded, sig) = token.split_once('|').expect("delimiter present");
        assert_eq!(encoded, "YWJj");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn any_mutation_is_rejected() {
        let signer = signer();
        let token = signer.sign("3f1c9a8e-5b7d-4f2a-9c1e-0d8b7a6f5e4d");

        // Flip every byte position to a different character.
        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };
            let mutated = String::from_utf8(bytes).expect("ascii token");
            if mutated != token {
                assert_eq!(signer.verify(&mutated), None, "mutation at {i} accepted");
            }
        }

        // Appending anything breaks the signature.
        assert_eq!(signer.verify(&format!("{token}0")), None);
        assert_eq!(signer.verify(&format!("{token}|extra")), None);
    }

    #[test]
    fn malformed_tokens_fail_closed() {
        let signer = signer();
        for token in ["", "|", "no-delimiter", "YWJj|", "|deadbeef", "YWJj|zz"] {
            assert_eq!(signer.verify(token), None, "token {token:?} accepted");
        }
    }

    #[test]
    fn uppercase_signature_is_rejected() {
        let signer = signer();
        let token = signer.sign("abc");
        assert_eq!(signer.verify(&token.to_uppercase()), None);
    }

    #[test]
    fn different_secret_rejects_token() {
        let other = SessionSigner::new("another-secret").expect("valid secret");
        let token = signer().sign("abc");
        assert_eq!(other.verify(&token), None);
    }
}
