//! Sealing of deploy credentials under a project's RSA public key.
//!
//! The sealed value ends up in the committed CI manifest and is decrypted
//! only inside the CI host's build sandbox, where it provides the push
//! credential and git identity for deploying built output.


use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use thiserror::Error;

/// Errors raised while sealing a configuration value.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SealError {
    /// Raised when the project public key PEM cannot be parsed.
    #[error("invalid project public key: {message}")]
    InvalidKey {
        /// Message reported by the key parser.
        message: String,
    },
    /// Raised when encryption fails, typically because the plaintext exceeds
    /// the key's modulus capacity.
    #[error("sealing failed: {message}")]
    Encrypt {
        /// Message reported by the encryption primitive.
        message: String,
    },
}

/// Environment entries embedded in the sealed configuration line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeployEnv {
    /// Push credential the CI build uses against the source host. Always the
    /// exact caller-supplied token, never a placeholder.
    pub source_token: String,
    /// Git author name for deploy commits made inside the build.
    pub git_name: String,
    /// Git author email for deploy commits made inside the build.
    pub git_email: String,
}

impl DeployEnv {
    /// Renders the single-line space-separated `KEY=value` plaintext.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "GITHUB_TOKEN={} GIT_NAME={} GIT_EMAIL={}",
            self.source_token, self.git_name, self.git_email
        )
    }
}

/// Encrypts `plaintext` under the given public key and encodes it for the
/// manifest's secure field.
///
/// RSA PKCS#1 v1.5 padding, base64 output with every whitespace character
/// stripped; the manifest format forbids embedded newlines in secure values.
///
/// # Errors
///
/// Returns [`SealError::InvalidKey`] for an unparseable PEM and
/// [`SealError::Encrypt`] when the encryption primitive rejects the input.
pub fn seal(public_key_pem: &str, plaintext: &str) -> Result<String, SealError> {
    let key = RsaPublicKey::from_public_key_pem(public_key_pem).map_err(|err| {
        SealError::InvalidKey {
            message: err.to_string(),
        }
    })?;
    let mut rng = rand::thread_rng();
    let ciphertext = key
        .encrypt(&mut rng, Pkcs1v15Encrypt, plaintext.as_bytes())
        .map_err(|err| SealError::Encrypt {
            message: err.to_string(),
        })?;
    let encoded = BASE64.encode(ciphertext);
    Ok(encoded.split_whitespace().collect())
}
