//! Broker request authentication
//!
//! Every push request must be signed by the trusted broker. The broker signs
//! the raw request body with Ed25519 and sends the key selector and signature
//! in headers; the matching public keys are distributed out-of-band and
//! loaded once at startup. Verification has a single failure outcome:
//! reject. An empty or missing key set rejects every request (fail closed).

use base64::engine::general_purpose::STANDARD as Base64;
use base64::Engine;
use ed25519_dalek::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Header naming the broker key that signed the request
pub const KEY_ID_HEADER: &str = "x-broker-key-id";
/// Header carrying the base64 Ed25519 signature over the raw request body
pub const SIGNATURE_HEADER: &str = "x-broker-signature";

/// Broker-issued public key set, as distributed by the broker's key endpoint.
///
/// The document is a JSON object of the form
/// `{"keys": [{"kid": "...", "key": "<base64 Ed25519 public key>"}]}`.
/// It is parsed once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BrokerKeySet {
    #[serde(default)]
    pub keys: Vec<BrokerKey>,
}

/// One public key entry in the broker key set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrokerKey {
    /// Key identifier, echoed by the broker in the key-id header
    pub kid: String,
    /// Base64-encoded 32-byte Ed25519 public key
    pub key: String,
}

impl BrokerKeySet {
    /// Parse a key set from its JSON document form.
    pub fn from_json(document: &str) -> Result<Self, AuthError> {
        serde_json::from_str(document).map_err(|e| AuthError::InvalidKeySet(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Authentication failures. All of them map to the same outward verdict:
/// the request is rejected.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("broker key set is empty")]
    EmptyKeySet,

    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("unknown broker key id: {0}")]
    UnknownKeyId(String),

    #[error("malformed key material for kid '{kid}': {reason}")]
    MalformedKey { kid: String, reason: String },

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("invalid key set document: {0}")]
    InvalidKeySet(String),
}

/// Verifier for inbound broker requests.
///
/// Key material is decoded eagerly when the verifier is built, so malformed
/// configuration fails at startup rather than on the first request.
pub struct BrokerAuth {
    keys: HashMap<String, VerifyingKey>,
}

impl BrokerAuth {
    pub fn new(key_set: &BrokerKeySet) -> Result<Self, AuthError> {
        let mut keys = HashMap::with_capacity(key_set.keys.len());
        for entry in &key_set.keys {
            keys.insert(entry.kid.clone(), decode_public_key(entry)?);
        }
        Ok(Self { keys })
    }

    /// Build a verifier directly from the JSON key set document.
    pub fn from_json(document: &str) -> Result<Self, AuthError> {
        Self::new(&BrokerKeySet::from_json(document)?)
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Verdict for an inbound request: was it signed by the trusted broker?
    ///
    /// Any failure (missing header, unknown kid, malformed or invalid
    /// signature, empty key set) collapses to `false`. The rejection reason
    /// is logged at debug level only; callers never learn why.
    pub fn verify(&self, key_id: Option<&str>, signature: Option<&str>, body: &[u8]) -> bool {
        match self.check(key_id, signature, body) {
            Ok(()) => true,
            Err(reason) => {
                debug!("rejecting broker request: {reason}");
                false
            }
        }
    }

    fn check(
        &self,
        key_id: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<(), AuthError> {
        if self.keys.is_empty() {
            return Err(AuthError::EmptyKeySet);
        }

        let kid = key_id.ok_or(AuthError::MissingHeader(KEY_ID_HEADER))?;
        let encoded = signature.ok_or(AuthError::MissingHeader(SIGNATURE_HEADER))?;

        let key = self
            .keys
            .get(kid)
            .ok_or_else(|| AuthError::UnknownKeyId(kid.to_string()))?;

        let raw = Base64
            .decode(encoded)
            .map_err(|e| AuthError::MalformedSignature(e.to_string()))?;
        let signature = Signature::try_from(raw.as_slice())
            .map_err(|e| AuthError::MalformedSignature(e.to_string()))?;

        key.verify_strict(body, &signature)
            .map_err(|_| AuthError::SignatureInvalid)
    }
}

fn decode_public_key(entry: &BrokerKey) -> Result<VerifyingKey, AuthError> {
    let raw = Base64
        .decode(entry.key.trim())
        .map_err(|e| AuthError::MalformedKey {
            kid: entry.kid.clone(),
            reason: e.to_string(),
        })?;

    let raw: [u8; 32] = raw.as_slice().try_into().map_err(|_| AuthError::MalformedKey {
        kid: entry.kid.clone(),
        reason: format!("expected 32 bytes of key material, got {}", raw.len()),
    })?;

    VerifyingKey::from_bytes(&raw).map_err(|e| AuthError::MalformedKey {
        kid: entry.kid.clone(),
        reason: e.to_string(),
    })
}
