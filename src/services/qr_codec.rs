//! Gate pass token codec
//!
//! Turns `{visitorId, gateId, issuedAt}` into an opaque string for a QR
//! badge and back. Tokens are sealed with ChaCha20-Poly1305 under a key
//! derived from the pre-shared secret, so a badge holder cannot forge or
//! alter identifiers without the secret.
//!
//! Token text: URL-safe base64 (no padding) of `nonce(12) || ciphertext || tag(16)`.
//!
//! Every decode failure collapses into `QrError::DecodeFailure`. Callers
//! cannot tell a wrong secret from a corrupt token or a malformed payload.
//!
//! No freshness check happens here; see `GateScanner` for the replay window.

use crate::domain::types::{GateId, QrPayload, VisitorId};
use crate::infra::config::Config;
use crate::infra::secret::SharedSecret;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use chrono::{DateTime, Datelike, SubsecRound, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Associated data binding the token format version
const TOKEN_AAD: &[u8] = b"gatepass/qr/v1";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QrError {
    /// Encode-time validation failure, names the offending field
    #[error("invalid payload: {0} is required")]
    InvalidPayload(&'static str),
    /// Any decode-time failure. Deliberately carries no detail.
    #[error("invalid code")]
    DecodeFailure,
}

/// Encoder/decoder seam shared by the sealed and plaintext codecs
pub trait PassCodec: Send + Sync {
    /// Encode with an explicit issue time
    fn encode_at(
        &self,
        visitor_id: &str,
        gate_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, QrError>;

    fn decode(&self, raw: &str) -> Result<QrPayload, QrError>;

    /// Encode stamped with the current time
    fn encode(&self, visitor_id: &str, gate_id: &str) -> Result<String, QrError> {
        self.encode_at(visitor_id, gate_id, Utc::now())
    }
}

/// Build a payload, rejecting blank identifiers and unencodable issue times
fn build_payload(
    visitor_id: &str,
    gate_id: &str,
    issued_at: DateTime<Utc>,
) -> Result<QrPayload, QrError> {
    if visitor_id.trim().is_empty() {
        return Err(QrError::InvalidPayload("visitorId"));
    }
    if gate_id.trim().is_empty() {
        return Err(QrError::InvalidPayload("gateId"));
    }
    // RFC 3339 only has four-digit years
    if !(0..=9999).contains(&issued_at.year()) {
        return Err(QrError::InvalidPayload("issuedAt"));
    }

    Ok(QrPayload {
        visitor_id: VisitorId(visitor_id.to_string()),
        gate_id: GateId(gate_id.to_string()),
        // Wire format carries milliseconds
        issued_at: issued_at.trunc_subsecs(3),
    })
}

/// Parse a decrypted/plain payload, rejecting anything off-shape
fn parse_payload(bytes: &[u8]) -> Result<QrPayload, QrError> {
    let payload: QrPayload =
        serde_json::from_slice(bytes).map_err(|_| QrError::DecodeFailure)?;

    if payload.visitor_id.as_str().trim().is_empty() || payload.gate_id.as_str().trim().is_empty()
    {
        return Err(QrError::DecodeFailure);
    }

    Ok(payload)
}

/// Authenticated-encryption codec. The default and only recommended mode.
#[derive(Clone)]
pub struct QrCodec {
    cipher: ChaCha20Poly1305,
}

impl QrCodec {
    pub fn new(secret: &SharedSecret) -> Self {
        Self { cipher: ChaCha20Poly1305::new(Key::from_slice(secret.key())) }
    }
}

impl PassCodec for QrCodec {
    fn encode_at(
        &self,
        visitor_id: &str,
        gate_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, QrError> {
        let payload = build_payload(visitor_id, gate_id, issued_at)?;
        let plaintext =
            serde_json::to_vec(&payload).map_err(|_| QrError::InvalidPayload("payload"))?;

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), Payload { msg: &plaintext, aad: TOKEN_AAD })
            .map_err(|_| QrError::InvalidPayload("payload"))?;

        let mut token = Vec::with_capacity(NONCE_LEN + sealed.len());
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&sealed);

        Ok(URL_SAFE_NO_PAD.encode(token))
    }

    fn decode(&self, raw: &str) -> Result<QrPayload, QrError> {
        let bytes = URL_SAFE_NO_PAD.decode(raw.trim()).map_err(|_| QrError::DecodeFailure)?;
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(QrError::DecodeFailure);
        }

        let (nonce, sealed) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: sealed, aad: TOKEN_AAD })
            .map_err(|_| QrError::DecodeFailure)?;

        parse_payload(&plaintext)
    }
}

impl std::fmt::Debug for QrCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("QrCodec { .. }")
    }
}

/// INSECURE: embeds the payload as plain JSON with no integrity protection.
///
/// Anyone can forge a token for any visitor and gate. Kept only for legacy
/// badge printers and test rigs that cannot hold the shared secret. Never
/// selected unless asked for by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextQrCodec;

impl PassCodec for PlaintextQrCodec {
    fn encode_at(
        &self,
        visitor_id: &str,
        gate_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, QrError> {
        let payload = build_payload(visitor_id, gate_id, issued_at)?;
        serde_json::to_string(&payload).map_err(|_| QrError::InvalidPayload("payload"))
    }

    fn decode(&self, raw: &str) -> Result<QrPayload, QrError> {
        parse_payload(raw.trim().as_bytes())
    }
}

/// Pick the codec for a site. The sealed codec needs the shared secret and
/// fails closed when it is missing; the plaintext one is only returned when
/// `insecure_plaintext` is set.
pub fn codec_from_config(
    config: &Config,
    insecure_plaintext: bool,
) -> anyhow::Result<Arc<dyn PassCodec>> {
    if insecure_plaintext {
        warn!(site_id = %config.site_id(), "insecure_plaintext_codec_selected");
        return Ok(Arc::new(PlaintextQrCodec));
    }

    let secret = config.shared_secret()?;
    info!(
        secret_env = %config.qr_secret_env(),
        key_fingerprint = %secret.fingerprint(),
        "qr_secret_loaded"
    );
    Ok(Arc::new(QrCodec::new(&secret)))
}
