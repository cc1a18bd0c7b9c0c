//! Identifier and timestamp generation.

use std::sync::atomic::{AtomicU64, Ordering};

const UPPER_ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MIXED_ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A fresh request ID (UUID v4).
#[must_use]
pub fn request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn random_from(alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| {
            let idx = usize::from(rand::random::<u8>()) % alphabet.len();
            char::from(alphabet[idx])
        })
        .collect()
}

/// `len` random lowercase hex characters.
#[must_use]
pub fn short_hex_id(len: usize) -> String {
    let mut out = uuid::Uuid::new_v4().simple().to_string();
    while out.len() < len {
        out.push_str(&uuid::Uuid::new_v4().simple().to_string());
    }
    out.truncate(len);
    out
}

/// An IAM-style unique ID: a four-letter prefix followed by 17 uppercase
/// alphanumerics (`AROA...`, `AIDA...`, `ANPA...`, `ASIA...`).
#[must_use]
pub fn aws_unique_id(prefix: &str) -> String {
    format!("{prefix}{}", random_from(UPPER_ALNUM, 17))
}

/// A 40-character secret access key.
#[must_use]
pub fn secret_key() -> String {
    random_from(MIXED_ALNUM, 40)
}

/// An opaque session token.
#[must_use]
pub fn session_token() -> String {
    format!("FQoGZXIvYXdzE{}", random_from(MIXED_ALNUM, 96))
}

/// Current time as fractional epoch seconds, the way DynamoDB timestamps are encoded.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn epoch_seconds() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp_millis() as f64 / 1000.0
}

/// Strictly increasing revision IDs derived from the wall clock.
///
/// Each call returns the current epoch milliseconds, or one more than the
/// previous value if the clock has not advanced, so two writes in the same
/// millisecond never share a revision.
#[derive(Debug, Default)]
pub struct RevisionClock {
    last: AtomicU64,
}

impl RevisionClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next revision ID as a decimal string.
    pub fn next(&self) -> String {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.last.compare_exchange_weak(
                prev,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate.to_string(),
                Err(actual) => prev = actual,
            }
        }
    }
}
