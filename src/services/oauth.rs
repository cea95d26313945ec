// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth 1.0a request signing (HMAC-SHA1, RFC 5849).
//!
//! Everything here is pure: the nonce and timestamp are the only inputs that
//! vary between calls, and `OAuthParams::with_stamp` lets callers pin them.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha1::Sha1;

use crate::error::FatSecretError;
use crate::time_utils::unix_timestamp;

type HmacSha1 = Hmac<Sha1>;

pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub const OAUTH_TOKEN: &str = "oauth_token";
pub const OAUTH_TOKEN_SECRET: &str = "oauth_token_secret";
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
pub const OAUTH_NONCE: &str = "oauth_nonce";
pub const OAUTH_VERSION: &str = "oauth_version";
pub const OAUTH_CALLBACK: &str = "oauth_callback";
pub const OAUTH_VERIFIER: &str = "oauth_verifier";

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";

/// Upper bound (inclusive) for generated nonces.
const MAX_NONCE: u32 = 100_000_000;

/// Percent-encode per RFC 3986: only `A-Z a-z 0-9 - . _ ~` pass through.
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Build the signature base string: `METHOD&enc(url)&enc(sorted params)`.
///
/// Parameters are encoded first and then sorted by key, then value, so the
/// result does not depend on the order they are passed in.
pub fn build_base_string<K, V>(method: &str, url: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k.as_ref()), percent_encode(v.as_ref())))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Sign a base string. `token_secret` is empty before a token exists.
pub fn sign(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, FatSecretError> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| FatSecretError::Auth(format!("HMAC init failed: {}", e)))?;
    mac.update(base_string.as_bytes());

    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Render `OAuth k="v", ...` with values percent-encoded, in the given order.
pub fn authorization_header<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let pairs = params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k.as_ref(), percent_encode(v.as_ref())))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {}", pairs)
}

/// Draw a fresh nonce in `0..=100_000_000`.
pub fn generate_nonce() -> String {
    rand::thread_rng().gen_range(0..=MAX_NONCE).to_string()
}

/// Protocol parameters for one request. Built fresh per call, never reused.
#[derive(Debug, Clone)]
pub struct OAuthParams {
    params: Vec<(String, String)>,
}

impl OAuthParams {
    /// Parameters with a random nonce and the current timestamp.
    pub fn new(consumer_key: &str) -> Self {
        Self::with_stamp(consumer_key, &generate_nonce(), unix_timestamp())
    }

    /// Parameters with a caller-supplied nonce and timestamp.
    pub fn with_stamp(consumer_key: &str, nonce: &str, timestamp: i64) -> Self {
        Self {
            params: vec![
                (OAUTH_CONSUMER_KEY.to_string(), consumer_key.to_string()),
                (OAUTH_NONCE.to_string(), nonce.to_string()),
                (OAUTH_TIMESTAMP.to_string(), timestamp.to_string()),
                (OAUTH_SIGNATURE_METHOD.to_string(), SIGNATURE_METHOD.to_string()),
                (OAUTH_VERSION.to_string(), VERSION.to_string()),
            ],
        }
    }

    pub fn token(self, token: &str) -> Self {
        self.with(OAUTH_TOKEN, token)
    }

    pub fn callback(self, callback: &str) -> Self {
        self.with(OAUTH_CALLBACK, callback)
    }

    pub fn verifier(self, verifier: &str) -> Self {
        self.with(OAUTH_VERIFIER, verifier)
    }

    fn with(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    /// Value of a protocol parameter, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sign the request and return the protocol parameters plus
    /// `oauth_signature`. `extra` are the request's own query parameters;
    /// they take part in the signature but are not returned.
    pub fn signed(
        mut self,
        method: &str,
        url: &str,
        extra: &[(&str, &str)],
        consumer_secret: &str,
        token_secret: &str,
    ) -> Result<Vec<(String, String)>, FatSecretError> {
        let mut all: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        all.extend_from_slice(extra);

        let base_string = build_base_string(method, url, &all);
        let signature = sign(&base_string, consumer_secret, token_secret)?;

        self.params.push((OAUTH_SIGNATURE.to_string(), signature));
        Ok(self.params)
    }
}
