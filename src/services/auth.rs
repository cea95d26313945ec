// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Three-legged OAuth 1.0a authorization against FatSecret.
//!
//! The flow is a typestate:
//! 1. `AuthorizationFlow` (no tokens) asks for a request token
//! 2. `PendingAuthorization` holds the request token; the user opens
//!    `authorize_url()` and reads back a verifier out-of-band
//! 3. `exchange(verifier)` trades it for permanent `Credentials`
//!
//! Tokens do not expire, so there is no refresh step. Nothing is persisted
//! until step 3 succeeds.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::error::FatSecretError;
use crate::models::Credentials;
use crate::services::fatsecret::FatSecretClient;
use crate::services::oauth::{percent_encode, OAuthParams, OAUTH_TOKEN, OAUTH_TOKEN_SECRET};

/// Callback value telling FatSecret to show the verifier to the user.
pub const OUT_OF_BAND_CALLBACK: &str = "oob";

/// Token and secret returned by a token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub secret: String,
}

/// Parse an `application/x-www-form-urlencoded` token response.
pub fn parse_token_response(body: &str) -> Result<TokenPair, FatSecretError> {
    let fields: HashMap<String, String> = serde_urlencoded::from_str(body.trim())
        .map_err(|e| FatSecretError::Auth(format!("malformed token response: {}", e)))?;

    let token = fields.get(OAUTH_TOKEN).filter(|t| !t.is_empty());
    let secret = fields.get(OAUTH_TOKEN_SECRET);

    match (token, secret) {
        (Some(token), Some(secret)) => Ok(TokenPair {
            token: token.clone(),
            secret: secret.clone(),
        }),
        _ => {
            tracing::debug!(keys = ?fields.keys().collect::<Vec<_>>(), "Token response without token");
            Err(FatSecretError::Auth("missing token in response".to_string()))
        }
    }
}

/// Any failure during the handshake is an authorization failure.
fn into_auth_error(err: FatSecretError) -> FatSecretError {
    match err {
        FatSecretError::Auth(_) => err,
        other => FatSecretError::Auth(other.to_string()),
    }
}

fn require(value: &str, what: &str) -> Result<String, FatSecretError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FatSecretError::Auth(format!("{} is required", what)));
    }
    Ok(trimmed.to_string())
}

/// Start of the handshake: consumer credentials only.
#[derive(Clone)]
pub struct AuthorizationFlow {
    client: FatSecretClient,
    consumer_key: String,
    consumer_secret: String,
}

impl AuthorizationFlow {
    pub fn new(
        client: FatSecretClient,
        consumer_key: &str,
        consumer_secret: &str,
    ) -> Result<Self, FatSecretError> {
        Ok(Self {
            client,
            consumer_key: require(consumer_key, "consumer key")?,
            consumer_secret: require(consumer_secret, "consumer secret")?,
        })
    }

    /// Obtain a temporary request token (token secret is empty for this call).
    pub async fn request_token(self) -> Result<PendingAuthorization, FatSecretError> {
        let url = self.client.endpoints().request_token_url.clone();

        let oauth = OAuthParams::new(&self.consumer_key)
            .callback(OUT_OF_BAND_CALLBACK)
            .signed("GET", &url, &[], &self.consumer_secret, "")?;

        let body = self
            .client
            .get_signed_form(&url, &oauth)
            .await
            .map_err(into_auth_error)?;
        let request_token = parse_token_response(&body)?;

        tracing::info!("Obtained FatSecret request token");

        Ok(PendingAuthorization {
            client: self.client,
            consumer_key: self.consumer_key,
            consumer_secret: self.consumer_secret,
            request_token,
        })
    }
}

/// Request token obtained, waiting for the user's verifier.
#[derive(Clone)]
pub struct PendingAuthorization {
    client: FatSecretClient,
    consumer_key: String,
    consumer_secret: String,
    request_token: TokenPair,
}

impl PendingAuthorization {
    /// Page the user must visit to approve access and get a verifier.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?{}={}",
            self.client.endpoints().authorize_url,
            OAUTH_TOKEN,
            percent_encode(&self.request_token.token)
        )
    }

    pub fn request_token(&self) -> &str {
        &self.request_token.token
    }

    /// Exchange the verifier for permanent access credentials.
    ///
    /// Takes `&self` so a mistyped verifier can be retried against the same
    /// request token.
    pub async fn exchange(&self, verifier: &str) -> Result<Credentials, FatSecretError> {
        let verifier = require(verifier, "verifier")?;
        let url = &self.client.endpoints().access_token_url;

        let oauth = OAuthParams::new(&self.consumer_key)
            .token(&self.request_token.token)
            .verifier(&verifier)
            .signed(
                "GET",
                url,
                &[],
                &self.consumer_secret,
                &self.request_token.secret,
            )?;

        let body = self
            .client
            .get_signed_form(url, &oauth)
            .await
            .map_err(into_auth_error)?;
        let access = parse_token_response(&body)?;

        tracing::info!("FatSecret authorization complete");

        Ok(Credentials {
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            access_token: access.token,
            access_token_secret: access.secret,
        })
    }
}

/// Most authorizations allowed to wait for a verifier at once.
pub const MAX_PENDING_FLOWS: usize = 100;

/// An authorization waiting for its verifier, and the entry it will create.
#[derive(Clone)]
pub struct PendingFlow {
    pub entry_id: String,
    pub authorization: PendingAuthorization,
    pub started: Instant,
}

impl PendingFlow {
    pub fn new(entry_id: String, authorization: PendingAuthorization) -> Self {
        Self {
            entry_id,
            authorization,
            started: Instant::now(),
        }
    }
}

/// Pending flows keyed by flow ID.
///
/// A flow expires `ttl` after it started. Expired flows are dropped whenever
/// the map is touched, and once `capacity` flows are waiting the oldest one
/// makes room for a new start.
pub struct PendingFlows {
    flows: DashMap<String, PendingFlow>,
    ttl: Duration,
    capacity: usize,
}

impl PendingFlows {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            flows: DashMap::new(),
            ttl,
            capacity,
        }
    }

    /// Drop expired flows. Returns how many were dropped.
    pub fn prune(&self) -> usize {
        let before = self.flows.len();
        self.flows.retain(|_, flow| flow.started.elapsed() < self.ttl);
        let expired = before.saturating_sub(self.flows.len());
        if expired > 0 {
            tracing::debug!(expired, "Dropped expired authorization flows");
        }
        expired
    }

    pub fn insert(&self, flow_id: String, flow: PendingFlow) {
        self.prune();

        while self.flows.len() >= self.capacity {
            let oldest = self
                .flows
                .iter()
                .min_by_key(|flow| flow.started)
                .map(|flow| flow.key().clone());
            let Some(oldest) = oldest else { break };

            self.flows.remove(&oldest);
            tracing::warn!(capacity = self.capacity, "Evicted oldest authorization flow");
        }

        self.flows.insert(flow_id, flow);
    }

    /// A copy of the flow, unless it is unknown or expired.
    pub fn get(&self, flow_id: &str) -> Option<PendingFlow> {
        self.prune();
        self.flows.get(flow_id).map(|flow| flow.value().clone())
    }

    pub fn remove(&self, flow_id: &str) -> bool {
        self.flows.remove(flow_id).is_some()
    }

    pub fn contains(&self, flow_id: &str) -> bool {
        self.flows.contains_key(flow_id)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_response() {
        let pair = parse_token_response("oauth_token=req_token&oauth_token_secret=req_secret")
            .unwrap();
        assert_eq!(pair.token, "req_token");
        assert_eq!(pair.secret, "req_secret");
    }

    #[test]
    fn test_parse_token_response_decodes_and_ignores_extras() {
        let pair = parse_token_response(
            "oauth_token=a%2Bb&oauth_token_secret=c%3Dd&oauth_callback_confirmed=true\n",
        )
        .unwrap();
        assert_eq!(pair.token, "a+b");
        assert_eq!(pair.secret, "c=d");
    }

    #[test]
    fn test_parse_token_response_missing_token() {
        let err = parse_token_response("invalid_response").unwrap_err();
        assert!(matches!(err, FatSecretError::Auth(ref m) if m == "missing token in response"));

        let err = parse_token_response("oauth_token=abc").unwrap_err();
        assert!(matches!(err, FatSecretError::Auth(_)));

        let err = parse_token_response("oauth_token=&oauth_token_secret=s").unwrap_err();
        assert!(matches!(err, FatSecretError::Auth(_)));
    }

    #[test]
    fn test_transport_errors_become_auth_errors() {
        let err = into_auth_error(FatSecretError::Transport {
            status: 401,
            message: "Unauthorized".to_string(),
        });
        assert!(matches!(err, FatSecretError::Auth(ref m) if m.contains("401")));
    }

    fn pending(started: Instant) -> PendingFlow {
        let client = FatSecretClient::new(Default::default(), Duration::from_secs(1)).unwrap();
        PendingFlow {
            entry_id: "default".to_string(),
            authorization: PendingAuthorization {
                client,
                consumer_key: "ck".to_string(),
                consumer_secret: "cs".to_string(),
                request_token: TokenPair {
                    token: "rt".to_string(),
                    secret: "rs".to_string(),
                },
            },
            started,
        }
    }

    #[test]
    fn test_expired_flow_is_gone() {
        let flows = PendingFlows::new(Duration::ZERO, MAX_PENDING_FLOWS);
        flows.insert("a".to_string(), pending(Instant::now()));

        assert!(flows.get("a").is_none());
        assert!(flows.is_empty());
    }

    #[test]
    fn test_live_flow_is_kept() {
        let flows = PendingFlows::new(Duration::from_secs(900), MAX_PENDING_FLOWS);
        flows.insert("a".to_string(), pending(Instant::now()));

        assert_eq!(flows.get("a").map(|f| f.entry_id), Some("default".to_string()));
        assert!(flows.remove("a"));
        assert!(!flows.contains("a"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let flows = PendingFlows::new(Duration::from_secs(900), 2);
        let now = Instant::now();
        flows.insert("b".to_string(), pending(now + Duration::from_secs(1)));
        flows.insert("a".to_string(), pending(now));
        flows.insert("c".to_string(), pending(now + Duration::from_secs(2)));

        assert_eq!(flows.len(), 2);
        assert!(!flows.contains("a"));
        assert!(flows.contains("b"));
        assert!(flows.contains("c"));
    }

    #[test]
    fn test_blank_consumer_rejected() {
        let client = FatSecretClient::new(Default::default(), std::time::Duration::from_secs(1))
            .unwrap();
        assert!(AuthorizationFlow::new(client.clone(), " ", "secret").is_err());
        assert!(AuthorizationFlow::new(client, "key", "").is_err());
    }
}
