// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FatSecret API client.
//!
//! Handles:
//! - Signed food-entry fetches, summed into nutrient totals
//! - Signed GETs against the OAuth token endpoints
//! - Mapping HTTP, body and API error codes onto `FatSecretError`

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use crate::error::FatSecretError;
use crate::models::{Credentials, NutrientTotals};
use crate::services::oauth::{authorization_header, OAuthParams};

pub const DEFAULT_AUTH_BASE_URL: &str = "https://authentication.fatsecret.com";
pub const DEFAULT_API_BASE_URL: &str = "https://platform.fatsecret.com";

const REQUEST_TOKEN_PATH: &str = "/oauth/request_token";
const AUTHORIZE_PATH: &str = "/oauth/authorize";
const ACCESS_TOKEN_PATH: &str = "/oauth/access_token";
const FOOD_ENTRIES_PATH: &str = "/rest/food-entries/v2";

/// Query parameters sent with every resource request.
const RESOURCE_QUERY: [(&str, &str); 1] = [("format", "json")];

/// FatSecret endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub request_token_url: String,
    /// User-facing page; never fetched by the client
    pub authorize_url: String,
    pub access_token_url: String,
    pub food_entries_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_bases(None, None)
    }
}

impl Endpoints {
    /// Endpoints rooted at the given hosts, falling back to FatSecret's own.
    pub fn with_bases(auth_base: Option<&str>, api_base: Option<&str>) -> Self {
        let auth = auth_base
            .unwrap_or(DEFAULT_AUTH_BASE_URL)
            .trim_end_matches('/');
        let api = api_base
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/');

        Self {
            request_token_url: format!("{}{}", auth, REQUEST_TOKEN_PATH),
            authorize_url: format!("{}{}", auth, AUTHORIZE_PATH),
            access_token_url: format!("{}{}", auth, ACCESS_TOKEN_PATH),
            food_entries_url: format!("{}{}", api, FOOD_ENTRIES_PATH),
        }
    }
}

/// FatSecret API client.
#[derive(Clone)]
pub struct FatSecretClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl FatSecretClient {
    /// Create a client whose requests all time out after `timeout`.
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, FatSecretError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FatSecretError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetch today's food entries and sum them.
    ///
    /// One request, no retry. Nonce and timestamp are fresh on every call.
    pub async fn fetch_totals(
        &self,
        credentials: &Credentials,
    ) -> Result<NutrientTotals, FatSecretError> {
        let url = &self.endpoints.food_entries_url;

        let oauth = OAuthParams::new(&credentials.consumer_key)
            .token(&credentials.access_token)
            .signed(
                "GET",
                url,
                &RESOURCE_QUERY,
                &credentials.consumer_secret,
                &credentials.access_token_secret,
            )?;

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, authorization_header(&oauth))
            .query(&RESOURCE_QUERY)
            .send()
            .await?;

        let body = self.check_response(response).await?;

        let data: Value =
            serde_json::from_str(&body).map_err(|e| FatSecretError::Format(e.to_string()))?;

        if let Some(error) = data.get("error") {
            return Err(api_error(error));
        }

        let totals = NutrientTotals::from_response(&data);
        tracing::debug!(?totals, "Fetched FatSecret food entries");
        Ok(totals)
    }

    /// GET a token endpoint with the signed OAuth parameters in the query
    /// string and return the raw body.
    pub async fn get_signed_form(
        &self,
        url: &str,
        oauth: &[(String, String)],
    ) -> Result<String, FatSecretError> {
        let response = self.http.get(url).query(oauth).send().await?;
        self.check_response(response).await
    }

    /// Check response status and return the body if successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<String, FatSecretError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "FatSecret request failed");
            return Err(FatSecretError::Transport {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FatSecretError::Format(format!("Failed to read body: {}", e)))
    }
}

/// Map an `error` object from a response body.
///
/// A missing or non-numeric code is reported as code 0.
fn api_error(error: &Value) -> FatSecretError {
    let code = match error.get("code") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .unwrap_or(0);

    let message = error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .unwrap_or("No message provided");

    let err = FatSecretError::from_api_code(code, message);
    match &err {
        FatSecretError::OAuth { explanation, .. } => {
            tracing::error!(
                code,
                explanation = %explanation,
                api_message = message,
                "FatSecret API error"
            );
        }
        _ => tracing::error!(code, api_message = message, "FatSecret returned unknown error code"),
    }
    err
}
