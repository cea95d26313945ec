// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorized FatSecret credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Consumer and access credentials for one entry.
///
/// Written once when authorization completes and never mutated; rotating them
/// means running the authorization flow again.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Permanent access token (`oauth_token`)
    pub access_token: String,
    /// Permanent access token secret (`oauth_token_secret`)
    pub access_token_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}
