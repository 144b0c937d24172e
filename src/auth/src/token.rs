// Copyright 2025 STACKIT GmbH & Co. KG
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Types to represent access tokens.

use crate::Result;
use std::time::Instant;

/// A bearer access token issued for a service account.
#[derive(Clone, PartialEq)]
pub struct AccessToken {
    /// The token string, used verbatim in `Authorization:` headers.
    pub token: String,

    /// The type of the token, typically `"Bearer"`.
    pub token_type: String,

    /// The instant at which the token expires.
    ///
    /// `None` when the token endpoint did not report a lifetime. Note that
    /// an `Instant` is only meaningful within the current process.
    pub expires_at: Option<Instant>,

    /// The scope granted by the token endpoint, if it reported one.
    pub scope: Option<String>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[censored]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

/// The capability to mint access tokens.
///
/// The key flow implements this trait. Applications normally consume it
/// through [Credentials][crate::credentials::Credentials], and tests or
/// alternative flows can supply their own implementation via
/// [Credentials::new][crate::credentials::Credentials::new].
#[async_trait::async_trait]
pub trait TokenProvider: std::fmt::Debug + Send + Sync {
    /// Produces a fresh access token.
    async fn token(&self) -> Result<AccessToken>;
}
