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

//! Credentials for STACKIT service accounts.
//!
//! [Credentials] is the handle applications hold. It hides which flow
//! produces the tokens behind the [TokenProvider] trait, so application
//! code does not change when the flow does. The only flow shipped today is
//! the [key flow][crate::credentials::key_flow].

pub mod key_flow;
pub(crate) mod key_source;
pub mod service_account;

use crate::Result;
use crate::token::{AccessToken, TokenProvider};
use http::header::{HeaderName, HeaderValue};
use std::sync::Arc;

/// Environment variable holding the service account key JSON.
pub const SERVICE_ACCOUNT_KEY_VAR: &str = "STACKIT_SERVICE_ACCOUNT_KEY";

/// Environment variable naming a file that holds the service account key
/// JSON.
pub const SERVICE_ACCOUNT_KEY_PATH_VAR: &str = "STACKIT_SERVICE_ACCOUNT_KEY_PATH";

/// Environment variable holding the private key PEM.
pub const PRIVATE_KEY_VAR: &str = "STACKIT_PRIVATE_KEY";

/// Environment variable naming a file that holds the private key PEM.
pub const PRIVATE_KEY_PATH_VAR: &str = "STACKIT_PRIVATE_KEY_PATH";

/// The token endpoint used when none is configured.
pub(crate) const DEFAULT_TOKEN_URL: &str = "https://service-account.api.stackit.cloud/token";

/// Produces access tokens for a STACKIT service account.
///
/// Cloning is cheap, clones share the same provider. Every call to
/// [token][Credentials::token] or [headers][Credentials::headers] runs the
/// configured flow from scratch. Tokens are not cached; callers decide if
/// and how long to reuse them.
#[derive(Clone, Debug)]
pub struct Credentials {
    inner: Arc<dyn TokenProvider>,
}

impl Credentials {
    /// Wraps a custom [TokenProvider].
    ///
    /// Most applications use the
    /// [key flow builder][crate::credentials::key_flow::Builder] instead.
    /// This constructor is the seam for tests and for alternative token
    /// sources.
    pub fn new<T>(provider: T) -> Self
    where
        T: TokenProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Produces a fresh access token.
    pub async fn token(&self) -> Result<AccessToken> {
        self.inner.token().await
    }

    /// Produces the headers that authenticate a request, currently a single
    /// sensitive `Authorization` entry.
    pub async fn headers(&self) -> Result<Vec<(HeaderName, HeaderValue)>> {
        let token = self.inner.token().await?;
        crate::headers_util::build_bearer_headers(&token)
    }
}
