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

//! The key flow: exchange a signed assertion for an access token.
//!
//! Each token request resolves the service account key and the private key
//! from their configured sources, signs a short-lived RS256 assertion with
//! the claims from the key, and posts it to the token endpoint as an OAuth2
//! JWT-bearer grant. Nothing is cached between requests.

mod jws;

use crate::Result;
use crate::credentials::key_source::SourceChain;
use crate::credentials::service_account::ServiceAccountKey;
use crate::credentials::{
    Credentials, DEFAULT_TOKEN_URL, PRIVATE_KEY_PATH_VAR, PRIVATE_KEY_VAR,
    SERVICE_ACCOUNT_KEY_PATH_VAR, SERVICE_ACCOUNT_KEY_VAR,
};
use crate::errors::Error;
use crate::token::{AccessToken, TokenProvider};
use base64::prelude::{BASE64_URL_SAFE_NO_PAD, Engine as _};
use rustls::crypto::CryptoProvider;
use rustls::sign::Signer;
use rustls_pemfile::Item;
use rustls_pki_types::PrivateKeyDer;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use time::OffsetDateTime;

/// The OAuth2 grant type of the exchange request.
pub(crate) const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// A builder for key flow [Credentials].
///
/// All options are optional. The environment takes precedence over builder
/// options: for each of the service account key and the private key the
/// first set source wins, in the order environment value, environment file
/// path, builder value, builder file path. The private key falls back to
/// the `credentials.private_key` embedded in the service account key when
/// no source is set.
///
/// ## Example
/// ```no_run
/// use stackit_auth::credentials::key_flow::Builder;
/// # tokio_test::block_on(async {
/// let credentials = Builder::new()
///     .with_service_account_key_path("/var/run/secrets/sa_key.json")
///     .build();
/// let headers = credentials.headers().await?;
/// # Ok::<(), stackit_auth::errors::Error>(())
/// # });
/// ```
#[derive(Default)]
pub struct Builder {
    service_account_key: Option<String>,
    service_account_key_path: Option<String>,
    private_key: Option<String>,
    private_key_path: Option<String>,
    token_url: Option<String>,
}

impl Builder {
    /// Creates a builder with no options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service account key JSON.
    ///
    /// [SERVICE_ACCOUNT_KEY_VAR] and [SERVICE_ACCOUNT_KEY_PATH_VAR] still
    /// take precedence over this value.
    pub fn with_service_account_key<S: Into<String>>(mut self, json: S) -> Self {
        self.service_account_key = Some(json.into());
        self
    }

    /// Sets the path of a file holding the service account key JSON.
    ///
    /// The file is read on every token request, not when the builder runs.
    pub fn with_service_account_key_path<S: Into<String>>(mut self, path: S) -> Self {
        self.service_account_key_path = Some(path.into());
        self
    }

    /// Sets the private key PEM used to sign assertions.
    ///
    /// [PRIVATE_KEY_VAR] and [PRIVATE_KEY_PATH_VAR] still take precedence
    /// over this value.
    pub fn with_private_key<S: Into<String>>(mut self, pem: S) -> Self {
        self.private_key = Some(pem.into());
        self
    }

    /// Sets the path of a file holding the private key PEM.
    pub fn with_private_key_path<S: Into<String>>(mut self, path: S) -> Self {
        self.private_key_path = Some(path.into());
        self
    }

    /// Overrides the token endpoint. Defaults to the global STACKIT service
    /// account endpoint.
    pub fn with_token_url<S: Into<String>>(mut self, url: S) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Captures the environment and returns the credentials.
    ///
    /// Never fails: the configured sources are only consulted, and
    /// validated, on each token request.
    pub fn build(self) -> Credentials {
        Credentials::new(self.build_token_provider())
    }

    pub(crate) fn build_token_provider(self) -> KeyFlowTokenProvider {
        let key_source = SourceChain::capture(
            SERVICE_ACCOUNT_KEY_VAR,
            SERVICE_ACCOUNT_KEY_PATH_VAR,
            self.service_account_key,
            self.service_account_key_path,
        );
        let private_key_source = SourceChain::capture(
            PRIVATE_KEY_VAR,
            PRIVATE_KEY_PATH_VAR,
            self.private_key,
            self.private_key_path,
        );
        KeyFlowTokenProvider {
            key_source,
            private_key_source,
            token_url: self.token_url.unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
        }
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field(
                "service_account_key",
                &self.service_account_key.as_ref().map(|_| "[censored]"),
            )
            .field("service_account_key_path", &self.service_account_key_path)
            .field("private_key", &self.private_key.as_ref().map(|_| "[censored]"))
            .field("private_key_path", &self.private_key_path)
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// Runs the whole flow, resolution included, on every call.
#[derive(Debug)]
pub(crate) struct KeyFlowTokenProvider {
    key_source: SourceChain,
    private_key_source: SourceChain,
    token_url: String,
}

#[async_trait::async_trait]
impl TokenProvider for KeyFlowTokenProvider {
    async fn token(&self) -> Result<AccessToken> {
        let key = self.service_account_key().await?;
        let private_key = self.private_key(&key).await?;
        let assertion = build_assertion(&key, &private_key, &self.token_url)?;
        exchange_assertion(&self.token_url, &assertion).await
    }
}

impl KeyFlowTokenProvider {
    async fn service_account_key(&self) -> Result<ServiceAccountKey> {
        let contents = self
            .key_source
            .resolve()
            .await?
            .ok_or_else(Error::missing_key)?;
        ServiceAccountKey::from_json(&contents)
    }

    // The explicit sources win over the key embedded in the service account
    // key document.
    async fn private_key(&self, key: &ServiceAccountKey) -> Result<String> {
        if let Some(pem) = self.private_key_source.resolve().await? {
            return Ok(pem);
        }
        key.credentials
            .private_key
            .clone()
            .ok_or_else(Error::missing_private_key)
    }
}

fn build_assertion(key: &ServiceAccountKey, private_key: &str, token_url: &str) -> Result<String> {
    let signer = signer(private_key)?;

    let iat = OffsetDateTime::now_utc() - jws::CLOCK_SKEW_FUDGE;
    let claims = jws::JwsClaims {
        iss: &key.credentials.iss,
        sub: &key.credentials.sub,
        aud: token_url,
        iat,
        exp: iat + jws::ASSERTION_LIFETIME,
    };
    let header = jws::JwsHeader {
        alg: "RS256",
        typ: "JWT",
        kid: &key.credentials.kid,
    };

    let signing_input = format!("{}.{}", header.encode()?, claims.encode()?);
    let sig = signer
        .sign(signing_input.as_bytes())
        .map_err(Error::invalid_private_key)?;

    Ok(format!(
        "{signing_input}.{}",
        BASE64_URL_SAFE_NO_PAD.encode(sig)
    ))
}

// Creates a signer from a PEM encoded private key.
fn signer(private_key: &str) -> Result<Box<dyn Signer>> {
    let key_provider = CryptoProvider::get_default().map_or_else(
        || rustls::crypto::ring::default_provider().key_provider,
        |p| p.key_provider,
    );

    let item = rustls_pemfile::read_one(&mut private_key.as_bytes())
        .map_err(Error::invalid_private_key)?
        .ok_or_else(|| Error::invalid_private_key("missing PEM section in private key"))?;
    let der = match item {
        Item::Pkcs1Key(item) => PrivateKeyDer::from(item),
        Item::Pkcs8Key(item) => PrivateKeyDer::from(item),
        other => {
            return Err(Error::invalid_private_key(format!(
                "expected an RSA or PKCS#8 private key, found {other:?}"
            )));
        }
    };

    let signing_key = key_provider
        .load_private_key(der)
        .map_err(Error::invalid_private_key)?;
    signing_key
        .choose_scheme(&[rustls::SignatureScheme::RSA_PKCS1_SHA256])
        .ok_or_else(|| {
            Error::invalid_private_key("the key does not support RSA_PKCS1_SHA256 signatures")
        })
}

/// The form body of the exchange request.
#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    assertion: &'a str,
}

/// The body of a successful exchange response.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    expires_in: Option<u64>,
    scope: Option<String>,
    refresh_token: Option<String>,
}

async fn exchange_assertion(token_url: &str, assertion: &str) -> Result<AccessToken> {
    let request = TokenRequest {
        grant_type: JWT_BEARER_GRANT_TYPE,
        assertion,
    };
    let response = reqwest::Client::new()
        .post(token_url)
        .form(&request)
        .send()
        .await
        .map_err(Error::exchange_transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.map_err(Error::exchange_transport)?;
        return Err(Error::exchange_status(status, body));
    }

    let response = response
        .json::<TokenResponse>()
        .await
        .map_err(Error::invalid_token_response)?;
    if response.access_token.is_empty() {
        return Err(Error::invalid_token_response(
            "the token endpoint returned an empty access_token",
        ));
    }
    Ok(AccessToken {
        token: response.access_token,
        token_type: response.token_type,
        // checked_add: a nonsense expires_in must not panic the pipeline.
        expires_at: response
            .expires_in
            .and_then(|d| Instant::now().checked_add(Duration::from_secs(d))),
        scope: response.scope,
    })
}
