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

//! # STACKIT SDK for Rust - Authentication
//!
//! This crate authenticates STACKIT service accounts using the *key flow*:
//! it signs a short-lived JWT assertion with the service account's RSA
//! private key and exchanges it at the STACKIT token endpoint for a bearer
//! access token.
//!
//! The service account key and the private key are resolved independently,
//! each from the first of these sources that is set:
//!
//! 1. an environment variable holding the value itself
//!    ([`STACKIT_SERVICE_ACCOUNT_KEY`][crate::credentials::SERVICE_ACCOUNT_KEY_VAR],
//!    [`STACKIT_PRIVATE_KEY`][crate::credentials::PRIVATE_KEY_VAR]),
//! 2. an environment variable naming a file with the value
//!    ([`STACKIT_SERVICE_ACCOUNT_KEY_PATH`][crate::credentials::SERVICE_ACCOUNT_KEY_PATH_VAR],
//!    [`STACKIT_PRIVATE_KEY_PATH`][crate::credentials::PRIVATE_KEY_PATH_VAR]),
//! 3. a value passed to the [Builder][crate::credentials::key_flow::Builder],
//! 4. a file path passed to the builder.
//!
//! The private key has a fifth fallback: the `credentials.private_key`
//! field embedded in the service account key itself.
//!
//! Every call to [`Credentials::token`][crate::credentials::Credentials::token]
//! runs the full resolution and exchange again. The library does not cache
//! tokens, does not renew them, and keeps no credential material beyond the
//! call. Callers that need caching should layer it on top.
//!
//! ## Quickstart
//!
//! ```no_run
//! use stackit_auth::credentials::key_flow::Builder;
//! # tokio_test::block_on(async {
//! let credentials = Builder::new()
//!     .with_service_account_key_path("/var/run/secrets/sa_key.json")
//!     .build();
//! let token = credentials.token().await?;
//! println!("token expires at {:?}", token.expires_at);
//! # Ok::<(), stackit_auth::errors::Error>(())
//! # });
//! ```

pub mod credentials;
pub mod errors;
pub(crate) mod headers_util;
pub mod token;

/// A `Result` alias where the `Err` case is [errors::Error].
pub type Result<T> = std::result::Result<T, crate::errors::Error>;
