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

//! The errors returned when producing access tokens.

use http::StatusCode;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Describes why a token request failed.
///
/// The error representation is private. Credential material must never leak
/// through error messages, and keeping the contents opaque lets the library
/// improve the messages without breaking applications. Use the `is_*`
/// predicates to classify a failure, [http_status][Error::http_status] to
/// examine a rejected exchange, and [is_transient][Error::is_transient] to
/// decide if a retry may help.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// No service account key was found in any configured source.
    pub fn is_missing_key(&self) -> bool {
        matches!(self.0, ErrorKind::MissingKey)
    }

    /// A file named by one of the configured sources could not be read.
    pub fn is_loading(&self) -> bool {
        matches!(self.0, ErrorKind::Loading { .. })
    }

    /// The service account key could not be parsed.
    pub fn is_parsing(&self) -> bool {
        matches!(self.0, ErrorKind::Parsing(_))
    }

    /// No private key was found in any configured source, and the service
    /// account key does not embed one.
    pub fn is_missing_private_key(&self) -> bool {
        matches!(self.0, ErrorKind::MissingPrivateKey)
    }

    /// The private key could not be loaded or could not sign the assertion.
    pub fn is_invalid_private_key(&self) -> bool {
        matches!(self.0, ErrorKind::InvalidPrivateKey(_))
    }

    /// The token exchange failed, either before a response arrived or with
    /// an error status. [http_status][Error::http_status] distinguishes the
    /// two cases.
    pub fn is_token_exchange(&self) -> bool {
        matches!(
            self.0,
            ErrorKind::ExchangeTransport(_) | ErrorKind::ExchangeStatus { .. }
        )
    }

    /// The token endpoint accepted the exchange but returned an unusable
    /// body.
    pub fn is_invalid_token_response(&self) -> bool {
        matches!(self.0, ErrorKind::InvalidTokenResponse(_))
    }

    /// The HTTP status of a rejected token exchange, if one was received.
    pub fn http_status(&self) -> Option<StatusCode> {
        match &self.0 {
            ErrorKind::ExchangeStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when retrying the token request may succeed.
    ///
    /// Transport failures and a small set of exchange statuses qualify.
    /// Everything else, missing or malformed configuration in particular,
    /// fails the same way on every attempt.
    pub fn is_transient(&self) -> bool {
        match &self.0 {
            ErrorKind::ExchangeTransport(_) => true,
            ErrorKind::ExchangeStatus { status, .. } => matches!(
                *status,
                StatusCode::INTERNAL_SERVER_ERROR
                    | StatusCode::SERVICE_UNAVAILABLE
                    | StatusCode::REQUEST_TIMEOUT
                    | StatusCode::TOO_MANY_REQUESTS
            ),
            _ => false,
        }
    }

    pub(crate) fn missing_key() -> Self {
        Self(ErrorKind::MissingKey)
    }

    pub(crate) fn loading<S, T>(path: S, source: T) -> Self
    where
        S: Into<String>,
        T: Into<BoxError>,
    {
        Self(ErrorKind::Loading {
            path: path.into(),
            source: source.into(),
        })
    }

    pub(crate) fn parsing<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::Parsing(source.into()))
    }

    pub(crate) fn missing_private_key() -> Self {
        Self(ErrorKind::MissingPrivateKey)
    }

    pub(crate) fn invalid_private_key<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::InvalidPrivateKey(source.into()))
    }

    pub(crate) fn exchange_transport<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::ExchangeTransport(source.into()))
    }

    pub(crate) fn exchange_status(status: StatusCode, body: String) -> Self {
        Self(ErrorKind::ExchangeStatus { status, body })
    }

    pub(crate) fn invalid_token_response<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::InvalidTokenResponse(source.into()))
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error(
        "no service account key found, set STACKIT_SERVICE_ACCOUNT_KEY or STACKIT_SERVICE_ACCOUNT_KEY_PATH, or configure a key on the builder"
    )]
    MissingKey,
    #[error("could not read the credential file {path}")]
    Loading {
        path: String,
        #[source]
        source: BoxError,
    },
    #[error("the service account key is not a valid key document")]
    Parsing(#[source] BoxError),
    #[error(
        "no private key found, set STACKIT_PRIVATE_KEY or STACKIT_PRIVATE_KEY_PATH, configure one on the builder, or use a service account key with an embedded private key"
    )]
    MissingPrivateKey,
    #[error("the private key cannot sign the token request")]
    InvalidPrivateKey(#[source] BoxError),
    #[error("could not send the token exchange request")]
    ExchangeTransport(#[source] BoxError),
    #[error("the token exchange failed with HTTP status {status}: {body}")]
    ExchangeStatus { status: StatusCode, body: String },
    #[error("the token endpoint returned an unusable response")]
    InvalidTokenResponse(#[source] BoxError),
}
