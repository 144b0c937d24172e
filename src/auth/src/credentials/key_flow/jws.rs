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

use crate::Result;
use crate::errors::Error;
use base64::prelude::{BASE64_URL_SAFE_NO_PAD, Engine as _};
use serde::Serialize;
use std::time::Duration;
use time::OffsetDateTime;

// The token endpoint rejects assertions with `iat` in the future, and all
// machines have some amount of clock skew. Issue the assertion with a 10
// second margin to stay clear of most skew.
pub(crate) const CLOCK_SKEW_FUDGE: Duration = Duration::from_secs(10);

// Assertions only need to outlive the exchange request.
pub(crate) const ASSERTION_LIFETIME: Duration = Duration::from_secs(300);

/// The claims of the assertion sent to the token endpoint.
#[derive(Serialize)]
pub(crate) struct JwsClaims<'a> {
    pub(crate) iss: &'a str,
    pub(crate) sub: &'a str,
    pub(crate) aud: &'a str,
    #[serde(with = "time::serde::timestamp")]
    pub(crate) iat: OffsetDateTime,
    #[serde(with = "time::serde::timestamp")]
    pub(crate) exp: OffsetDateTime,
}

impl JwsClaims<'_> {
    pub(crate) fn encode(&self) -> Result<String> {
        if self.exp < self.iat {
            return Err(Error::invalid_private_key(format!(
                "expiration time {:?} must be later than issued time {:?}",
                self.exp, self.iat
            )));
        }
        let json = serde_json::to_string(&self).map_err(Error::invalid_private_key)?;
        Ok(BASE64_URL_SAFE_NO_PAD.encode(json.as_bytes()))
    }
}

/// The header that describes how the assertion was signed.
#[derive(Serialize)]
pub(crate) struct JwsHeader<'a> {
    pub(crate) alg: &'a str,
    pub(crate) typ: &'a str,
    pub(crate) kid: &'a str,
}

impl JwsHeader<'_> {
    pub(crate) fn encode(&self) -> Result<String> {
        let json = serde_json::to_string(&self).map_err(Error::invalid_private_key)?;
        Ok(BASE64_URL_SAFE_NO_PAD.encode(json.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn b64_decode_to_json(s: &str) -> Value {
        let decoded = String::from_utf8(BASE64_URL_SAFE_NO_PAD.decode(s).unwrap()).unwrap();
        serde_json::from_str(&decoded).unwrap()
    }

    #[test]
    fn claims_encode() -> TestResult {
        let iat = OffsetDateTime::from_unix_timestamp(1_700_000_000)?;
        let claims = JwsClaims {
            iss: "iss-test-only",
            sub: "sub-test-only",
            aud: "https://exchange.test/token",
            iat,
            exp: iat + ASSERTION_LIFETIME,
        };
        let v = b64_decode_to_json(&claims.encode()?);
        assert_eq!(v["iss"], "iss-test-only");
        assert_eq!(v["sub"], "sub-test-only");
        assert_eq!(v["aud"], "https://exchange.test/token");
        assert_eq!(v["iat"], 1_700_000_000_i64);
        assert_eq!(v["exp"], 1_700_000_300_i64);
        Ok(())
    }

    #[test]
    fn claims_reject_inverted_validity() -> TestResult {
        let iat = OffsetDateTime::from_unix_timestamp(1_700_000_000)?;
        let claims = JwsClaims {
            iss: "iss-test-only",
            sub: "sub-test-only",
            aud: "https://exchange.test/token",
            iat,
            exp: iat - Duration::from_secs(1),
        };
        let err = claims.encode().unwrap_err();
        assert!(err.is_invalid_private_key(), "{err:?}");
        Ok(())
    }

    #[test]
    fn header_encode() -> TestResult {
        let header = JwsHeader {
            alg: "RS256",
            typ: "JWT",
            kid: "kid-test-only",
        };
        let v = b64_decode_to_json(&header.encode()?);
        assert_eq!(v["alg"], "RS256");
        assert_eq!(v["typ"], "JWT");
        assert_eq!(v["kid"], "kid-test-only");
        Ok(())
    }
}
