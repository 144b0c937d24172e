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
use crate::token::AccessToken;
use http::header::{AUTHORIZATION, HeaderName, HeaderValue};

/// Renders `token` as an `Authorization` header pair.
///
/// The value is marked sensitive so HTTP stacks do not log it.
pub(crate) fn build_bearer_headers(token: &AccessToken) -> Result<Vec<(HeaderName, HeaderValue)>> {
    let mut value = HeaderValue::from_str(&format!("{} {}", token.token_type, token.token))
        .map_err(Error::invalid_token_response)?;
    value.set_sensitive(true);
    Ok(vec![(AUTHORIZATION, value)])
}
