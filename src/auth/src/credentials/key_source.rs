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

//! Where credential values come from.

use crate::Result;
use crate::errors::Error;

/// The sources a single credential value may come from, in precedence
/// order: environment value, environment-named file, configured value,
/// configured file.
///
/// One chain exists for the service account key and one for the private
/// key. The environment is captured when the chain is built; resolving
/// never reads process state, so a chain always resolves the same way.
/// Empty strings count as unset everywhere.
#[derive(Clone, Default)]
pub(crate) struct SourceChain {
    env_value: Option<String>,
    env_path: Option<String>,
    option_value: Option<String>,
    option_path: Option<String>,
}

impl SourceChain {
    /// Builds a chain from already-captured values.
    pub(crate) fn new(
        env_value: Option<String>,
        env_path: Option<String>,
        option_value: Option<String>,
        option_path: Option<String>,
    ) -> Self {
        let set = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            env_value: set(env_value),
            env_path: set(env_path),
            option_value: set(option_value),
            option_path: set(option_path),
        }
    }

    /// Captures `value_var` and `path_var` from the process environment and
    /// combines them with the configured values.
    pub(crate) fn capture(
        value_var: &str,
        path_var: &str,
        option_value: Option<String>,
        option_path: Option<String>,
    ) -> Self {
        Self::new(env_var(value_var), env_var(path_var), option_value, option_path)
    }

    /// Walks the chain and returns the first value it yields.
    ///
    /// A set source is authoritative: when a named file cannot be read the
    /// resolution fails instead of falling through to later sources.
    pub(crate) async fn resolve(&self) -> Result<Option<String>> {
        if let Some(value) = &self.env_value {
            return Ok(Some(value.clone()));
        }
        if let Some(path) = &self.env_path {
            return read_credential_file(path).await.map(Some);
        }
        if let Some(value) = &self.option_value {
            return Ok(Some(value.clone()));
        }
        if let Some(path) = &self.option_path {
            return read_credential_file(path).await.map(Some);
        }
        Ok(None)
    }
}

impl std::fmt::Debug for SourceChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceChain")
            .field("env_value", &self.env_value.as_ref().map(|_| "[censored]"))
            .field("env_path", &self.env_path)
            .field("option_value", &self.option_value.as_ref().map(|_| "[censored]"))
            .field("option_path", &self.option_path)
            .finish()
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

async fn read_credential_file(path: &str) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::loading(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoped_env::ScopedEnv;
    use tempfile::NamedTempFile;
    use test_case::test_case;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn write_temp_file(contents: &str) -> std::io::Result<NamedTempFile> {
        let file = NamedTempFile::new()?;
        std::fs::write(file.path(), contents)?;
        Ok(file)
    }

    #[test_case(true,  true,  true,  true,  Some("env-value");          "all set")]
    #[test_case(true,  true,  true,  false, Some("env-value");          "no option path")]
    #[test_case(true,  true,  false, true,  Some("env-value");          "no option value")]
    #[test_case(true,  true,  false, false, Some("env-value");          "env only")]
    #[test_case(true,  false, true,  true,  Some("env-value");          "no env path")]
    #[test_case(true,  false, true,  false, Some("env-value");          "values only")]
    #[test_case(true,  false, false, true,  Some("env-value");          "env value and option path")]
    #[test_case(true,  false, false, false, Some("env-value");          "env value only")]
    #[test_case(false, true,  true,  true,  Some("env-path-value");     "no env value")]
    #[test_case(false, true,  true,  false, Some("env-path-value");     "env path beats option value")]
    #[test_case(false, true,  false, true,  Some("env-path-value");     "paths only")]
    #[test_case(false, true,  false, false, Some("env-path-value");     "env path only")]
    #[test_case(false, false, true,  true,  Some("option-value");       "options only")]
    #[test_case(false, false, true,  false, Some("option-value");       "option value only")]
    #[test_case(false, false, false, true,  Some("option-path-value");  "option path only")]
    #[test_case(false, false, false, false, None;                       "nothing set")]
    #[tokio::test]
    async fn precedence(
        env_value: bool,
        env_path: bool,
        option_value: bool,
        option_path: bool,
        want: Option<&str>,
    ) -> TestResult {
        let env_path_file = write_temp_file("env-path-value")?;
        let option_path_file = write_temp_file("option-path-value")?;

        let chain = SourceChain::new(
            env_value.then(|| "env-value".to_string()),
            env_path.then(|| env_path_file.path().to_str().unwrap().to_string()),
            option_value.then(|| "option-value".to_string()),
            option_path.then(|| option_path_file.path().to_str().unwrap().to_string()),
        );
        let got = chain.resolve().await?;
        assert_eq!(got.as_deref(), want);
        Ok(())
    }

    #[tokio::test]
    async fn empty_strings_count_as_unset() -> TestResult {
        let chain = SourceChain::new(
            Some(String::new()),
            Some(String::new()),
            Some("option-value".to_string()),
            None,
        );
        let got = chain.resolve().await?;
        assert_eq!(got.as_deref(), Some("option-value"));
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_file_is_an_error_not_a_fallthrough() {
        let chain = SourceChain::new(
            None,
            Some("/no/such/dir/credential.json".to_string()),
            Some("option-value".to_string()),
            None,
        );
        let err = chain.resolve().await.unwrap_err();
        assert!(err.is_loading(), "{err:?}");
        assert!(
            err.to_string().contains("/no/such/dir/credential.json"),
            "{err}"
        );
    }

    #[tokio::test]
    async fn unreadable_option_path_is_an_error() {
        let chain = SourceChain::new(
            None,
            None,
            None,
            Some("/no/such/dir/credential.json".to_string()),
        );
        let err = chain.resolve().await.unwrap_err();
        assert!(err.is_loading(), "{err:?}");
    }

    #[tokio::test]
    async fn resolve_is_idempotent() -> TestResult {
        let file = write_temp_file("file-value")?;
        let chain = SourceChain::new(
            None,
            Some(file.path().to_str().unwrap().to_string()),
            None,
            None,
        );
        let first = chain.resolve().await?;
        let second = chain.resolve().await?;
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("file-value"));
        Ok(())
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn capture_prefers_the_environment() -> TestResult {
        let _e1 = ScopedEnv::set("SOURCE_CHAIN_TEST_VALUE", "env-value");
        let _e2 = ScopedEnv::remove("SOURCE_CHAIN_TEST_PATH");

        let chain = SourceChain::capture(
            "SOURCE_CHAIN_TEST_VALUE",
            "SOURCE_CHAIN_TEST_PATH",
            Some("option-value".to_string()),
            None,
        );
        let got = chain.resolve().await?;
        assert_eq!(got.as_deref(), Some("env-value"));
        Ok(())
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn capture_falls_back_to_options() -> TestResult {
        let _e1 = ScopedEnv::remove("SOURCE_CHAIN_TEST_VALUE");
        let _e2 = ScopedEnv::remove("SOURCE_CHAIN_TEST_PATH");

        let chain = SourceChain::capture(
            "SOURCE_CHAIN_TEST_VALUE",
            "SOURCE_CHAIN_TEST_PATH",
            Some("option-value".to_string()),
            None,
        );
        let got = chain.resolve().await?;
        assert_eq!(got.as_deref(), Some("option-value"));
        Ok(())
    }

    #[test]
    fn debug_censors_values_and_shows_paths() {
        let chain = SourceChain::new(
            Some("secret-env-value".to_string()),
            Some("/tmp/env.json".to_string()),
            Some("secret-option-value".to_string()),
            Some("/tmp/option.json".to_string()),
        );
        let fmt = format!("{chain:?}");
        assert!(!fmt.contains("secret-env-value"), "{fmt}");
        assert!(!fmt.contains("secret-option-value"), "{fmt}");
        assert!(fmt.contains("[censored]"), "{fmt}");
        assert!(fmt.contains("/tmp/env.json"), "{fmt}");
        assert!(fmt.contains("/tmp/option.json"), "{fmt}");
    }
}
