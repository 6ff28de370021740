use crate::credential::{Credential, StaticToken};
use crate::errors::{Error, Result};

pub const SUBSCRIPTION_KEY_PLACEHOLDER: &str = "AZURE_CONTENT_UNDERSTANDING_SUBSCRIPTION_KEY";
pub const AAD_TOKEN_PLACEHOLDER: &str = "AZURE_CONTENT_UNDERSTANDING_AAD_TOKEN";

pub const DEFAULT_API_VERSION: &str = "2025-05-01-preview";

pub const ENV_ENDPOINT: &str = "AZURE_CONTENT_UNDERSTANDING_ENDPOINT";
pub const ENV_API_VERSION: &str = "AZURE_CONTENT_UNDERSTANDING_API_VERSION";
pub const ENV_SUBSCRIPTION_KEY: &str = "AZURE_CONTENT_UNDERSTANDING_SUBSCRIPTION_KEY";
pub const ENV_AAD_TOKEN: &str = "AZURE_CONTENT_UNDERSTANDING_AAD_TOKEN";
pub const ENV_ANALYZER_ID: &str = "AZURE_CONTENT_UNDERSTANDING_ANALYZER_ID";
pub const ENV_FILE_LOCATION: &str = "AZURE_CONTENT_UNDERSTANDING_FILE_LOCATION";

/// Everything one analysis run needs. Validated once, never changed.
#[derive(Clone)]
pub struct Settings {
    endpoint: String,
    api_version: String,
    subscription_key: Option<String>,
    aad_token: Option<String>,
    analyzer_id: String,
    file_location: String,
}

fn provided(value: Option<String>, placeholder: &str) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != placeholder)
}

impl Settings {
    pub fn new(
        endpoint: impl Into<String>,
        api_version: impl Into<String>,
        subscription_key: Option<String>,
        aad_token: Option<String>,
        analyzer_id: impl Into<String>,
        file_location: impl Into<String>,
    ) -> Result<Settings> {
        let endpoint = endpoint.into().trim_end_matches('/').to_owned();
        if endpoint.is_empty() {
            return Err(Error::invalid_argument("Endpoint must be provided"));
        }
        let api_version = api_version.into();
        if api_version.trim().is_empty() {
            return Err(Error::invalid_argument("API version must be provided"));
        }
        let subscription_key = provided(subscription_key, SUBSCRIPTION_KEY_PLACEHOLDER);
        let aad_token = provided(aad_token, AAD_TOKEN_PLACEHOLDER);
        if subscription_key.is_none() && aad_token.is_none() {
            return Err(Error::invalid_argument(
                "Either 'subscription_key' or 'aad_token' must be provided",
            ));
        }
        Ok(Settings {
            endpoint,
            api_version,
            subscription_key,
            aad_token,
            analyzer_id: analyzer_id.into(),
            file_location: file_location.into(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn analyzer_id(&self) -> &str {
        &self.analyzer_id
    }

    pub fn file_location(&self) -> &str {
        &self.file_location
    }

    pub fn subscription_key(&self) -> Option<&str> {
        self.subscription_key.as_deref()
    }

    pub fn token_provider(&self) -> Option<StaticToken> {
        self.aad_token.as_deref().map(StaticToken::new)
    }

    /// The subscription key takes priority over the AAD token.
    pub fn credential(&self) -> Credential {
        match (&self.subscription_key, self.token_provider()) {
            (Some(key), _) => Credential::subscription_key(key.as_str()),
            (None, Some(provider)) => Credential::token(provider),
            (None, None) => unreachable!("Settings::new requires one credential"),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Settings")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("subscription_key", &redacted(&self.subscription_key))
            .field("aad_token", &redacted(&self.aad_token))
            .field("analyzer_id", &self.analyzer_id)
            .field("file_location", &self.file_location)
            .finish()
    }
}
