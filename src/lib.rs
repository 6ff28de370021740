use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

pub const DEFAULT_USER_AGENT: &str = "cu-sample-code";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(2);

pub const SUBSCRIPTION_KEY_HEADER: &str = "ocp-apim-subscription-key";
pub const USER_AGENT_HEADER: &str = "x-ms-useragent";
pub const OPERATION_LOCATION_HEADER: &str = "operation-location";

pub mod clock;
pub mod credential;
pub mod errors;
pub mod extraction;
pub mod operation_status;
pub mod settings;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use credential::{Credential, StaticToken, TokenProvider};
pub use errors::{Error, Result};
pub use extraction::ExtractionSummary;
pub use operation_status::{operation_id, AnalysisResult, OperationStatus};
pub use settings::Settings;
pub use transport::{HttpResponse, HttpTransport, RequestBody, Transport};

/// Response of the analyze request. Holds the handle of the asynchronous operation.
#[derive(Debug, Clone)]
pub struct AnalyzeResponse {
    pub response: HttpResponse,
}

impl AnalyzeResponse {
    pub fn operation_location(&self) -> Option<&str> {
        self.response
            .headers
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug)]
pub struct ContentUnderstandingClient<T: Transport = HttpTransport, C: Clock = SystemClock> {
    endpoint: String,
    api_version: String,
    headers: HeaderMap,
    transport: T,
    clock: C,
}

impl ContentUnderstandingClient {
    pub fn new(
        endpoint: &str,
        api_version: &str,
        credential: Credential,
    ) -> Result<ContentUnderstandingClient> {
        if endpoint.is_empty() {
            return Err(Error::invalid_argument("Endpoint must be provided"));
        }
        if api_version.is_empty() {
            return Err(Error::invalid_argument("API version must be provided"));
        }
        let credential_header = match credential {
            Credential::SubscriptionKey(key) if !key.trim().is_empty() => {
                (HeaderName::from_static(SUBSCRIPTION_KEY_HEADER), header_value(&key)?)
            }
            Credential::Token(provider) => match provider.token() {
                token if !token.is_empty() => {
                    (AUTHORIZATION, header_value(&format!("Bearer {}", token))?)
                }
                _ => {
                    return Err(Error::invalid_argument(
                        "Either subscription key or token provider must be provided",
                    ))
                }
            },
            Credential::SubscriptionKey(_) => {
                return Err(Error::invalid_argument(
                    "Either subscription key or token provider must be provided",
                ))
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(credential_header.0, credential_header.1);
        headers.insert(
            HeaderName::from_static(USER_AGENT_HEADER),
            HeaderValue::from_static(DEFAULT_USER_AGENT),
        );

        Ok(ContentUnderstandingClient {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            api_version: api_version.to_owned(),
            headers,
            transport: HttpTransport::new(),
            clock: SystemClock,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<ContentUnderstandingClient> {
        ContentUnderstandingClient::new(
            settings.endpoint(),
            settings.api_version(),
            settings.credential(),
        )
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::invalid_argument("credential contains characters not allowed in a header"))
}

impl<T: Transport, C: Clock> ContentUnderstandingClient<T, C> {
    pub fn with_transport<U: Transport>(self, transport: U) -> ContentUnderstandingClient<U, C> {
        ContentUnderstandingClient {
            endpoint: self.endpoint,
            api_version: self.api_version,
            headers: self.headers,
            transport,
            clock: self.clock,
        }
    }

    pub fn with_clock<D: Clock>(self, clock: D) -> ContentUnderstandingClient<T, D> {
        ContentUnderstandingClient {
            endpoint: self.endpoint,
            api_version: self.api_version,
            headers: self.headers,
            transport: self.transport,
            clock,
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self> {
        self.headers.insert(
            HeaderName::from_static(USER_AGENT_HEADER),
            HeaderValue::from_str(user_agent)
                .map_err(|_| Error::invalid_argument("user agent is not a valid header value"))?,
        );
        Ok(self)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Authentication and client identification headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn analyze_url(&self, analyzer_id: &str) -> String {
        format!(
            "{}/contentunderstanding/analyzers/{}:analyze?api-version={}&stringEncoding=utf16",
            self.endpoint, analyzer_id, self.api_version
        )
    }

    /// Starts an analysis of a local file or an http(s) URL.
    ///
    /// A path that names an existing file is uploaded as raw bytes; otherwise the
    /// location must be an http(s) URL and is sent as `{"url": ...}`.
    pub fn submit(&self, analyzer_id: &str, file_location: &str) -> Result<AnalyzeResponse> {
        let (content_type, body) = if Path::new(file_location).is_file() {
            (
                "application/octet-stream",
                RequestBody::Binary(std::fs::read(file_location)?),
            )
        } else if is_http_url(file_location) {
            (
                "application/json",
                RequestBody::Json(serde_json::json!({ "url": file_location })),
            )
        } else {
            return Err(Error::invalid_argument(
                "File location must be a valid path or URL.",
            ));
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.extend(self.headers.clone());

        let endpoint_url = self.analyze_url(analyzer_id);
        let response = self
            .transport
            .post(&endpoint_url, headers, body)?
            .error_for_status(&endpoint_url)?;

        tracing::info!(
            file_location,
            analyzer_id,
            "Analyzing file {} with analyzer: {}",
            file_location,
            analyzer_id
        );
        Ok(AnalyzeResponse { response })
    }

    /// Polls the operation started by `submit` until it succeeds, fails or `timeout` runs out.
    pub fn poll(
        &self,
        submitted: &AnalyzeResponse,
        timeout: Duration,
        polling_interval: Duration,
    ) -> Result<AnalysisResult> {
        let operation_location = submitted
            .operation_location()
            .ok_or(Error::MissingOperationLocation)?;
        let id = operation_id(operation_location);

        let start = self.clock.now();
        loop {
            let elapsed = self.clock.now().saturating_duration_since(start);
            tracing::debug!(elapsed = elapsed.as_secs_f64(), "Waiting for service response");
            if elapsed > timeout {
                return Err(Error::Timeout { elapsed });
            }

            let response = self
                .transport
                .get(operation_location, self.headers.clone())?
                .error_for_status(operation_location)?;
            let result: AnalysisResult = serde_json::from_slice(&response.body)?;

            match OperationStatus::of(&result) {
                OperationStatus::Succeeded => {
                    tracing::info!(
                        "Request result is ready after {:.2} seconds.",
                        elapsed.as_secs_f64()
                    );
                    return Ok(result);
                }
                OperationStatus::Failed => {
                    let body = result.to_string();
                    tracing::error!("Request failed. Reason: {}", body);
                    return Err(Error::OperationFailed { body });
                }
                OperationStatus::Running => {
                    tracing::info!("Request {} in progress ...", id);
                }
            }
            self.clock.sleep(polling_interval);
        }
    }

    pub fn analyze(
        &self,
        analyzer_id: &str,
        file_location: &str,
        timeout: Duration,
        polling_interval: Duration,
    ) -> Result<AnalysisResult> {
        let submitted = self.submit(analyzer_id, file_location)?;
        self.poll(&submitted, timeout, polling_interval)
    }
}

fn is_http_url(location: &str) -> bool {
    match url::Url::parse(location) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}
