use reqwest::header::HeaderMap;

use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Binary(Vec<u8>),
    Json(serde_json::Value),
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn error_for_status(self, endpoint_url: &str) -> Result<HttpResponse> {
        if self.is_success() {
            return Ok(self);
        }
        Err(Error::Http {
            endpoint_url: endpoint_url.to_owned(),
            status: self.status,
            body: self.body_text(),
        })
    }
}

/// The two HTTP calls the client makes. Implementations only move bytes;
/// status handling is left to the caller.
pub trait Transport {
    fn post(&self, url: &str, headers: HeaderMap, body: RequestBody) -> Result<HttpResponse>;
    fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http_client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> HttpTransport {
        HttpTransport {
            http_client: reqwest::blocking::Client::new(),
        }
    }

    fn execute(&self, url: &str, req: reqwest::blocking::RequestBuilder) -> Result<HttpResponse> {
        let transport_err = |source| Error::Transport {
            endpoint_url: url.to_owned(),
            source,
        };
        let resp = req.send().map_err(transport_err)?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.bytes().map_err(transport_err)?.to_vec();
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, headers: HeaderMap, body: RequestBody) -> Result<HttpResponse> {
        let req = self.http_client.post(url).headers(headers);
        let req = match body {
            RequestBody::Binary(bytes) => req.body(bytes),
            RequestBody::Json(value) => req.body(serde_json::to_vec(&value)?),
        };
        self.execute(url, req)
    }

    fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse> {
        self.execute(url, self.http_client.get(url).headers(headers))
    }
}
