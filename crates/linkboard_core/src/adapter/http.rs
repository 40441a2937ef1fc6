//! HTTP transport for the REST backend.

use super::rest::{HttpMethod, RestRequest, RestResponse, RestTransport, TransportError};
use reqwest::{Client, Method};
use url::Url;

/// `reqwest`-based transport rooted at the board server's base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    /// Creates a transport for `base_url` (for example `http://127.0.0.1:8000`).
    ///
    /// # Errors
    /// - Returns an error when `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let mut base = Url::parse(base_url.trim())
            .map_err(|err| TransportError::new(format!("invalid API base `{base_url}`: {err}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(TransportError::new(format!(
                "API base must use http or https, got `{}`",
                base.scheme()
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| TransportError::new(format!("invalid request path `{path}`: {err}")))
    }
}

impl RestTransport for HttpTransport {
    async fn send(&self, request: RestRequest) -> Result<RestResponse, TransportError> {
        let url = self.endpoint(&request.path)?;
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::new(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::new(err.to_string()))?;
        Ok(RestResponse { status, body })
    }
}
