//! HTTP transport for delivering hits.

use crate::config::Config;
use crate::types::TransportResponse;
use crate::Error;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Something that can POST a request and hand back the raw response.
///
/// Status codes are not interpreted here; the drain loop decides what
/// counts as a failed delivery.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one POST request.
    async fn post(
        &self,
        url: &str,
        body: String,
        headers: &BTreeMap<String, String>,
    ) -> Result<TransportResponse, Error>;
}

/// Transport backed by `reqwest`.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        body: String,
        headers: &BTreeMap<String, String>,
    ) -> Result<TransportResponse, Error> {
        debug!(url = %url, "posting hit");

        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.unwrap_or_else(|_| "Unknown error".into());

        if status >= 300 {
            warn!(status, body = %body, "collection request failed");
        }

        Ok(TransportResponse {
            status,
            body,
            headers,
        })
    }
}
